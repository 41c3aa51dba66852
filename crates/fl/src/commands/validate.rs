//! `fl validate` -- seed values and evaluate validators.

use anyhow::{bail, Context, Result};

use formlogic_form::Form;

use crate::cli::ValidateArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, validity_lines};

/// Execute the `fl validate` command.
pub fn run(ctx: &RuntimeContext, args: &ValidateArgs) -> Result<()> {
    let config = ctx.engine_config()?;
    let (path, spec) = ctx.load_form(&args.form)?;
    let mut form = Form::build(&spec, config.engine_options())
        .with_context(|| format!("failed to build form {}", path.display()))?;

    form.load_values(args.values.iter().map(|a| (a.name.as_str(), a.value.clone())))?;
    let validity = form.validate();

    if ctx.json {
        output_json(&validity);
    } else if !ctx.quiet {
        for line in validity_lines(&validity) {
            println!("{}", line);
        }
    }

    if !validity.valid {
        bail!("form is invalid");
    }
    Ok(())
}
