//! `fl check` -- load a form definition and report setup issues.

use anyhow::{bail, Result};
use serde::Serialize;

use formlogic_core::FormSpec;
use formlogic_form::Form;
use formlogic_ui::styles::{render_category, render_fail_icon, render_muted, render_pass_icon};

use crate::cli::CheckArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldView<'a> {
    name: &'a str,
    depends_on: &'a [String],
    programs: usize,
    validators: Vec<&'a str>,
}

fn field_views(spec: &FormSpec) -> Vec<FieldView<'_>> {
    spec.fields
        .iter()
        .map(|f| FieldView {
            name: &f.name,
            depends_on: f.depends_on.as_deref().unwrap_or_default(),
            programs: f.deps_logic.as_ref().map_or(0, Vec::len),
            validators: f.form_validators.iter().map(|v| v.name.as_str()).collect(),
        })
        .collect()
}

/// Execute the `fl check` command.
pub fn run(ctx: &RuntimeContext, args: &CheckArgs) -> Result<()> {
    let config = ctx.engine_config()?;
    let (path, spec) = ctx.load_form(&args.form)?;

    let issues: Vec<String> = match Form::build(&spec, config.engine_options()) {
        Ok(form) => form.issues().iter().map(ToString::to_string).collect(),
        Err(e) => vec![e.to_string()],
    };
    let fields = field_views(&spec);

    if ctx.json {
        output_json(&serde_json::json!({
            "form": spec.name,
            "path": path.display().to_string(),
            "fields": fields,
            "issues": issues,
            "ok": issues.is_empty(),
        }));
    } else if !ctx.quiet {
        let title = if spec.name.is_empty() { "form" } else { spec.name.as_str() };
        println!("{} ({} fields)", render_category(title), fields.len());
        for f in &fields {
            let mut line = format!("  {}", f.name);
            if !f.depends_on.is_empty() {
                line.push_str(&format!(" <- {}", f.depends_on.join(", ")));
            }
            if f.programs > 0 {
                line.push_str(&render_muted(&format!("  programs: {}", f.programs)));
            }
            if !f.validators.is_empty() {
                line.push_str(&render_muted(&format!("  validators: {}", f.validators.join(", "))));
            }
            println!("{}", line);
        }
        if issues.is_empty() {
            println!("{} no issues", render_pass_icon());
        }
        for issue in &issues {
            println!("{} {}", render_fail_icon(), issue);
        }
    }

    if !issues.is_empty() {
        bail!("{} setup issue(s) in {}", issues.len(), path.display());
    }
    Ok(())
}
