//! `fl run` -- apply changes to a form and show how they propagate.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use formlogic_core::Value;
use formlogic_form::{Form, Journal, PropertySheet};
use formlogic_ui::styles::{render_category, render_value, render_warn_icon};

use crate::cli::RunArgs;
use crate::context::RuntimeContext;
use crate::output::{journal_lines, output_json, validity_lines};

/// Execute the `fl run` command.
pub fn run(ctx: &RuntimeContext, args: &RunArgs) -> Result<()> {
    let config = ctx.engine_config()?;
    let (path, spec) = ctx.load_form(&args.form)?;
    let mut form = Form::build(&spec, config.engine_options())
        .with_context(|| format!("failed to build form {}", path.display()))?;

    let sheets: Vec<(String, PropertySheet)> = spec
        .fields
        .iter()
        .map(|f| (f.name.clone(), PropertySheet::new()))
        .collect();
    for (name, sheet) in &sheets {
        form.mount(name.clone(), Box::new(sheet.clone()));
    }

    let mut changes: Vec<(String, Value, Journal)> = Vec::with_capacity(args.set.len());
    for assignment in &args.set {
        let journal = form
            .set_value(&assignment.name, assignment.value.clone())
            .with_context(|| format!("cannot set '{}'", assignment.name))?;
        changes.push((assignment.name.clone(), assignment.value.clone(), journal));
    }

    let properties: BTreeMap<&str, BTreeMap<String, Value>> = sheets
        .iter()
        .filter(|(_, sheet)| sheet.pushes() > 0)
        .map(|(name, sheet)| (name.as_str(), sheet.properties()))
        .collect();
    let validity = form.validate();

    if ctx.json {
        let values: serde_json::Map<String, serde_json::Value> = form
            .values()
            .map(|(name, value)| (name.to_string(), serde_json::json!(value)))
            .collect();
        let changes: Vec<serde_json::Value> = changes
            .iter()
            .map(|(field, value, journal)| {
                serde_json::json!({ "field": field, "value": value, "journal": journal })
            })
            .collect();
        let issues: Vec<String> = form.issues().iter().map(ToString::to_string).collect();
        output_json(&serde_json::json!({
            "issues": issues,
            "changes": changes,
            "values": values,
            "properties": properties,
            "validity": validity,
        }));
        return Ok(());
    }
    if ctx.quiet {
        return Ok(());
    }

    for issue in form.issues() {
        println!("{} {}", render_warn_icon(), issue);
    }
    for (field, value, journal) in &changes {
        println!("set {} = {}", field, render_value(value));
        for line in journal_lines(journal) {
            println!("  {}", line);
        }
    }

    println!("{}", render_category("values"));
    for (name, value) in form.values() {
        println!("  {} = {}", name, render_value(value));
    }
    if !properties.is_empty() {
        println!("{}", render_category("properties"));
        for (name, props) in &properties {
            let rendered: Vec<String> = props
                .iter()
                .map(|(k, v)| format!("{}={}", k, render_value(v)))
                .collect();
            println!("  {}: {}", name, rendered.join(" "));
        }
    }
    println!("{}", render_category("validity"));
    for line in validity_lines(&validity) {
        println!("  {}", line);
    }
    Ok(())
}
