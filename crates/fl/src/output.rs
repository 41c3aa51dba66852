//! Output formatting helpers for the `fl` CLI.

use std::io::{self, Write};

use serde::Serialize;

use formlogic_form::{Journal, JournalEntry, Validity};
use formlogic_ui::styles::{
    render_fail_icon, render_muted, render_pass_icon, render_value, render_warn_icon, TREE_CHILD,
    TREE_INDENT,
};

/// Print a value as pretty-printed JSON to stdout.
///
/// Terminates the process with exit code 1 if serialization fails.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            // Ignore broken pipe errors (e.g., piped to `head`)
            let _ = writeln!(handle, "{}", json);
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// One line per journal entry, skipping the host's own write.
pub fn journal_lines(journal: &Journal) -> Vec<String> {
    journal
        .entries()
        .iter()
        .filter_map(|entry| match entry {
            JournalEntry::Write { depth: 0, .. } => None,
            JournalEntry::Write {
                field,
                value,
                depth,
            } => Some(format!(
                "{}{}write {} = {}",
                TREE_INDENT.repeat(depth - 1),
                TREE_CHILD,
                field,
                render_value(value)
            )),
            JournalEntry::Suppressed { field, .. } => Some(format!(
                "{}{}",
                TREE_CHILD,
                render_muted(&format!("skip {} (already being written)", field))
            )),
            JournalEntry::Push {
                target,
                property,
                value,
            } => Some(format!(
                "{}push {}.{} = {}",
                TREE_CHILD,
                target,
                property,
                render_value(value)
            )),
            JournalEntry::NoBinding { target, property } => Some(format!(
                "{}{}",
                TREE_CHILD,
                render_muted(&format!("no binding for {}.{}", target, property))
            )),
            JournalEntry::Failure {
                field,
                program,
                error,
                ..
            } => Some(format!(
                "{}{} {} depsLogic[{}]: {}",
                TREE_CHILD,
                render_fail_icon(),
                field,
                program,
                error
            )),
        })
        .collect()
}

/// Human-readable validity report.
pub fn validity_lines(validity: &Validity) -> Vec<String> {
    if validity.valid {
        return vec![format!("{} valid", render_pass_icon())];
    }
    let mut lines = Vec::new();
    for (field, errors) in &validity.field_errors {
        for (key, violation) in errors {
            lines.push(format!(
                "{} {}: {} (required {}, actual {})",
                render_fail_icon(),
                field,
                key,
                violation.required_length,
                violation.actual_length
            ));
        }
    }
    for failure in &validity.form_errors {
        lines.push(format!(
            "{} {}: {}",
            render_fail_icon(),
            failure.validator,
            failure.message
        ));
    }
    for fault in &validity.faults {
        lines.push(format!(
            "{} {} ({}): {}",
            render_warn_icon(),
            fault.validator,
            fault.field,
            fault.error
        ));
    }
    lines
}
