//! `fl compile` -- compile a program and list its rows.

use anyhow::{bail, Result};
use serde::Serialize;

use formlogic_engine::{compile, policy, ContextKind, InstructionRow};
use formlogic_ui::styles::{
    render_fail_icon, render_opcode, render_pass_icon, render_unknown_opcode,
};

use crate::cli::CompileArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

#[derive(Serialize)]
struct RowView<'a> {
    row: usize,
    mnemonic: &'a str,
    operands: &'a [String],
    known: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed: Option<bool>,
}

/// Why a row cannot run, if it cannot.
fn row_problem(row: &InstructionRow, context: Option<ContextKind>) -> Option<String> {
    let Some(opcode) = row.opcode else {
        return Some("unknown opcode".to_string());
    };
    match context {
        Some(kind) if !policy::permits(kind, opcode) => Some(format!("not allowed in {}", kind)),
        _ => None,
    }
}

/// Execute the `fl compile` command.
pub fn run(ctx: &RuntimeContext, args: &CompileArgs) -> Result<()> {
    let program = compile(&args.source)?;
    let context = args.context.map(ContextKind::from);

    let problems: Vec<Option<String>> = program
        .rows()
        .iter()
        .map(|row| row_problem(row, context))
        .collect();

    if ctx.json {
        let rows: Vec<RowView<'_>> = program
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| RowView {
                row: i,
                mnemonic: &row.mnemonic,
                operands: &row.operands,
                known: row.opcode.is_some(),
                allowed: context.map(|_| problems[i].is_none()),
            })
            .collect();
        output_json(&serde_json::json!({
            "context": context,
            "rows": rows,
        }));
    } else {
        for (i, row) in program.rows().iter().enumerate() {
            let mnemonic = match row.opcode {
                Some(op) => render_opcode(op),
                None => render_unknown_opcode(&row.mnemonic),
            };
            let mut line = format!("{}: {}", i, mnemonic);
            for operand in &row.operands {
                line.push(' ');
                line.push_str(operand);
            }
            if let Some(problem) = &problems[i] {
                line.push_str(&format!("  {} {}", render_fail_icon(), problem));
            }
            println!("{}", line);
        }
    }

    let Some(kind) = context else {
        return Ok(());
    };
    let rejected = problems.iter().filter(|p| p.is_some()).count();
    if rejected > 0 {
        bail!("{} of {} rows cannot run in {} context", rejected, program.len(), kind);
    }
    if !ctx.json && !ctx.quiet {
        println!("{} all rows allowed in {} context", render_pass_icon(), kind);
    }
    Ok(())
}
