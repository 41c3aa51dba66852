//! Compile rule sources into [`Program`]s.
//!
//! The parser only splits and resolves mnemonics. Whether an opcode exists or
//! is legal in a context is decided when the row runs.

use crate::types::{
    EngineError, InstructionRow, Opcode, Program, Result, ROW_SEPARATOR, TOKEN_SEPARATOR,
};

/// Compile a program source.
///
/// Rows are separated by `;` and tokens by single spaces. Surrounding
/// whitespace on a row is ignored, so multi-line configuration strings
/// compile the same as single-line ones. Any row without tokens is a syntax
/// error, which includes the empty source and a trailing `;`.
pub fn compile(source: &str) -> Result<Program> {
    let mut rows = Vec::new();
    for (index, raw) in source.split(ROW_SEPARATOR).enumerate() {
        let mut tokens = raw
            .trim()
            .split(TOKEN_SEPARATOR)
            .filter(|t| !t.is_empty());
        let Some(mnemonic) = tokens.next() else {
            return Err(EngineError::Syntax { row: index });
        };
        rows.push(InstructionRow {
            mnemonic: mnemonic.to_owned(),
            opcode: Opcode::from_mnemonic(mnemonic),
            operands: tokens.map(str::to_owned).collect(),
        });
    }
    Ok(Program::new(rows))
}
