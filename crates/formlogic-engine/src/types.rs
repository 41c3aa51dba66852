//! Instruction model -- opcodes, rows, programs, execution contexts and the
//! engine error type.

use std::fmt;

use serde::{Deserialize, Serialize};

use formlogic_core::Value;

/// Default cap on executed rows per program run.
pub const DEFAULT_MAX_STEPS: u64 = 10_000;

/// Separates rows in a program source.
pub const ROW_SEPARATOR: char = ';';

/// Separates tokens within a row.
pub const TOKEN_SEPARATOR: char = ' ';

/// The closed instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `jrgt a b offset` -- jump by `offset` rows when `a` relates to `b`.
    Jrgt,
    /// `s target source` -- guarded write of `source` into field `target`.
    Set,
    /// `sp target prop source` -- push `source` onto a bound component property.
    SetProp,
    /// `setres marker` -- set the run result and halt.
    SetRes,
}

impl Opcode {
    pub const ALL: [Opcode; 4] = [Self::Jrgt, Self::Set, Self::SetProp, Self::SetRes];

    /// Source-text mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Jrgt => "jrgt",
            Self::Set => "s",
            Self::SetProp => "sp",
            Self::SetRes => "setres",
        }
    }

    /// Resolve a mnemonic; `None` for anything outside the instruction set.
    pub fn from_mnemonic(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == token)
    }

    /// Position in handler and policy tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Number of operands the handler reads.
    pub fn arity(self) -> usize {
        match self {
            Self::Jrgt => 3,
            Self::Set => 2,
            Self::SetProp => 3,
            Self::SetRes => 1,
        }
    }

    /// Operand positions that may name fields.
    pub fn field_operands(self) -> &'static [usize] {
        match self {
            Self::Jrgt => &[0, 1],
            Self::Set => &[0, 1],
            Self::SetProp => &[0, 2],
            Self::SetRes => &[],
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// One compiled row: the mnemonic as written, its resolved opcode and the raw
/// operands. Operands are typed by the handler at execution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionRow {
    pub mnemonic: String,
    pub opcode: Option<Opcode>,
    pub operands: Vec<String>,
}

impl InstructionRow {
    /// Mnemonic followed by operands, as in the source.
    pub fn tokens(&self) -> Vec<&str> {
        std::iter::once(self.mnemonic.as_str())
            .chain(self.operands.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for InstructionRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens().join(" "))
    }
}

/// An immutable, compiled rule program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    rows: Vec<InstructionRow>,
}

impl Program {
    pub(crate) fn new(rows: Vec<InstructionRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[InstructionRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&InstructionRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Operands in field position, in order of first appearance.
    ///
    /// Rows with unknown mnemonics contribute all their operands.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for row in &self.rows {
            let positions: Vec<usize> = match row.opcode {
                Some(op) => op.field_operands().to_vec(),
                None => (0..row.operands.len()).collect(),
            };
            for pos in positions {
                if let Some(name) = row.operands.get(pos) {
                    if !names.contains(&name.as_str()) {
                        names.push(name.as_str());
                    }
                }
            }
        }
        names
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", ROW_SEPARATOR)?;
            }
            write!(f, "{}", row)?;
        }
        Ok(())
    }
}

/// Which policy a program runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextKind {
    /// Reacting to sibling changes; may write fields and push properties.
    Propagation,
    /// Computing form validity; read-only.
    Validation,
}

impl ContextKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Propagation => "dependency-propagation",
            Self::Validation => "validation",
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-run state. Created fresh for every run and returned when it ends.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    pub kind: ContextKind,
    /// Row about to execute; equals the program length once the run ends.
    pub row: usize,
    /// Set by `setres`.
    pub result: Option<Value>,
    /// Rows executed so far.
    pub steps: u64,
}

impl ExecutionContext {
    pub fn new(kind: ContextKind) -> Self {
        Self {
            kind,
            row: 0,
            result: None,
            steps: 0,
        }
    }

    pub fn propagation() -> Self {
        Self::new(ContextKind::Propagation)
    }

    pub fn validation() -> Self {
        Self::new(ContextKind::Validation)
    }
}

/// The relation `jrgt` tests before jumping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JumpRelation {
    /// `a >= b` (default).
    #[default]
    GreaterOrEqual,
    /// `a > b`.
    Greater,
}

impl JumpRelation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GreaterOrEqual => "greater-or-equal",
            Self::Greater => "greater",
        }
    }

    /// Comparisons involving NaN never hold.
    pub fn holds(self, a: f64, b: f64) -> bool {
        match self {
            Self::GreaterOrEqual => a >= b,
            Self::Greater => a > b,
        }
    }
}

impl fmt::Display for JumpRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Knobs shared by every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub max_steps: u64,
    pub jump_relation: JumpRelation,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            jump_relation: JumpRelation::default(),
        }
    }
}

/// Errors raised while compiling or running a program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("syntax error: row {row} is empty")]
    Syntax { row: usize },

    #[error("row {row}: unknown opcode '{mnemonic}'")]
    UnknownOpcode { row: usize, mnemonic: String },

    #[error("row {row}: opcode '{opcode}' is not allowed in {context} context")]
    UnauthorizedOpcode {
        row: usize,
        opcode: Opcode,
        context: ContextKind,
    },

    #[error("row {row}: unknown field '{field}'")]
    MissingField { row: usize, field: String },

    #[error("row {row}: '{opcode}' expects {expected} operands, found {found}")]
    MissingOperand {
        row: usize,
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    #[error("row {row}: jump offset must be an integer (got '{operand}')")]
    InvalidOffset { row: usize, operand: String },

    #[error("step limit of {limit} exceeded")]
    StepLimitExceeded { limit: u64 },

    #[error("row {row}: host is read-only")]
    ReadOnly { row: usize },
}

impl EngineError {
    /// Stable name of the error kind, for machine-readable output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "syntax",
            Self::UnknownOpcode { .. } => "unknown-opcode",
            Self::UnauthorizedOpcode { .. } => "unauthorized-opcode",
            Self::MissingField { .. } => "missing-field",
            Self::MissingOperand { .. } => "missing-operand",
            Self::InvalidOffset { .. } => "invalid-offset",
            Self::StepLimitExceeded { .. } => "step-limit-exceeded",
            Self::ReadOnly { .. } => "read-only",
        }
    }

    /// Returns `true` for errors raised by [`crate::parser::compile`].
    pub fn is_compile_error(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}

/// Convenience alias used throughout the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonics_roundtrip() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_mnemonic(op.mnemonic()), Some(op));
        }
        assert_eq!(Opcode::from_mnemonic("jmp"), None);
        assert_eq!(Opcode::from_mnemonic("S"), None);
    }

    #[test]
    fn table_indices_are_dense() {
        let indices: Vec<usize> = Opcode::ALL.iter().map(|op| op.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn relation_boundaries() {
        assert!(JumpRelation::GreaterOrEqual.holds(3.0, 3.0));
        assert!(!JumpRelation::Greater.holds(3.0, 3.0));
        assert!(JumpRelation::Greater.holds(4.0, 3.0));
        assert!(!JumpRelation::GreaterOrEqual.holds(f64::NAN, 0.0));
    }

    #[test]
    fn error_kinds() {
        let err = EngineError::UnauthorizedOpcode {
            row: 0,
            opcode: Opcode::SetRes,
            context: ContextKind::Propagation,
        };
        assert_eq!(err.kind(), "unauthorized-opcode");
        assert_eq!(
            err.to_string(),
            "row 0: opcode 'setres' is not allowed in dependency-propagation context"
        );
    }
}
