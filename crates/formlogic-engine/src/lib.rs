//! Rule engine for the formlogic system.
//!
//! Programs are compiled from `;`-separated rows of space-separated tokens and
//! run against a [`Host`] under an [`ExecutionContext`] whose kind decides
//! which opcodes are allowed.

pub mod engine;
pub mod parser;
pub mod policy;
pub mod types;

pub use engine::{run, Host, PushOutcome, WriteOutcome};
pub use parser::compile;
pub use types::{
    ContextKind, EngineError, EngineOptions, ExecutionContext, InstructionRow, JumpRelation,
    Opcode, Program, DEFAULT_MAX_STEPS,
};
