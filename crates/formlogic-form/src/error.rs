//! Form error types.

use formlogic_core::SpecError;
use formlogic_engine::EngineError;

/// Errors that can occur while building or driving a form.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// The named field does not exist in the form.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Two fields share a name; the form cannot be built.
    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    /// The form definition is structurally unusable.
    #[error("invalid form definition: {0}")]
    Definition(#[from] SpecError),

    /// A rule program failed to compile or run.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Convenience alias used throughout the form crate.
pub type Result<T> = std::result::Result<T, FormError>;
