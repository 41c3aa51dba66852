//! Core types for the formlogic system.
//!
//! Field values, form definitions and the structural rules a definition must
//! satisfy before any rule program is compiled.

pub mod field;
pub mod validation;
pub mod validators;
pub mod value;

pub use field::{FieldSpec, FormSpec, FormValidatorSpec};
pub use validation::SpecError;
pub use value::Value;
