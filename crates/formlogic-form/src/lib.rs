//! Live forms for the formlogic system.
//!
//! A [`Form`] holds field values, re-runs dependency programs when a field
//! changes, pushes properties onto mounted components and evaluates
//! validators on demand.

pub mod dispatcher;
pub mod error;
pub mod form;
pub mod guard;
pub mod registry;
pub mod store;
pub mod validator;

pub use error::{FormError, Result};
pub use form::{Form, Journal, JournalEntry, SetupIssue, ValidatorFault, Validity};
pub use registry::{OwnerId, PropertyHandle, PropertySheet, ReferenceRegistry};
pub use store::{FieldStore, MemoryStore};
pub use validator::{FormValidator, ValidationFailure};
