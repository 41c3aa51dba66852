//! Form-level validators backed by rule programs.
//!
//! A validator program runs in validation context: it may compare fields and
//! set a result, never write. A truthy result means the form is invalid.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use formlogic_core::{FormValidatorSpec, Value};
use formlogic_engine::{compile, run, EngineError, EngineOptions, ExecutionContext, Host, Program};

use crate::store::FieldStore;

/// A failed form validator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationFailure {
    pub validator: String,
    pub message: String,
    /// The value the program passed to `setres`.
    pub marker: Value,
    /// Values of every field the program references, at check time.
    pub fields: BTreeMap<String, Value>,
}

/// A compiled form validator attached to a field.
#[derive(Debug, Clone, PartialEq)]
pub struct FormValidator {
    field: String,
    spec: FormValidatorSpec,
    program: Program,
}

impl FormValidator {
    /// Compile the validator's code once.
    pub fn compile(field: impl Into<String>, spec: FormValidatorSpec) -> Result<Self, EngineError> {
        let program = compile(&spec.code)?;
        Ok(Self {
            field: field.into(),
            spec,
            program,
        })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// The field whose definition declared this validator.
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn message(&self) -> &str {
        &self.spec.error_message
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Run the program against the current field values.
    ///
    /// `Ok(None)` means the validator passed. An engine error is returned as
    /// `Err`: a broken validator is a fault, not an invalid form.
    pub fn check<S: FieldStore + ?Sized>(
        &self,
        store: &S,
        options: &EngineOptions,
    ) -> Result<Option<ValidationFailure>, EngineError> {
        let mut host = ReadOnly(store);
        let ctx = run(&self.program, ExecutionContext::validation(), &mut host, options)?;
        debug!(validator = %self.spec.name, result = ?ctx.result, "validator ran");

        let Some(marker) = ctx.result.filter(Value::is_truthy) else {
            return Ok(None);
        };
        let fields = self
            .program
            .referenced_names()
            .into_iter()
            .filter_map(|name| store.get(name).map(|v| (name.to_owned(), v.clone())))
            .collect();
        Ok(Some(ValidationFailure {
            validator: self.spec.name.clone(),
            message: self.spec.error_message.clone(),
            marker,
            fields,
        }))
    }
}

/// Read-only view of a store; writes and pushes are refused.
struct ReadOnly<'a, S: ?Sized>(&'a S);

impl<S: FieldStore + ?Sized> Host for ReadOnly<'_, S> {
    fn read(&self, name: &str) -> Option<Value> {
        self.0.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    const IN_RANGE: &str = "jrgt age minAge 2;setres error;jrgt maxAge age 2;setres error";

    fn validator() -> FormValidator {
        FormValidator::compile(
            "age",
            FormValidatorSpec::new("inRange", "value age not in a range", IN_RANGE),
        )
        .unwrap()
    }

    fn store(age: i32) -> MemoryStore {
        let mut s = MemoryStore::new();
        s.declare("age", Value::from(age));
        s.declare("minAge", Value::from(18));
        s.declare("maxAge", Value::from(65));
        s
    }

    #[test]
    fn below_minimum_fails() {
        let failure = validator()
            .check(&store(10), &EngineOptions::default())
            .unwrap()
            .expect("age 10 is out of range");
        assert_eq!(failure.validator, "inRange");
        assert_eq!(failure.message, "value age not in a range");
        assert_eq!(failure.marker, Value::from("error"));
        assert_eq!(
            failure.fields,
            BTreeMap::from([
                ("age".to_string(), Value::from(10)),
                ("maxAge".to_string(), Value::from(65)),
                ("minAge".to_string(), Value::from(18)),
            ])
        );
    }

    #[test]
    fn within_range_passes() {
        assert_eq!(validator().check(&store(30), &EngineOptions::default()).unwrap(), None);
        assert_eq!(validator().check(&store(18), &EngineOptions::default()).unwrap(), None);
    }

    #[test]
    fn above_maximum_fails() {
        assert!(validator().check(&store(70), &EngineOptions::default()).unwrap().is_some());
    }

    #[test]
    fn falsy_marker_passes() {
        let spec = FormValidatorSpec::new("never", "", "setres 0");
        let v = FormValidator::compile("age", spec).unwrap();
        assert_eq!(v.check(&store(10), &EngineOptions::default()).unwrap(), None);
    }

    #[test]
    fn write_in_validator_is_a_fault() {
        let spec = FormValidatorSpec::new("bad", "", "s age minAge");
        let v = FormValidator::compile("age", spec).unwrap();
        let s = store(10);
        match v.check(&s, &EngineOptions::default()) {
            Err(EngineError::UnauthorizedOpcode { .. }) => {}
            other => panic!("expected UnauthorizedOpcode, got {:?}", other),
        }
        assert_eq!(s.get("age"), Some(&Value::from(10)));
    }

    #[test]
    fn compile_error_surfaces() {
        assert!(FormValidator::compile("age", FormValidatorSpec::new("empty", "", "")).is_err());
    }
}
