//! Form -- ties the store, dispatcher, registry and validators together.
//!
//! A host-initiated change is a guarded write followed by synchronous
//! propagation: every subscriber of the changed field runs its programs,
//! which may write further fields (recursively dispatched) and push
//! properties onto bound components. Everything that happened is returned
//! as a [`Journal`].

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, trace, warn};

use formlogic_core::validation::{validate_dependencies, validate_names};
use formlogic_core::validators::{parse_validators, FieldRule, RuleViolation};
use formlogic_core::{FormSpec, SpecError, Value};
use formlogic_engine::{
    compile, run, EngineError, EngineOptions, ExecutionContext, Host, PushOutcome,
    WriteOutcome,
};

use crate::dispatcher::Dispatcher;
use crate::error::{FormError, Result};
use crate::guard::InFlight;
use crate::registry::{OwnerId, PropertyHandle, ReferenceRegistry};
use crate::store::{FieldStore, MemoryStore};
use crate::validator::{FormValidator, ValidationFailure};

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

/// One event recorded while a change propagated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum JournalEntry {
    /// A field was written. `depth` 0 is the host's own write.
    Write {
        field: String,
        value: Value,
        depth: usize,
    },
    /// A write was skipped because the field was already being written.
    Suppressed { field: String, value: Value },
    /// A property reached a bound component.
    Push {
        target: String,
        property: String,
        value: Value,
    },
    /// A property push found no bound component.
    NoBinding { target: String, property: String },
    /// A dependency program failed; its earlier effects stand.
    Failure {
        field: String,
        program: usize,
        kind: &'static str,
        error: String,
    },
}

/// Ordered record of one host-initiated change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    fn record(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes made by dependency programs, excluding the host's own write.
    pub fn propagated_writes(&self) -> Vec<(&str, &Value)> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                JournalEntry::Write {
                    field,
                    value,
                    depth,
                } if *depth > 0 => Some((field.as_str(), value)),
                _ => None,
            })
            .collect()
    }

    pub fn suppressed(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                JournalEntry::Suppressed { field, .. } => Some(field.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<&JournalEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e, JournalEntry::Failure { .. }))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Setup issues and validity
// ---------------------------------------------------------------------------

/// A problem found while building a form that disables part of it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SetupIssue {
    /// The field's declaration is inconsistent; its rules are left out.
    #[error(transparent)]
    Definition(SpecError),

    /// A dependency program failed to compile; the field gets no dependency rules.
    #[error("field {field}: depsLogic[{index}]: {error}")]
    Program {
        field: String,
        index: usize,
        error: EngineError,
    },

    /// A form validator failed to compile and is left out.
    #[error("field {field}: validator {validator}: {error}")]
    Validator {
        field: String,
        validator: String,
        error: EngineError,
    },
}

/// A form validator that could not run to completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatorFault {
    pub field: String,
    pub validator: String,
    pub kind: &'static str,
    pub error: String,
}

/// Outcome of [`Form::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validity {
    pub valid: bool,
    /// Simple validator failures per field, keyed by error key.
    pub field_errors: BTreeMap<String, BTreeMap<&'static str, RuleViolation>>,
    pub form_errors: Vec<ValidationFailure>,
    pub faults: Vec<ValidatorFault>,
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// A live form built from a [`FormSpec`].
#[derive(Debug)]
pub struct Form {
    name: String,
    store: MemoryStore,
    rules: Vec<(String, Vec<FieldRule>)>,
    dispatcher: Dispatcher,
    registry: ReferenceRegistry,
    validators: Vec<FormValidator>,
    issues: Vec<SetupIssue>,
    options: EngineOptions,
    default_owner: OwnerId,
}

impl Form {
    /// Build a form: declare fields with their initial values, then compile
    /// rules and validators.
    ///
    /// Only a nameless or duplicated field fails the build. Any other problem
    /// is recorded as a [`SetupIssue`] and the affected rule is left out.
    pub fn build(spec: &FormSpec, options: EngineOptions) -> Result<Self> {
        validate_names(spec).map_err(|e| match e {
            SpecError::DuplicateField(name) => FormError::DuplicateField(name),
            other => FormError::Definition(other),
        })?;

        let mut store = MemoryStore::new();
        for field in &spec.fields {
            store.declare(field.name.clone(), field.value.clone());
        }

        let mut registry = ReferenceRegistry::new();
        let default_owner = registry.new_owner();
        let mut form = Self {
            name: spec.name.clone(),
            store,
            rules: Vec::new(),
            dispatcher: Dispatcher::new(),
            registry,
            validators: Vec::new(),
            issues: Vec::new(),
            options,
            default_owner,
        };

        for field in &spec.fields {
            if let Some(ref encoded) = field.validators {
                match parse_validators(&field.name, encoded) {
                    Ok(rules) if !rules.is_empty() => form.rules.push((field.name.clone(), rules)),
                    Ok(_) => {}
                    Err(e) => form.issue(SetupIssue::Definition(e)),
                }
            }

            for validator in &field.form_validators {
                match FormValidator::compile(field.name.clone(), validator.clone()) {
                    Ok(v) => form.validators.push(v),
                    Err(error) => form.issue(SetupIssue::Validator {
                        field: field.name.clone(),
                        validator: validator.name.clone(),
                        error,
                    }),
                }
            }

            if let Err(e) = validate_dependencies(spec, field) {
                form.issue(SetupIssue::Definition(e));
                continue;
            }
            let (Some(deps), Some(sources)) = (&field.depends_on, &field.deps_logic) else {
                continue;
            };
            let mut programs = Vec::with_capacity(sources.len());
            let mut failed = false;
            for (index, source) in sources.iter().enumerate() {
                match compile(source) {
                    Ok(p) => programs.push(p),
                    Err(error) => {
                        form.issue(SetupIssue::Program {
                            field: field.name.clone(),
                            index,
                            error,
                        });
                        failed = true;
                    }
                }
            }
            if !failed {
                form.dispatcher
                    .subscribe(&form.store, field.name.clone(), deps.clone(), programs);
            }
        }

        debug!(
            form = %form.name,
            fields = form.store.len(),
            subscriptions = form.dispatcher.len(),
            validators = form.validators.len(),
            issues = form.issues.len(),
            "form built"
        );
        Ok(form)
    }

    fn issue(&mut self, issue: SetupIssue) {
        warn!(%issue, "setup issue");
        self.issues.push(issue);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn issues(&self) -> &[SetupIssue] {
        &self.issues
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn validators(&self) -> &[FormValidator] {
        &self.validators
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.store.names()
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.store.get(name)
    }

    /// Current values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.store.iter()
    }

    /// Change a field as the host would, propagating synchronously to every
    /// dependent field.
    pub fn set_value(&mut self, name: &str, value: Value) -> Result<Journal> {
        if !self.store.contains(name) {
            return Err(FormError::UnknownField(name.to_owned()));
        }
        debug!(field = name, %value, "host change");

        let mut in_flight = InFlight::new();
        let mut journal = Journal::default();
        let mut propagation = Propagation {
            store: &mut self.store,
            registry: &mut self.registry,
            dispatcher: &self.dispatcher,
            in_flight: &mut in_flight,
            options: self.options,
            journal: &mut journal,
        };
        propagation.guarded_write(name, value);
        Ok(journal)
    }

    /// Seed values without running any dependency rules.
    ///
    /// Nothing is written unless every name is a declared field.
    pub fn load_values<I, K>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let values: Vec<(K, Value)> = values.into_iter().collect();
        let unknown = values
            .iter()
            .map(|(name, _)| name.as_ref())
            .find(|name| !self.store.contains(name));
        if let Some(name) = unknown {
            return Err(FormError::UnknownField(name.to_owned()));
        }
        for (name, value) in values {
            self.store.set(name.as_ref(), value)?;
        }
        Ok(())
    }

    /// Bind a component under the form's default owner.
    pub fn mount(
        &mut self,
        identifier: impl Into<String>,
        handle: Box<dyn PropertyHandle>,
    ) -> OwnerId {
        self.registry.add(identifier, handle, self.default_owner);
        self.default_owner
    }

    /// Bind a component under an explicit owner scope.
    pub fn mount_in(
        &mut self,
        owner: OwnerId,
        identifier: impl Into<String>,
        handle: Box<dyn PropertyHandle>,
    ) {
        self.registry.add(identifier, handle, owner);
    }

    /// Release every binding of `owner`. Returns how many were removed.
    pub fn unmount(&mut self, owner: OwnerId) -> usize {
        self.registry.remove_all(owner)
    }

    pub fn registry(&self) -> &ReferenceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ReferenceRegistry {
        &mut self.registry
    }

    /// Run simple validators and form validators against the current values.
    pub fn validate(&self) -> Validity {
        let mut validity = Validity::default();

        for (field, rules) in &self.rules {
            let value = self.store.get(field).cloned().unwrap_or_default();
            let errors: BTreeMap<&'static str, RuleViolation> = rules
                .iter()
                .filter_map(|r| r.check(&value))
                .map(|v| (v.key, v))
                .collect();
            if !errors.is_empty() {
                validity.field_errors.insert(field.clone(), errors);
            }
        }

        for validator in &self.validators {
            match validator.check(&self.store, &self.options) {
                Ok(Some(failure)) => validity.form_errors.push(failure),
                Ok(None) => {}
                Err(error) => {
                    warn!(validator = validator.name(), %error, "validator fault");
                    validity.faults.push(ValidatorFault {
                        field: validator.field().to_owned(),
                        validator: validator.name().to_owned(),
                        kind: error.kind(),
                        error: error.to_string(),
                    });
                }
            }
        }

        validity.valid = validity.field_errors.is_empty()
            && validity.form_errors.is_empty()
            && validity.faults.is_empty();
        validity
    }
}

// ---------------------------------------------------------------------------
// Propagation
// ---------------------------------------------------------------------------

/// Borrowed state for one host-initiated change. Acts as the engine's host
/// for every dependency program run during the change.
struct Propagation<'f, S> {
    store: &'f mut S,
    registry: &'f mut ReferenceRegistry,
    dispatcher: &'f Dispatcher,
    in_flight: &'f mut InFlight,
    options: EngineOptions,
    journal: &'f mut Journal,
}

impl<S: FieldStore> Propagation<'_, S> {
    /// Write `name` unless it is already in flight, then notify its
    /// dependents before clearing the mark.
    fn guarded_write(&mut self, name: &str, value: Value) -> WriteOutcome {
        if !self.store.contains(name) {
            return WriteOutcome::UnknownField;
        }
        if !self.in_flight.enter(name) {
            trace!(field = name, "write suppressed, already in flight");
            self.journal.record(JournalEntry::Suppressed {
                field: name.to_owned(),
                value,
            });
            return WriteOutcome::Suppressed;
        }

        let depth = self.in_flight.depth() - 1;
        let outcome = match self.store.set(name, value.clone()) {
            Ok(()) => {
                self.journal.record(JournalEntry::Write {
                    field: name.to_owned(),
                    value,
                    depth,
                });
                self.dispatch(name);
                WriteOutcome::Applied
            }
            Err(_) => WriteOutcome::UnknownField,
        };
        self.in_flight.leave(name);
        outcome
    }

    /// Deliver the combined change notification for `changed` to every
    /// subscriber, running each subscriber's programs in order.
    fn dispatch(&mut self, changed: &str) {
        let dispatcher = self.dispatcher;
        for subscription in dispatcher.dependents_of(changed) {
            let emission = self.store.snapshot(subscription.dependencies());
            debug!(field = subscription.field(), changed, ?emission, "dispatch");

            for (index, program) in subscription.programs().iter().enumerate() {
                let options = self.options;
                let outcome = run(program, ExecutionContext::propagation(), &mut *self, &options);
                if let Err(error) = outcome {
                    warn!(
                        field = subscription.field(),
                        program = index,
                        %error,
                        "dependency program failed"
                    );
                    self.journal.record(JournalEntry::Failure {
                        field: subscription.field().to_owned(),
                        program: index,
                        kind: error.kind(),
                        error: error.to_string(),
                    });
                }
            }
        }
    }
}

impl<S: FieldStore> Host for Propagation<'_, S> {
    fn read(&self, name: &str) -> Option<Value> {
        self.store.get(name).cloned()
    }

    fn write(&mut self, target: &str, value: Value) -> WriteOutcome {
        self.guarded_write(target, value)
    }

    fn push_property(&mut self, target: &str, property: &str, value: Value) -> PushOutcome {
        if self.registry.push(target, property, value.clone()) {
            self.journal.record(JournalEntry::Push {
                target: target.to_owned(),
                property: property.to_owned(),
                value,
            });
            PushOutcome::Delivered
        } else {
            self.journal.record(JournalEntry::NoBinding {
                target: target.to_owned(),
                property: property.to_owned(),
            });
            PushOutcome::NoBinding
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PropertySheet;
    use formlogic_core::{FieldSpec, FormValidatorSpec};
    use pretty_assertions::assert_eq;

    fn age_range() -> FormSpec {
        FormSpec {
            name: "age-range".into(),
            fields: vec![
                FieldSpec::new("age")
                    .with_dependencies(
                        ["minAge", "maxAge"],
                        ["jrgt age minAge 2;s age minAge;sp age min minAge;\
                          jrgt maxAge age 2;s age maxAge;sp age max maxAge"],
                    )
                    .with_form_validator(FormValidatorSpec::new(
                        "inRange",
                        "value age not in a range",
                        "jrgt age minAge 2;setres error;jrgt maxAge age 2;setres error",
                    )),
                FieldSpec::new("minAge").with_dependencies(
                    ["maxAge"],
                    ["jrgt maxAge minAge 2;s minAge maxAge;sp minAge max maxAge"],
                ),
                FieldSpec::new("maxAge").with_dependencies(
                    ["minAge"],
                    ["jrgt maxAge minAge 2;s maxAge minAge;sp maxAge min minAge"],
                ),
            ],
        }
    }

    fn seeded(age: i32, min: i32, max: i32) -> Form {
        let mut form = Form::build(&age_range(), EngineOptions::default()).unwrap();
        form.load_values([
            ("age", Value::from(age)),
            ("minAge", Value::from(min)),
            ("maxAge", Value::from(max)),
        ])
        .unwrap();
        form
    }

    fn values(form: &Form) -> Vec<(String, Value)> {
        form.values()
            .map(|(n, v)| (n.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn builds_without_issues() {
        let form = Form::build(&age_range(), EngineOptions::default()).unwrap();
        assert!(form.issues().is_empty());
        assert_eq!(form.field_names(), vec!["age", "minAge", "maxAge"]);
        assert_eq!(form.dispatcher().len(), 3);
        assert_eq!(form.validators().len(), 1);
    }

    #[test]
    fn build_runs_no_rules() {
        let spec = FormSpec {
            name: String::new(),
            fields: vec![
                FieldSpec::new("a").with_value(1).with_dependencies(["b"], ["s a b"]),
                FieldSpec::new("b").with_value(2),
            ],
        };
        let form = Form::build(&spec, EngineOptions::default()).unwrap();
        assert_eq!(form.value("a"), Some(&Value::from(1)));
    }

    #[test]
    fn raising_minimum_clamps_age() {
        let mut form = seeded(30, 18, 65);
        let sheet = PropertySheet::new();
        form.mount("age", Box::new(sheet.clone()));

        let journal = form.set_value("minAge", Value::from(40)).unwrap();
        assert_eq!(
            values(&form),
            vec![
                ("age".to_string(), Value::from(40)),
                ("minAge".to_string(), Value::from(40)),
                ("maxAge".to_string(), Value::from(65)),
            ]
        );
        assert_eq!(journal.propagated_writes(), vec![("age", &Value::from(40))]);
        assert_eq!(sheet.get("min"), Some(Value::from(40)));
        assert_eq!(sheet.get("max"), Some(Value::from(65)));
        assert!(journal.failures().is_empty());
        assert!(form.validate().valid);
    }

    #[test]
    fn minimum_above_maximum_corrects_once() {
        let mut form = seeded(30, 18, 65);
        let journal = form.set_value("minAge", Value::from(70)).unwrap();

        let writes: Vec<(&str, &Value)> = journal.propagated_writes();
        assert_eq!(
            writes,
            vec![
                ("age", &Value::from(70)),
                ("age", &Value::from(65)),
                ("maxAge", &Value::from(70)),
                ("age", &Value::from(70)),
            ]
        );
        assert_eq!(writes.iter().filter(|(f, _)| *f == "maxAge").count(), 1);
        assert!(journal.suppressed().is_empty());
        assert!(journal.failures().is_empty());

        let n = |name: &str| form.value(name).unwrap().to_number();
        assert!(n("minAge") <= n("age") && n("age") <= n("maxAge"));
        assert_eq!(n("age"), 70.0);
        assert!(form.validate().valid);
    }

    #[test]
    fn lowering_maximum_cascades() {
        let mut form = seeded(40, 40, 65);
        let journal = form.set_value("maxAge", Value::from(35)).unwrap();
        assert_eq!(
            values(&form),
            vec![
                ("age".to_string(), Value::from(35)),
                ("minAge".to_string(), Value::from(35)),
                ("maxAge".to_string(), Value::from(35)),
            ]
        );
        let written: Vec<&str> = journal.propagated_writes().into_iter().map(|(f, _)| f).collect();
        assert_eq!(written, vec!["age", "minAge"]);
    }

    #[test]
    fn unbound_pushes_are_journaled_not_failed() {
        let mut form = seeded(30, 18, 65);
        let journal = form.set_value("minAge", Value::from(20)).unwrap();
        assert!(journal.failures().is_empty());
        assert!(journal
            .entries()
            .iter()
            .any(|e| matches!(e, JournalEntry::NoBinding { target, .. } if target == "age")));
    }

    #[test]
    fn mutual_dependency_writes_once() {
        let spec = FormSpec {
            name: String::new(),
            fields: vec![
                FieldSpec::new("x").with_dependencies(["y"], ["s x y"]),
                FieldSpec::new("y").with_dependencies(["x"], ["s y x"]),
            ],
        };
        let mut form = Form::build(&spec, EngineOptions::default()).unwrap();
        let journal = form.set_value("x", Value::from(5)).unwrap();

        assert_eq!(journal.propagated_writes(), vec![("y", &Value::from(5))]);
        assert_eq!(journal.suppressed(), vec!["x"]);
        assert_eq!(form.value("y"), Some(&Value::from(5)));
    }

    #[test]
    fn failing_program_does_not_stop_siblings() {
        let spec = FormSpec {
            name: String::new(),
            fields: vec![
                FieldSpec::new("src"),
                FieldSpec::new("a").with_dependencies(["src"], ["s a src;setres x", "s a 7"]),
                FieldSpec::new("b").with_dependencies(["src"], ["s b ghost", "s b src"]),
            ],
        };
        let mut form = Form::build(&spec, EngineOptions::default()).unwrap();
        let journal = form.set_value("src", Value::from(1)).unwrap();

        assert_eq!(form.value("a"), Some(&Value::from(7)));
        assert_eq!(form.value("b"), Some(&Value::from(1)));
        let kinds: Vec<&str> = journal
            .failures()
            .into_iter()
            .filter_map(|e| match e {
                JournalEntry::Failure { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec!["unauthorized-opcode", "missing-field"]);
    }

    #[test]
    fn step_limit_is_a_journaled_failure() {
        let spec = FormSpec {
            name: String::new(),
            fields: vec![
                FieldSpec::new("a"),
                FieldSpec::new("b").with_dependencies(["a"], ["jrgt a a 0"]),
            ],
        };
        let options = EngineOptions {
            max_steps: 100,
            ..EngineOptions::default()
        };
        let mut form = Form::build(&spec, options).unwrap();
        let journal = form.set_value("a", Value::from(1)).unwrap();
        assert!(matches!(
            journal.failures()[..],
            [JournalEntry::Failure { kind: "step-limit-exceeded", .. }]
        ));
    }

    #[test]
    fn unknown_field_rejected() {
        let mut form = seeded(30, 18, 65);
        match form.set_value("ghost", Value::Null) {
            Err(FormError::UnknownField(name)) => assert_eq!(name, "ghost"),
            other => panic!("expected UnknownField, got {:?}", other),
        }
        assert!(form.load_values([("ghost", Value::Null)]).is_err());
    }

    #[test]
    fn load_values_is_all_or_nothing() {
        let mut form = seeded(30, 18, 65);
        match form.load_values([("age", Value::from(50)), ("ghost", Value::Null)]) {
            Err(FormError::UnknownField(name)) => assert_eq!(name, "ghost"),
            other => panic!("expected UnknownField, got {:?}", other),
        }
        assert_eq!(form.value("age"), Some(&Value::from(30)));
    }

    #[test]
    fn duplicate_field_is_fatal() {
        let spec = FormSpec {
            name: String::new(),
            fields: vec![FieldSpec::new("a"), FieldSpec::new("a")],
        };
        match Form::build(&spec, EngineOptions::default()) {
            Err(FormError::DuplicateField(name)) => assert_eq!(name, "a"),
            other => panic!("expected DuplicateField, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn bad_rules_become_setup_issues() {
        let mut unpaired = FieldSpec::new("c");
        unpaired.depends_on = Some(vec!["a".into()]);
        let spec = FormSpec {
            name: String::new(),
            fields: vec![
                FieldSpec::new("a")
                    .with_dependencies(["b"], ["s a b;;"])
                    .with_form_validator(FormValidatorSpec::new("empty", "", "")),
                FieldSpec::new("b").with_validators("[between][1]"),
                unpaired,
            ],
        };
        let mut form = Form::build(&spec, EngineOptions::default()).unwrap();
        assert_eq!(form.issues().len(), 4);
        assert!(matches!(form.issues()[0], SetupIssue::Validator { .. }));
        assert!(matches!(form.issues()[1], SetupIssue::Program { index: 0, .. }));
        assert!(matches!(
            form.issues()[2],
            SetupIssue::Definition(SpecError::InvalidValidator { .. })
        ));
        assert!(matches!(
            form.issues()[3],
            SetupIssue::Definition(SpecError::UnpairedDependencies(_))
        ));

        // The broken field has no rules, so changes do nothing.
        assert!(form.dispatcher().is_empty());
        let journal = form.set_value("b", Value::from(1)).unwrap();
        assert!(journal.propagated_writes().is_empty());
    }

    #[test]
    fn validator_outcomes() {
        let form = seeded(10, 18, 65);
        let validity = form.validate();
        assert!(!validity.valid);
        assert_eq!(validity.form_errors.len(), 1);
        assert_eq!(validity.form_errors[0].validator, "inRange");

        assert!(seeded(30, 18, 65).validate().valid);
        assert!(!seeded(70, 18, 65).validate().valid);
    }

    #[test]
    fn simple_validators_report_keys() {
        let spec = FormSpec {
            name: String::new(),
            fields: vec![FieldSpec::new("nick")
                .with_value("ab")
                .with_validators("[minlen][3][_0_][maxlen][10]")],
        };
        let mut form = Form::build(&spec, EngineOptions::default()).unwrap();
        let validity = form.validate();
        assert!(!validity.valid);
        let errors = &validity.field_errors["nick"];
        assert_eq!(errors["minlength"].required_length, 3);
        assert_eq!(errors["minlength"].actual_length, 2);

        form.set_value("nick", Value::from("a much too long nickname")).unwrap();
        let validity = form.validate();
        assert!(validity.field_errors["nick"].contains_key("maxlength"));

        form.set_value("nick", Value::from("fine")).unwrap();
        assert!(form.validate().valid);
    }

    #[test]
    fn validator_fault_reported_separately() {
        let spec = FormSpec {
            name: String::new(),
            fields: vec![FieldSpec::new("a").with_form_validator(FormValidatorSpec::new(
                "writes",
                "",
                "s a 1",
            ))],
        };
        let form = Form::build(&spec, EngineOptions::default()).unwrap();
        let validity = form.validate();
        assert!(!validity.valid);
        assert!(validity.form_errors.is_empty());
        assert_eq!(validity.faults[0].kind, "unauthorized-opcode");
    }

    #[test]
    fn unmount_releases_bindings() {
        let mut form = seeded(30, 18, 65);
        let sheet = PropertySheet::new();
        let owner = form.mount("age", Box::new(sheet.clone()));
        assert_eq!(form.unmount(owner), 1);
        assert!(sheet.is_destroyed());

        form.set_value("minAge", Value::from(20)).unwrap();
        assert_eq!(sheet.pushes(), 0);
    }

    #[test]
    fn journal_serializes_tagged() {
        let spec = FormSpec {
            name: String::new(),
            fields: vec![FieldSpec::new("a")],
        };
        let mut form = Form::build(&spec, EngineOptions::default()).unwrap();
        let journal = form.set_value("a", Value::from(2)).unwrap();
        assert_eq!(
            serde_json::to_value(&journal).unwrap(),
            serde_json::json!([{"event": "write", "field": "a", "value": 2.0, "depth": 0}])
        );
    }
}
