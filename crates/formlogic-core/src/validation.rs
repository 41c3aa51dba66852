//! Structural rules for form definitions.

use std::collections::HashSet;

use crate::field::{FieldSpec, FormSpec};

/// A form definition that breaks a structural rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    #[error("field name is required")]
    NameRequired,

    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    #[error("field {0}: dependsOn and depsLogic must be given together")]
    UnpairedDependencies(String),

    #[error("field {field}: dependsOn names unknown field {dependency}")]
    UnknownDependency { field: String, dependency: String },

    #[error("field {field}: invalid validators: {reason}")]
    InvalidValidator { field: String, reason: String },
}

/// Check form-wide rules: every field is named and names are unique.
pub fn validate_names(form: &FormSpec) -> Result<(), SpecError> {
    let mut seen = HashSet::new();
    for field in &form.fields {
        if field.name.is_empty() {
            return Err(SpecError::NameRequired);
        }
        if !seen.insert(field.name.as_str()) {
            return Err(SpecError::DuplicateField(field.name.clone()));
        }
    }
    Ok(())
}

/// Check a single field's dependency declaration against its siblings.
pub fn validate_dependencies(form: &FormSpec, field: &FieldSpec) -> Result<(), SpecError> {
    let Some(deps) = (match (&field.depends_on, &field.deps_logic) {
        (Some(deps), Some(_)) => Some(deps),
        (None, None) => None,
        _ => return Err(SpecError::UnpairedDependencies(field.name.clone())),
    }) else {
        return Ok(());
    };
    for dep in deps {
        if form.field(dep).is_none() {
            return Err(SpecError::UnknownDependency {
                field: field.name.clone(),
                dependency: dep.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;

    fn form(fields: Vec<FieldSpec>) -> FormSpec {
        FormSpec {
            name: String::new(),
            fields,
        }
    }

    #[test]
    fn valid_form_passes() {
        let f = form(vec![
            FieldSpec::new("a").with_dependencies(["b"], ["s a b"]),
            FieldSpec::new("b"),
        ]);
        assert_eq!(validate_names(&f), Ok(()));
        for field in &f.fields {
            assert_eq!(validate_dependencies(&f, field), Ok(()));
        }
    }

    #[test]
    fn duplicate_names_fail() {
        let f = form(vec![FieldSpec::new("a"), FieldSpec::new("a")]);
        match validate_names(&f) {
            Err(SpecError::DuplicateField(name)) => assert_eq!(name, "a"),
            other => panic!("expected DuplicateField, got {:?}", other),
        }
    }

    #[test]
    fn empty_name_fails() {
        let f = form(vec![FieldSpec::new("")]);
        assert!(matches!(validate_names(&f), Err(SpecError::NameRequired)));
    }

    #[test]
    fn unpaired_dependencies_fail() {
        let mut a = FieldSpec::new("a");
        a.depends_on = Some(vec!["b".into()]);
        let f = form(vec![a, FieldSpec::new("b")]);
        assert_eq!(
            validate_dependencies(&f, &f.fields[0]),
            Err(SpecError::UnpairedDependencies("a".into()))
        );
        assert_eq!(validate_dependencies(&f, &f.fields[1]), Ok(()));
    }

    #[test]
    fn unknown_dependency_fails() {
        let f = form(vec![FieldSpec::new("a").with_dependencies(["ghost"], ["s a ghost"])]);
        assert!(matches!(
            validate_dependencies(&f, &f.fields[0]),
            Err(SpecError::UnknownDependency { ref dependency, .. }) if dependency == "ghost"
        ));
    }
}
