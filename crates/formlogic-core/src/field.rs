//! Form definition model -- fields, their rules and form-level validators.
//!
//! Keys are camelCase on the wire (`formValidators`, `dependsOn`,
//! `depsLogic`, `errorMessage`) so existing form configuration loads as-is.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A form definition: an ordered list of fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSpec {
    /// Optional display name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl FormSpec {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// One named unit of form state plus the rules attached to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Unique within the form.
    pub name: String,

    /// Initial value.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,

    /// Encoded simple validators, e.g. `[minlen][3][_0_][maxlen][10]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validators: Option<String>,

    /// Form-level validators whose programs run in validation context.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub form_validators: Vec<FormValidatorSpec>,

    /// Sibling fields whose changes re-run `deps_logic`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Vec<String>>,

    /// Program sources run in dependency-propagation context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deps_logic: Option<Vec<String>>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Attach dependency rules: `programs` re-run whenever any of `deps` changes.
    pub fn with_dependencies<D, P>(mut self, deps: D, programs: P) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        self.depends_on = Some(deps.into_iter().map(Into::into).collect());
        self.deps_logic = Some(programs.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_form_validator(mut self, validator: FormValidatorSpec) -> Self {
        self.form_validators.push(validator);
        self
    }

    pub fn with_validators(mut self, encoded: impl Into<String>) -> Self {
        self.validators = Some(encoded.into());
        self
    }

    /// Returns `true` when both `dependsOn` and `depsLogic` are present.
    pub fn has_dependencies(&self) -> bool {
        self.depends_on.is_some() && self.deps_logic.is_some()
    }
}

/// A named form-level validator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValidatorSpec {
    /// Key the failure is reported under.
    pub name: String,

    #[serde(default)]
    pub error_message: String,

    /// Program source.
    pub code: String,
}

impl FormValidatorSpec {
    pub fn new(
        name: impl Into<String>,
        error_message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            error_message: error_message.into(),
            code: code.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_camel_case_fields() {
        let json = r#"{
            "fields": [
                {
                    "name": "age",
                    "value": 30,
                    "dependsOn": ["minAge"],
                    "depsLogic": ["jrgt age minAge 2;s age minAge"],
                    "formValidators": [
                        {"name": "inRange", "errorMessage": "out of range", "code": "setres error"}
                    ]
                },
                {"name": "minAge", "validators": "[minlen][1]"}
            ]
        }"#;
        let form: FormSpec = serde_json::from_str(json).unwrap();
        assert_eq!(form.field_names(), vec!["age", "minAge"]);

        let age = form.field("age").unwrap();
        assert_eq!(age.value, Value::from(30));
        assert!(age.has_dependencies());
        assert_eq!(age.form_validators[0].error_message, "out of range");

        let min = form.field("minAge").unwrap();
        assert!(!min.has_dependencies());
        assert_eq!(min.value, Value::Null);
        assert_eq!(min.validators.as_deref(), Some("[minlen][1]"));
    }

    #[test]
    fn builder_matches_parsed() {
        let built = FieldSpec::new("minAge")
            .with_value(18)
            .with_dependencies(["maxAge"], ["jrgt maxAge minAge 2;s minAge maxAge"]);
        let yaml = "name: minAge\n\
                    value: 18\n\
                    dependsOn: [maxAge]\n\
                    depsLogic: ['jrgt maxAge minAge 2;s minAge maxAge']\n";
        let parsed: FieldSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(built, parsed);
    }
}
