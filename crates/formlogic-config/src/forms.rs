//! Load form definitions (JSON, YAML or TOML) and resolve form paths.

use std::path::{Path, PathBuf};

use tracing::debug;

use formlogic_core::FormSpec;

use crate::config::{ConfigError, Result};

/// Suffixes tried, in order, when a form is named without one.
const SUFFIXES: [&str; 8] = [
    ".form.json",
    ".form.yaml",
    ".form.yml",
    ".form.toml",
    ".json",
    ".yaml",
    ".yml",
    ".toml",
];

pub fn parse_json(content: &str) -> Result<FormSpec> {
    Ok(serde_json::from_str(content)?)
}

pub fn parse_yaml(content: &str) -> Result<FormSpec> {
    Ok(serde_yaml::from_str(content)?)
}

pub fn parse_toml(content: &str) -> Result<FormSpec> {
    Ok(toml::from_str(content)?)
}

/// Load a form definition, picking the format by extension.
///
/// Files without a recognised extension are tried as JSON, then YAML.
pub fn load_form(path: &Path) -> Result<FormSpec> {
    let content = std::fs::read_to_string(path)?;
    let form = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_json(&content)?,
        Some("yaml") | Some("yml") => parse_yaml(&content)?,
        Some("toml") => parse_toml(&content)?,
        _ => parse_json(&content).or_else(|_| parse_yaml(&content))?,
    };
    debug!(path = %path.display(), fields = form.fields.len(), "form loaded");
    Ok(form)
}

/// Resolve a form argument to a file.
///
/// Search order:
/// 1. The path as given (absolute, or relative to `cwd`)
/// 2. `cwd` joined with `name` plus each known suffix
pub fn find_form(name: &str, cwd: &Path) -> Result<PathBuf> {
    let exact = Path::new(name);
    if exact.is_absolute() && exact.is_file() {
        return Ok(exact.to_path_buf());
    }
    let relative = cwd.join(name);
    if relative.is_file() {
        return Ok(relative);
    }

    SUFFIXES
        .iter()
        .map(|suffix| cwd.join(format!("{}{}", name, suffix)))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ConfigError::NotFound(PathBuf::from(name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use formlogic_core::Value;
    use pretty_assertions::assert_eq;

    const YAML: &str = r#"
name: age-range
fields:
  - name: age
    dependsOn: [minAge]
    depsLogic:
      - "jrgt age minAge 2;s age minAge"
  - name: minAge
    value: 18
"#;

    #[test]
    fn parse_yaml_form() {
        let form = parse_yaml(YAML).unwrap();
        assert_eq!(form.name, "age-range");
        assert_eq!(form.field_names(), vec!["age", "minAge"]);
        assert_eq!(form.fields[1].value, Value::from(18));
    }

    #[test]
    fn parse_toml_form() {
        let toml = r#"
name = "age-range"

[[fields]]
name = "age"
dependsOn = ["minAge"]
depsLogic = ["jrgt age minAge 2;s age minAge"]

[[fields]]
name = "minAge"
value = 18
"#;
        let form = parse_toml(toml).unwrap();
        assert_eq!(form, parse_yaml(YAML).unwrap());
    }

    #[test]
    fn load_by_extension_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("age.yaml");
        std::fs::write(&yaml, YAML).unwrap();
        assert_eq!(load_form(&yaml).unwrap().fields.len(), 2);

        let bare = dir.path().join("age");
        std::fs::write(&bare, YAML).unwrap();
        assert_eq!(load_form(&bare).unwrap().name, "age-range");

        let json = dir.path().join("min.json");
        std::fs::write(&json, r#"{"fields": [{"name": "a"}]}"#).unwrap();
        assert_eq!(load_form(&json).unwrap().field_names(), vec!["a"]);
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_form(&path), Err(ConfigError::JsonError(_))));
        assert!(matches!(
            load_form(&dir.path().join("missing.json")),
            Err(ConfigError::ReadError(_))
        ));
    }

    #[test]
    fn find_form_tries_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("signup.form.yaml"), YAML).unwrap();
        let found = find_form("signup", dir.path()).unwrap();
        assert_eq!(found, dir.path().join("signup.form.yaml"));
        assert_eq!(find_form("signup.form.yaml", dir.path()).unwrap(), found);
        assert!(matches!(
            find_form("absent", dir.path()),
            Err(ConfigError::NotFound(_))
        ));
    }
}
