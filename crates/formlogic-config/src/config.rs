//! Engine configuration types and loading.
//!
//! [`EngineConfig`] is resolved in layers with `figment`: built-in defaults,
//! then `formlogic.toml` / `formlogic.yaml` in the working directory (or the
//! single file passed explicitly), then `FORMLOGIC_*` environment variables.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use formlogic_engine::{EngineOptions, JumpRelation, DEFAULT_MAX_STEPS};

/// Prefix of environment variables that override configuration keys.
///
/// `FORMLOGIC_MAX_STEPS=500` sets `max-steps`.
pub const ENV_PREFIX: &str = "FORMLOGIC_";

/// Config files looked up in the working directory, later ones winning.
pub const CONFIG_FILES: [&str; 2] = ["formlogic.toml", "formlogic.yaml"];

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while loading configuration or form definitions.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file could not be read.
    #[error("failed to read file: {0}")]
    ReadError(#[from] std::io::Error),

    /// A file named explicitly does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file extension names no supported format.
    #[error("unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The layered configuration could not be extracted.
    #[error("invalid configuration: {0}")]
    ExtractError(#[from] Box<figment::Error>),

    /// A configuration value was out of range.
    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Resolved engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Maximum rows a single program run may execute.
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,

    /// Relation `jrgt` tests: `greater-or-equal` or `greater`.
    #[serde(default)]
    pub jump_relation: JumpRelation,

    /// `tracing` filter directive installed by the CLI, e.g. `formlogic_form=debug`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

fn default_max_steps() -> u64 {
    DEFAULT_MAX_STEPS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            jump_relation: JumpRelation::default(),
            log_filter: None,
        }
    }
}

impl EngineConfig {
    /// Options handed to every program run.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            max_steps: self.max_steps,
            jump_relation: self.jump_relation,
        }
    }

    fn check(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max-steps".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the layered provider chain.
///
/// With `explicit`, only that file is read (it must exist); otherwise the
/// [`CONFIG_FILES`] in `dir` are read when present.
pub fn figment(dir: &Path, explicit: Option<&Path>) -> Result<Figment> {
    let mut figment = Figment::from(Serialized::defaults(EngineConfig::default()));

    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
            };
        }
        None => {
            figment = figment
                .merge(Toml::file(dir.join(CONFIG_FILES[0])))
                .merge(Yaml::file(dir.join(CONFIG_FILES[1])));
        }
    }

    Ok(figment.merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().replace('_', "-").into())))
}

/// Resolve the engine configuration for `dir`.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] if `explicit` does not exist,
/// [`ConfigError::ExtractError`] if a layer holds a value of the wrong type,
/// or [`ConfigError::InvalidValue`] if a value is out of range.
pub fn load_config(dir: &Path, explicit: Option<&Path>) -> Result<EngineConfig> {
    let config: EngineConfig = figment(dir, explicit)?.extract().map_err(Box::new)?;
    config.check()?;
    debug!(?config, "configuration resolved");
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
