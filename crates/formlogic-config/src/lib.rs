//! Configuration management for the formlogic system.
//!
//! This crate resolves engine settings from defaults, config files and the
//! environment, and loads form definitions from JSON, YAML or TOML files.

pub mod config;
pub mod forms;

pub use config::{load_config, ConfigError, EngineConfig, Result};
pub use forms::{find_form, load_form};
