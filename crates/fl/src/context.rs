//! Per-invocation state shared by every `fl` command: output mode, where
//! configuration comes from, and where form names resolve.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use formlogic_config::{find_form, load_config, load_form, EngineConfig};
use formlogic_core::FormSpec;

use crate::cli::GlobalArgs;

/// Built once in `main` from the global flags.
#[derive(Debug)]
pub struct RuntimeContext {
    /// `--json`: machine-readable stdout and stderr.
    pub json: bool,

    /// `-v`: install the debug log filter.
    pub verbose: bool,

    /// `-q`: print only results and errors.
    pub quiet: bool,

    /// Config file given with `--config`.
    pub config_path: Option<PathBuf>,

    /// Step limit given with `--max-steps`; wins over every config layer.
    pub max_steps: Option<u64>,

    /// Directory config files and relative form names resolve against.
    pub cwd: PathBuf,
}

impl RuntimeContext {
    pub fn from_global_args(global: &GlobalArgs) -> Self {
        Self {
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
            config_path: global.config.clone(),
            max_steps: global.max_steps,
            cwd: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Resolve the engine configuration, applying command-line overrides.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = load_config(&self.cwd, self.config_path.as_deref())
            .context("failed to load configuration")?;
        if let Some(max_steps) = self.max_steps {
            anyhow::ensure!(max_steps > 0, "--max-steps must be at least 1");
            config.max_steps = max_steps;
        }
        Ok(config)
    }

    /// Locate and parse a form definition.
    pub fn load_form(&self, name: &str) -> Result<(PathBuf, FormSpec)> {
        let path =
            find_form(name, &self.cwd).with_context(|| format!("form '{}' not found", name))?;
        let spec = load_form(&path)
            .with_context(|| format!("failed to load form {}", path.display()))?;
        Ok((path, spec))
    }
}
