//! Clap CLI definitions for the `fl` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use formlogic_core::Value;
use formlogic_engine::ContextKind;

/// fl -- rule engine for reactive forms.
#[derive(Parser, Debug)]
#[command(
    name = "fl",
    about = "Rule engine for reactive forms",
    long_about = "Compile field rule programs, propagate changes between dependent fields \
                  and evaluate form validators.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (default: formlogic.toml / formlogic.yaml in the working directory).
    #[arg(long, global = true, env = "FORMLOGIC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the per-run step limit.
    #[arg(long, global = true)]
    pub max_steps: Option<u64>,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a rule program and print its rows.
    Compile(CompileArgs),

    /// Load a form definition and report setup issues.
    Check(CheckArgs),

    /// Apply changes to a form and show how they propagate.
    Run(RunArgs),

    /// Seed values into a form and evaluate its validators.
    Validate(ValidateArgs),

    /// Show the resolved engine configuration.
    Config,

    /// Generate shell completion scripts.
    Completion(CompletionArgs),

    /// Print version information.
    Version,
}

/// Execution context selectable on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextArg {
    Propagation,
    Validation,
}

impl From<ContextArg> for ContextKind {
    fn from(arg: ContextArg) -> Self {
        match arg {
            ContextArg::Propagation => ContextKind::Propagation,
            ContextArg::Validation => ContextKind::Validation,
        }
    }
}

/// Arguments for `fl compile`.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Program source, e.g. "jrgt age minAge 2;s age minAge".
    pub source: String,

    /// Check every row against this context's policy.
    #[arg(long, value_enum)]
    pub context: Option<ContextArg>,
}

/// Arguments for `fl check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Form definition file (JSON, YAML or TOML).
    pub form: String,
}

/// Arguments for `fl run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Form definition file (JSON, YAML or TOML).
    pub form: String,

    /// Change a field, in order (repeatable).
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub set: Vec<Assignment>,
}

/// Arguments for `fl validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Form definition file (JSON, YAML or TOML).
    pub form: String,

    /// Seed a field value without running dependency rules (repeatable).
    #[arg(long = "value", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub values: Vec<Assignment>,
}

/// Arguments for `fl completion`.
#[derive(Args, Debug)]
pub struct CompletionArgs {
    /// Target shell.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// A `name=value` pair from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub value: Value,
}

/// Parse `name=value`. The value is read as a JSON scalar when possible
/// (`30`, `null`, `"x"`), otherwise as plain text.
pub fn parse_assignment(raw: &str) -> Result<Assignment, String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{}'", raw));
    }
    Ok(Assignment {
        name: name.to_string(),
        value: Value::from_input(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn assignment_values_are_typed() {
        assert_eq!(parse_assignment("age=30").unwrap().value, Value::from(30));
        assert_eq!(parse_assignment("age=null").unwrap().value, Value::Null);
        assert_eq!(parse_assignment("nick=bob").unwrap().value, Value::from("bob"));
        assert_eq!(parse_assignment("nick=\"30\"").unwrap().value, Value::from("30"));
        assert_eq!(parse_assignment("note=a=b").unwrap().value, Value::from("a=b"));
    }

    #[test]
    fn assignment_requires_name() {
        assert!(parse_assignment("30").is_err());
        assert!(parse_assignment("=30").is_err());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["fl", "compile", "s a b", "--json", "--max-steps", "5"]);
        assert!(cli.global.json);
        assert_eq!(cli.global.max_steps, Some(5));
    }
}
