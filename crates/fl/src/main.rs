//! `fl` -- rule engine CLI for reactive forms.
//!
//! Parses CLI arguments with clap, resolves the runtime context, and
//! dispatches to command handlers.

mod cli;
mod commands;
mod context;
mod output;

use clap::Parser;

use cli::{Cli, Commands};
use context::RuntimeContext;

/// Filter installed by `--verbose`.
const VERBOSE_FILTER: &str =
    "fl=debug,formlogic_engine=debug,formlogic_form=debug,formlogic_config=debug";

fn main() {
    let cli = Cli::parse();
    let ctx = RuntimeContext::from_global_args(&cli.global);

    init_logging(&ctx);

    let result = match cli.command {
        Some(Commands::Compile(args)) => commands::compile::run(&ctx, &args),
        Some(Commands::Check(args)) => commands::check::run(&ctx, &args),
        Some(Commands::Run(args)) => commands::run::run(&ctx, &args),
        Some(Commands::Validate(args)) => commands::validate::run(&ctx, &args),
        Some(Commands::Config) => commands::config_cmd::run(&ctx),
        Some(Commands::Completion(args)) => commands::completion::run(&ctx, &args),
        Some(Commands::Version) => commands::version::run(&ctx),
        None => {
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        report_error(&e, ctx.json);
        std::process::exit(1);
    }
}

/// Print a failed command's error chain to stderr, as JSON under `--json`.
fn report_error(err: &anyhow::Error, json: bool) {
    let message = format!("{:#}", err);
    if !json {
        eprintln!("Error: {}", message);
        return;
    }
    match serde_json::to_string_pretty(&serde_json::json!({ "error": message })) {
        Ok(s) => eprintln!("{}", s),
        Err(_) => eprintln!("Error: {}", message),
    }
}

/// Install a stderr subscriber when `--verbose` is given or the
/// configuration names a `log-filter`.
fn init_logging(ctx: &RuntimeContext) {
    let filter = if ctx.verbose {
        VERBOSE_FILTER.to_string()
    } else {
        match ctx.engine_config().ok().and_then(|c| c.log_filter) {
            Some(filter) => filter,
            None => return,
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
