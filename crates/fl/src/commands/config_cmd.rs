//! `fl config` -- show the resolved engine configuration.

use anyhow::Result;

use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `fl config` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let config = ctx.engine_config()?;

    if ctx.json {
        output_json(&config);
    } else {
        println!("max-steps = {}", config.max_steps);
        println!("jump-relation = {}", config.jump_relation);
        println!(
            "log-filter = {}",
            config.log_filter.as_deref().unwrap_or("(none)")
        );
    }
    Ok(())
}
