//! `fl version` -- print the version and the instruction set it understands.

use anyhow::Result;

use formlogic_engine::{Opcode, DEFAULT_MAX_STEPS};

use crate::context::RuntimeContext;
use crate::output::output_json;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `FL_BUILD` at compile time, `dev` otherwise.
const BUILD: &str = match option_env!("FL_BUILD") {
    Some(b) => b,
    None => "dev",
};

fn mnemonics() -> Vec<&'static str> {
    Opcode::ALL.iter().map(|op| op.mnemonic()).collect()
}

/// Execute the `fl version` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let platform = format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH);

    if ctx.json {
        output_json(&serde_json::json!({
            "version": VERSION,
            "build": BUILD,
            "platform": platform,
            "opcodes": mnemonics(),
            "defaultMaxSteps": DEFAULT_MAX_STEPS,
        }));
    } else {
        println!("fl version {} ({}) {}", VERSION, BUILD, platform);
        if !ctx.quiet {
            println!("opcodes: {}", mnemonics().join(" "));
        }
    }
    Ok(())
}
