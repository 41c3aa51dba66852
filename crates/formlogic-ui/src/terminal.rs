//! Decide whether `fl` output gets ANSI colors.

use std::env;

use crossterm::tty::IsTty;

/// Returns `true` if stdout is a terminal.
pub fn is_tty() -> bool {
    std::io::stdout().is_tty()
}

/// Color policy, first match wins:
///
/// 1. `NO_COLOR` set (any value): off
/// 2. `CLICOLOR=0` or `TERM=dumb`: off
/// 3. `CLICOLOR_FORCE` set: on, even when piped
/// 4. otherwise on only for a TTY
pub fn supports_color() -> bool {
    let off = env::var_os("NO_COLOR").is_some()
        || env::var("CLICOLOR").is_ok_and(|v| v == "0")
        || env::var("TERM").is_ok_and(|v| v == "dumb");
    match (off, env::var_os("CLICOLOR_FORCE").is_some()) {
        (true, _) => false,
        (false, true) => true,
        (false, false) => is_tty(),
    }
}
