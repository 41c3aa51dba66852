//! Colors and glyphs for `fl` output, on the Ayu Dark palette
//! (<https://github.com/ayu-theme/ayu-colors>).
//!
//! Color marks what needs a second look: failed rows, rejected opcodes,
//! suppressed writes. Plain values and structure stay uncolored or muted.

use owo_colors::OwoColorize;

use formlogic_core::Value;
use formlogic_engine::Opcode;

use crate::terminal::supports_color;

/// The role a piece of text plays, mapped to one palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Pass,
    Warn,
    Fail,
    Muted,
    /// Numbers and section titles.
    Accent,
    /// Control flow (`jrgt`).
    Jump,
}

impl Tone {
    fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Pass => (0xc2, 0xd9, 0x4c),
            Self::Warn => (0xff, 0xb4, 0x54),
            Self::Fail => (0xf0, 0x71, 0x78),
            Self::Muted => (0x6c, 0x76, 0x80),
            Self::Accent => (0x59, 0xc2, 0xff),
            Self::Jump => (0xd2, 0xa6, 0xff),
        }
    }
}

pub const ICON_PASS: &str = "\u{2713}"; // ✓
pub const ICON_WARN: &str = "\u{26A0}"; // ⚠
pub const ICON_FAIL: &str = "\u{2716}"; // ✖

/// Prefix of a nested journal line.
pub const TREE_CHILD: &str = "\u{23BF} "; // ⎿
/// One level of journal nesting.
pub const TREE_INDENT: &str = "  ";

/// Paint `s` in `tone`, or return it unchanged when color is off.
pub fn paint(s: &str, tone: Tone) -> String {
    if !supports_color() {
        return s.to_string();
    }
    let (r, g, b) = tone.rgb();
    s.truecolor(r, g, b).to_string()
}

fn paint_bold(s: &str, tone: Tone) -> String {
    if !supports_color() {
        return s.to_string();
    }
    let (r, g, b) = tone.rgb();
    s.truecolor(r, g, b).bold().to_string()
}

pub fn render_muted(s: &str) -> String {
    paint(s, Tone::Muted)
}

/// Section title: uppercase, bold accent.
pub fn render_category(s: &str) -> String {
    paint_bold(&s.to_uppercase(), Tone::Accent)
}

pub fn render_pass_icon() -> String {
    paint(ICON_PASS, Tone::Pass)
}

pub fn render_warn_icon() -> String {
    paint(ICON_WARN, Tone::Warn)
}

pub fn render_fail_icon() -> String {
    paint(ICON_FAIL, Tone::Fail)
}

/// `null` muted, numbers accented, text quoted.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => render_muted("null"),
        Value::Number(_) => paint(&value.to_string(), Tone::Accent),
        Value::Text(s) => format!("{:?}", s),
    }
}

/// Mnemonic colored by what the opcode does: jumps, writes or results.
pub fn render_opcode(opcode: Opcode) -> String {
    let tone = match opcode {
        Opcode::Jrgt => Tone::Jump,
        Opcode::Set | Opcode::SetProp => Tone::Warn,
        Opcode::SetRes => Tone::Accent,
    };
    paint(opcode.mnemonic(), tone)
}

pub fn render_unknown_opcode(mnemonic: &str) -> String {
    paint_bold(mnemonic, Tone::Fail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_rendering_contains_text() {
        assert!(render_value(&Value::Null).contains("null"));
        assert!(render_value(&Value::from(18)).contains("18"));
        assert!(render_value(&Value::from("abc")).contains("\"abc\""));
    }

    #[test]
    fn opcode_rendering_contains_mnemonic() {
        for op in Opcode::ALL {
            assert!(render_opcode(op).contains(op.mnemonic()));
        }
        assert!(render_unknown_opcode("nop").contains("nop"));
    }

    #[test]
    fn category_is_uppercase() {
        assert!(render_category("fields").contains("FIELDS"));
    }
}
