//! Terminal styling for formlogic CLI output.
//!
//! Ayu-themed colors for values, opcodes and check results, plus terminal
//! detection that honors `NO_COLOR`.

pub mod styles;
pub mod terminal;
