//! Field values -- the only data that flows between fields, rules and bound
//! components.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The current value of a form field.
///
/// Serialized untagged, so JSON `null`, `30` and `"abc"` map directly onto
/// the three variants.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value entered yet.
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl Value {
    /// Numeric coercion used by comparisons.
    ///
    /// `Null` is 0, text is parsed after trimming (empty text is 0), anything
    /// unparsable is NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Null => 0.0,
            Self::Number(n) => *n,
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
        }
    }

    /// Returns `true` unless the value is null, zero, NaN or empty text.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Text(s) => !s.is_empty(),
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Character count for text values; `None` for null and numbers.
    pub fn text_len(&self) -> Option<usize> {
        match self {
            Self::Text(s) => Some(s.chars().count()),
            _ => None,
        }
    }

    /// Parse user input: a JSON scalar when possible (`30`, `null`, `"x"`),
    /// otherwise the raw text.
    pub fn from_input(input: &str) -> Self {
        match serde_json::from_str::<Value>(input.trim()) {
            Ok(v) => v,
            Err(_) => Self::Text(input.to_owned()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
