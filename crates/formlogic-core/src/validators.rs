//! Simple per-field validators encoded as bracketed tokens.
//!
//! `[minlen][3][_0_][maxlen][10]` is two validators: the `[_0_]` token
//! separates groups, the first token of a group names the validator and the
//! rest are its arguments. Text outside brackets is ignored.

use serde::Serialize;

use crate::validation::SpecError;
use crate::value::Value;

/// Token that separates validator groups.
pub const GROUP_SEPARATOR: &str = "_0_";

/// A parsed simple validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Text must have at least this many characters (empty passes).
    MinLength(usize),
    /// Text must have at most this many characters.
    MaxLength(usize),
}

/// A failed [`FieldRule`], reported under [`RuleViolation::key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleViolation {
    #[serde(skip)]
    pub key: &'static str,
    pub required_length: usize,
    pub actual_length: usize,
}

impl FieldRule {
    /// Error key used when the rule fails.
    pub fn key(&self) -> &'static str {
        match self {
            Self::MinLength(_) => "minlength",
            Self::MaxLength(_) => "maxlength",
        }
    }

    /// Check a value. Null and non-text values always pass.
    pub fn check(&self, value: &Value) -> Option<RuleViolation> {
        let actual = value.text_len()?;
        let violated = match *self {
            // An empty value is "not entered yet", not "too short".
            Self::MinLength(min) => actual > 0 && actual < min,
            Self::MaxLength(max) => actual > max,
        };
        violated.then(|| RuleViolation {
            key: self.key(),
            required_length: match *self {
                Self::MinLength(n) | Self::MaxLength(n) => n,
            },
            actual_length: actual,
        })
    }
}

/// Parse an encoded validator list for the field `field`.
///
/// An empty string yields no validators.
pub fn parse_validators(field: &str, encoded: &str) -> Result<Vec<FieldRule>, SpecError> {
    let tokens = bracketed_tokens(encoded);
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let mut groups: Vec<Vec<&str>> = vec![Vec::new()];
    for token in tokens {
        if token == GROUP_SEPARATOR {
            groups.push(Vec::new());
        } else if let Some(current) = groups.last_mut() {
            current.push(token);
        }
    }

    groups
        .into_iter()
        .map(|group| parse_group(field, &group))
        .collect()
}

fn parse_group(field: &str, group: &[&str]) -> Result<FieldRule, SpecError> {
    let Some((name, args)) = group.split_first() else {
        return Err(SpecError::InvalidValidator {
            field: field.to_owned(),
            reason: "empty validator group".into(),
        });
    };
    let length_arg = || -> Result<usize, SpecError> {
        let raw = args.first().ok_or_else(|| SpecError::InvalidValidator {
            field: field.to_owned(),
            reason: format!("{} requires a length argument", name),
        })?;
        raw.trim().parse().map_err(|_| SpecError::InvalidValidator {
            field: field.to_owned(),
            reason: format!("{} length must be a non-negative integer (got {:?})", name, raw),
        })
    };
    match *name {
        "minlen" => Ok(FieldRule::MinLength(length_arg()?)),
        "maxlen" => Ok(FieldRule::MaxLength(length_arg()?)),
        other => Err(SpecError::InvalidValidator {
            field: field.to_owned(),
            reason: format!("unknown validator '{}'", other),
        }),
    }
}

/// Collect the contents of every non-empty `[...]` group.
fn bracketed_tokens(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'[' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end] != b']' {
                end += 1;
            }
            if end < bytes.len() && end > start {
                tokens.push(&text[start..end]);
                i = end + 1;
                continue;
            }
        }
        i += 1;
    }
    tokens
}
