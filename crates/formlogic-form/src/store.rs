//! Field store -- named values in declaration order.

use formlogic_core::Value;

use crate::error::{FormError, Result};

/// Named field values.
///
/// The form reads and writes fields only through this trait, so a host
/// embedding the engine can back it with its own state.
pub trait FieldStore {
    /// Current value of `name`, `None` if there is no such field.
    fn get(&self, name: &str) -> Option<&Value>;

    /// Replace the value of an existing field.
    fn set(&mut self, name: &str, value: Value) -> Result<()>;

    /// Field names in declaration order.
    fn names(&self) -> Vec<&str>;

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Current values of `names`, in the order given. Unknown names read as
    /// null.
    fn snapshot(&self, names: &[String]) -> Vec<Value> {
        names
            .iter()
            .map(|n| self.get(n).cloned().unwrap_or_default())
            .collect()
    }
}

/// In-memory [`FieldStore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    fields: Vec<(String, Value)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field. Returns `false` (and changes nothing) if the name is
    /// already declared.
    pub fn declare(&mut self, name: impl Into<String>, value: Value) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.fields.push((name, value));
        true
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl FieldStore for MemoryStore {
    fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => {
                *slot = value;
                Ok(())
            }
            None => Err(FormError::UnknownField(name.to_owned())),
        }
    }

    fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }
}
