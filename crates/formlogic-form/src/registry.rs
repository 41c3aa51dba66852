//! Reference registry -- live handles to rendered components, looked up by
//! identifier when a rule pushes a property.
//!
//! Bindings are grouped by owner so a container can release everything it
//! mounted in one call.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use tracing::debug;

use formlogic_core::Value;

/// A component that accepts property pushes.
pub trait PropertyHandle {
    fn set_property(&mut self, name: &str, value: Value);

    /// Called once when the binding is removed from the registry.
    fn destroy(&mut self) {}
}

/// Opaque owner scope for bulk removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OwnerId(u64);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner-{}", self.0)
    }
}

struct Binding {
    identifier: String,
    handle: Box<dyn PropertyHandle>,
    owner: OwnerId,
}

/// Ordered collection of `(identifier, handle, owner)` bindings.
#[derive(Default)]
pub struct ReferenceRegistry {
    bindings: Vec<Binding>,
    next_owner: u64,
}

impl ReferenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh owner scope.
    pub fn new_owner(&mut self) -> OwnerId {
        self.next_owner += 1;
        OwnerId(self.next_owner)
    }

    /// Append a binding. Earlier bindings for the same identifier keep
    /// precedence.
    pub fn add(
        &mut self,
        identifier: impl Into<String>,
        handle: Box<dyn PropertyHandle>,
        owner: OwnerId,
    ) {
        let identifier = identifier.into();
        debug!(identifier = %identifier, owner = %owner, "binding added");
        self.bindings.push(Binding {
            identifier,
            handle,
            owner,
        });
    }

    /// Remove and destroy every binding registered under `owner`.
    pub fn remove_all(&mut self, owner: OwnerId) -> usize {
        let (mut removed, kept): (Vec<Binding>, Vec<Binding>) = std::mem::take(&mut self.bindings)
            .into_iter()
            .partition(|b| b.owner == owner);
        self.bindings = kept;
        for binding in &mut removed {
            binding.handle.destroy();
        }
        debug!(owner = %owner, removed = removed.len(), "bindings removed");
        removed.len()
    }

    /// First handle bound to `identifier`.
    pub fn find(&self, identifier: &str) -> Option<&dyn PropertyHandle> {
        self.bindings
            .iter()
            .find(|b| b.identifier == identifier)
            .map(|b| b.handle.as_ref())
    }

    pub fn find_mut(&mut self, identifier: &str) -> Option<&mut dyn PropertyHandle> {
        for binding in &mut self.bindings {
            if binding.identifier == identifier {
                let handle: &mut dyn PropertyHandle = binding.handle.as_mut();
                return Some(handle);
            }
        }
        None
    }

    /// Push a property onto the handle bound to `identifier`. Returns `false`
    /// when nothing is bound.
    pub fn push(&mut self, identifier: &str, property: &str, value: Value) -> bool {
        match self.find_mut(identifier) {
            Some(handle) => {
                handle.set_property(property, value);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.bindings.iter().any(|b| b.identifier == identifier)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Identifiers in registration order.
    pub fn identifiers(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.identifier.as_str()).collect()
    }
}

impl fmt::Debug for ReferenceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceRegistry")
            .field("bindings", &self.identifiers())
            .field("next_owner", &self.next_owner)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// PropertySheet
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct SheetState {
    properties: BTreeMap<String, Value>,
    pushes: usize,
    destroyed: bool,
}

/// A [`PropertyHandle`] that records what it receives.
///
/// Clones share state, so keep one clone and hand the other to the registry.
#[derive(Debug, Clone, Default)]
pub struct PropertySheet {
    state: Rc<RefCell<SheetState>>,
}

impl PropertySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value pushed for `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.state.borrow().properties.get(name).cloned()
    }

    /// All properties pushed so far, latest value each.
    pub fn properties(&self) -> BTreeMap<String, Value> {
        self.state.borrow().properties.clone()
    }

    /// Number of pushes received, including repeats.
    pub fn pushes(&self) -> usize {
        self.state.borrow().pushes
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }
}

impl PropertyHandle for PropertySheet {
    fn set_property(&mut self, name: &str, value: Value) {
        let mut state = self.state.borrow_mut();
        state.properties.insert(name.to_owned(), value);
        state.pushes += 1;
    }

    fn destroy(&mut self) {
        self.state.borrow_mut().destroyed = true;
    }
}
