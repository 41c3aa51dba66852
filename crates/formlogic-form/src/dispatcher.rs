//! Dependency change dispatcher.
//!
//! Each field with dependency rules subscribes to the combined change
//! notification of the fields it depends on. Subscribing yields the current
//! values immediately (the replay emission); that one is dropped so rules run
//! only on real changes.

use tracing::trace;

use formlogic_engine::Program;

use crate::store::FieldStore;

/// One field's interest in its dependencies.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    field: String,
    dependencies: Vec<String>,
    programs: Vec<Program>,
}

impl Subscription {
    /// The field that owns the programs.
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Programs run, in order, on every change to a dependency.
    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d == name)
    }
}

/// Subscriptions in field declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatcher {
    subscriptions: Vec<Subscription>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `field` to changes of `dependencies`.
    ///
    /// The replay emission is taken from `store` and discarded.
    pub fn subscribe<S: FieldStore + ?Sized>(
        &mut self,
        store: &S,
        field: impl Into<String>,
        dependencies: Vec<String>,
        programs: Vec<Program>,
    ) {
        let field = field.into();
        let replay = store.snapshot(&dependencies);
        trace!(field = %field, ?replay, "subscribed; replay emission skipped");
        self.subscriptions.push(Subscription {
            field,
            dependencies,
            programs,
        });
    }

    /// Subscriptions affected by a change to `changed`, in declaration order.
    pub fn dependents_of<'a>(&'a self, changed: &'a str) -> impl Iterator<Item = &'a Subscription> {
        self.subscriptions.iter().filter(move |s| s.depends_on(changed))
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use formlogic_core::Value;
    use formlogic_engine::compile;
    use pretty_assertions::assert_eq;

    fn store() -> MemoryStore {
        let mut s = MemoryStore::new();
        for name in ["age", "minAge", "maxAge"] {
            s.declare(name, Value::Null);
        }
        s
    }

    #[test]
    fn dependents_in_declaration_order() {
        let store = store();
        let mut d = Dispatcher::new();
        let p = compile("s age minAge").unwrap();
        d.subscribe(&store, "age", vec!["minAge".into(), "maxAge".into()], vec![p.clone()]);
        d.subscribe(&store, "minAge", vec!["maxAge".into()], vec![p.clone()]);
        d.subscribe(&store, "maxAge", vec!["minAge".into()], vec![p]);

        let fields: Vec<&str> = d.dependents_of("minAge").map(|s| s.field()).collect();
        assert_eq!(fields, vec!["age", "maxAge"]);
        let fields: Vec<&str> = d.dependents_of("maxAge").map(|s| s.field()).collect();
        assert_eq!(fields, vec!["age", "minAge"]);
        assert_eq!(d.dependents_of("age").count(), 0);
    }

    #[test]
    fn subscribing_does_not_touch_store() {
        let store = store();
        let before = store.clone();
        let mut d = Dispatcher::new();
        d.subscribe(&store, "age", vec!["minAge".into()], vec![compile("s age minAge").unwrap()]);
        assert_eq!(store, before);
        assert_eq!(d.len(), 1);
        assert_eq!(d.subscriptions()[0].programs().len(), 1);
    }
}
