//! Reentrancy guard for field writes.
//!
//! A write to a field that is already being written further up the
//! propagation chain is skipped. That breaks cycles between mutually
//! dependent fields after a single round.

/// Names currently undergoing a guarded write, innermost last.
///
/// One set is created per host-initiated change and passed down the write
/// chain; it is empty again once the change has fully propagated.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InFlight {
    names: Vec<String>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Mark `name` as in flight. Returns `false` if it already was, in which
    /// case the caller must skip the write.
    pub fn enter(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.names.push(name.to_owned());
        true
    }

    /// Clear the mark set by a successful [`InFlight::enter`].
    pub fn leave(&mut self, name: &str) {
        if let Some(pos) = self.names.iter().rposition(|n| n == name) {
            self.names.remove(pos);
        }
    }

    /// Number of writes currently nested.
    pub fn depth(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reentry_refused_until_left() {
        let mut g = InFlight::new();
        assert!(g.enter("x"));
        assert!(g.enter("y"));
        assert!(!g.enter("x"));
        assert_eq!(g.depth(), 2);

        g.leave("y");
        g.leave("x");
        assert!(g.is_empty());
        assert!(g.enter("x"));
    }

    #[test]
    fn leave_unknown_is_noop() {
        let mut g = InFlight::new();
        g.leave("x");
        assert!(g.is_empty());
    }
}
