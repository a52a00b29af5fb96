//! Media query source
//!
//! Tracks match state per query string and hands out one shared
//! signal per query, resolved on the first match. Repeated islands
//! watching the same query therefore share a single underlying
//! future.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::signal::ReadySignal;

#[derive(Debug)]
struct MediaEntry {
    matches: bool,
    signal: ReadySignal,
}

/// Media query match source
#[derive(Debug)]
pub struct MediaState {
    supported: bool,
    entries: RefCell<HashMap<String, MediaEntry>>,
}

impl MediaState {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Check if the capability is available
    #[inline]
    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Current match state of a query
    pub fn matches(&self, query: &str) -> bool {
        self.entries
            .borrow()
            .get(query)
            .is_some_and(|e| e.matches)
    }

    /// Update a query's match state, resolving its shared signal on
    /// the first match
    pub fn set_matches(&self, query: &str, matches: bool) {
        let mut entries = self.entries.borrow_mut();
        let entry = entries
            .entry(query.to_string())
            .or_insert_with(|| MediaEntry {
                matches: false,
                signal: ReadySignal::new(),
            });
        entry.matches = matches;
        if matches {
            tracing::debug!(query, "media query matched");
            entry.signal.resolve();
        }
    }

    /// The shared per-query signal, resolved immediately when the
    /// query already matches, the query is empty, or the capability is
    /// absent.
    pub fn watch(&self, query: &str) -> ReadySignal {
        if !self.supported || query.is_empty() {
            return ReadySignal::resolved();
        }
        let mut entries = self.entries.borrow_mut();
        let entry = entries
            .entry(query.to_string())
            .or_insert_with(|| MediaEntry {
                matches: false,
                signal: ReadySignal::new(),
            });
        if entry.matches {
            entry.signal.resolve();
        }
        entry.signal.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watchers_share_one_signal() {
        let media = MediaState::new(true);
        let a = media.watch("(min-width: 600px)");
        let b = media.watch("(min-width: 600px)");
        assert!(a.same_signal(&b));
        assert!(!a.is_resolved());

        media.set_matches("(min-width: 600px)", true);
        assert!(a.is_resolved());
        assert!(b.is_resolved());
    }

    #[test]
    fn test_already_matching_resolves() {
        let media = MediaState::new(true);
        media.set_matches("(prefers-reduced-motion)", true);
        assert!(media.watch("(prefers-reduced-motion)").is_resolved());
    }

    #[test]
    fn test_unmatch_does_not_unresolve() {
        let media = MediaState::new(true);
        media.set_matches("q", true);
        media.set_matches("q", false);
        // first match already settled the signal
        assert!(media.watch("q").is_resolved());
        assert!(!media.matches("q"));
    }

    #[test]
    fn test_unsupported_or_empty_query() {
        let media = MediaState::new(false);
        assert!(media.watch("(min-width: 600px)").is_resolved());

        let media = MediaState::new(true);
        assert!(media.watch("").is_resolved());
    }
}
