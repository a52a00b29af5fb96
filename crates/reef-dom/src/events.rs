//! Event listeners
//!
//! Per-node listener registry with once-semantics. Dispatch happens in
//! two phases (collect, then invoke) so a callback may re-enter the
//! document and remove its sibling listeners.

use std::collections::HashMap;
use std::rc::Rc;

use crate::NodeId;

/// Listener identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listener callback; invoked outside any document borrow
pub type ListenerFn = Rc<dyn Fn()>;

/// A registered event listener
pub struct Listener {
    pub id: ListenerId,
    pub event: String,
    pub once: bool,
    callback: ListenerFn,
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}

/// Registry of event listeners keyed by node
#[derive(Debug, Default)]
pub struct EventRegistry {
    next_id: u64,
    listeners: HashMap<NodeId, Vec<Listener>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener on a node
    pub fn add(&mut self, node: NodeId, event: &str, once: bool, callback: ListenerFn) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.entry(node).or_default().push(Listener {
            id,
            event: event.to_string(),
            once,
            callback,
        });
        id
    }

    /// Remove a listener by id; removing an already-removed listener
    /// is a no-op
    pub fn remove(&mut self, node: NodeId, id: ListenerId) {
        if let Some(list) = self.listeners.get_mut(&node) {
            list.retain(|l| l.id != id);
        }
    }

    /// Collect the callbacks listening for `event` on `node`, removing
    /// once-listeners from the registry
    pub fn collect_fired(&mut self, node: NodeId, event: &str) -> Vec<ListenerFn> {
        let Some(list) = self.listeners.get_mut(&node) else {
            return Vec::new();
        };
        let fired: Vec<ListenerFn> = list
            .iter()
            .filter(|l| l.event == event)
            .map(|l| Rc::clone(&l.callback))
            .collect();
        list.retain(|l| l.event != event || !l.once);
        fired
    }

    /// Number of listeners currently registered on a node
    pub fn count(&self, node: NodeId) -> usize {
        self.listeners.get(&node).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_once_listener_removed_on_fire() {
        let mut reg = EventRegistry::new();
        let node = NodeId(1);
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        reg.add(node, "click", true, Rc::new(move || h.set(h.get() + 1)));

        for cb in reg.collect_fired(node, "click") {
            cb();
        }
        assert_eq!(hits.get(), 1);
        assert_eq!(reg.count(node), 0);

        // second dispatch finds nothing
        assert!(reg.collect_fired(node, "click").is_empty());
    }

    #[test]
    fn test_remove_by_id() {
        let mut reg = EventRegistry::new();
        let node = NodeId(2);
        let id = reg.add(node, "touchstart", true, Rc::new(|| {}));
        reg.add(node, "click", true, Rc::new(|| {}));

        reg.remove(node, id);
        assert_eq!(reg.count(node), 1);
        assert!(reg.collect_fired(node, "touchstart").is_empty());
    }
}
