//! Readiness signal
//!
//! A multi-waiter, single-resolution signal. `resolve` is idempotent;
//! once resolved the signal never transitions back and late waiters
//! return immediately. Clones share the same underlying state, which
//! is how process-wide condition caches hand every caller "the same
//! future".

use std::cell::Cell;
use std::rc::Rc;

use event_listener::Event;

/// Single-resolution readiness signal
#[derive(Clone)]
pub struct ReadySignal {
    inner: Rc<Inner>,
}

struct Inner {
    resolved: Cell<bool>,
    event: Event,
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadySignal {
    /// Create an unresolved signal
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                resolved: Cell::new(false),
                event: Event::new(),
            }),
        }
    }

    /// Create an already-resolved signal
    pub fn resolved() -> Self {
        let signal = Self::new();
        signal.inner.resolved.set(true);
        signal
    }

    /// Check resolution state without waiting
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.inner.resolved.get()
    }

    /// Resolve the signal, waking all waiters. Resolving twice is a
    /// no-op.
    pub fn resolve(&self) {
        if !self.inner.resolved.replace(true) {
            self.inner.event.notify(usize::MAX);
        }
    }

    /// Wait until the signal resolves. Returns immediately if it
    /// already has.
    pub async fn wait(&self) {
        loop {
            if self.inner.resolved.get() {
                return;
            }
            let listener = self.inner.event.listen();
            // re-check: resolve() may have raced the listener install
            if self.inner.resolved.get() {
                return;
            }
            listener.await;
        }
    }

    /// Check whether two handles share the same underlying signal
    pub fn same_signal(&self, other: &ReadySignal) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for ReadySignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadySignal")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
