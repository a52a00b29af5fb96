//! Page lifecycle sources
//!
//! Load and idle signals for the current page view. Both fire at most
//! once per process; the load signal doubles as the document ready
//! state.

use std::cell::Cell;

use crate::signal::ReadySignal;

/// Document ready state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyState {
    #[default]
    Loading,
    Complete,
}

/// Page load and idle event sources
#[derive(Debug)]
pub struct Lifecycle {
    ready_state: Cell<ReadyState>,
    load: ReadySignal,
    idle_supported: bool,
    idle: ReadySignal,
}

impl Lifecycle {
    pub fn new(idle_supported: bool) -> Self {
        Self {
            ready_state: Cell::new(ReadyState::Loading),
            load: ReadySignal::new(),
            idle_supported,
            idle: ReadySignal::new(),
        }
    }

    /// Current document ready state
    #[inline]
    pub fn ready_state(&self) -> ReadyState {
        self.ready_state.get()
    }

    /// Check if the idle-callback capability is available
    #[inline]
    pub fn idle_supported(&self) -> bool {
        self.idle_supported
    }

    /// Fire the page load event
    pub fn fire_load(&self) {
        self.ready_state.set(ReadyState::Complete);
        tracing::debug!("page load fired");
        self.load.resolve();
    }

    /// Fire the browser idle callback
    pub fn fire_idle(&self) {
        tracing::debug!("idle fired");
        self.idle.resolve();
    }

    /// The shared load signal. Resolved for documents already complete
    /// at construction time via `fire_load`.
    pub fn load_signal(&self) -> ReadySignal {
        self.load.clone()
    }

    /// The shared idle signal. Without capability support this is
    /// already resolved, degrading idle gates to load-only.
    pub fn idle_signal(&self) -> ReadySignal {
        if !self.idle_supported {
            return ReadySignal::resolved();
        }
        self.idle.clone()
    }
}
