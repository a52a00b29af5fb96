//! Reef Host - Environment adapters
//!
//! Everything a condition's real-world trigger needs from the
//! surrounding environment, modeled as "event source → future"
//! adapters: viewport intersection, page lifecycle (load/idle),
//! media-query matching, the connection's data-saver preference, and
//! dynamic module loading. Each source fires at most the documented
//! number of times, then detaches. Missing capabilities are explicit
//! and degrade, never panic.

mod lifecycle;
mod loader;
mod media;
mod signal;
mod viewport;

pub use lifecycle::{Lifecycle, ReadyState};
pub use loader::{LoadError, LoaderHandle, LocalBoxFuture, Module, ModuleLoader, StaticLoader};
pub use media::MediaState;
pub use signal::ReadySignal;
pub use viewport::{Intersection, Rect};

use std::rc::Rc;

/// Connection information reported by the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    /// Whether the user has asked for reduced data usage
    pub save_data: bool,
}

/// Which environment capabilities are present
#[derive(Debug, Clone, Copy)]
pub struct HostCapabilities {
    pub intersection_observer: bool,
    pub idle_callback: bool,
    pub match_media: bool,
    /// Connection info; `None` means the capability is absent
    pub connection: Option<Connection>,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            intersection_observer: true,
            idle_callback: true,
            match_media: true,
            connection: None,
        }
    }
}

/// The assembled host environment
pub struct Host {
    intersection: Intersection,
    lifecycle: Lifecycle,
    media: MediaState,
    connection: Option<Connection>,
    loader: LoaderHandle,
}

impl Host {
    pub fn new(capabilities: HostCapabilities, loader: LoaderHandle) -> Self {
        Self {
            intersection: Intersection::new(capabilities.intersection_observer),
            lifecycle: Lifecycle::new(capabilities.idle_callback),
            media: MediaState::new(capabilities.match_media),
            connection: capabilities.connection,
            loader,
        }
    }

    /// Default capabilities with the in-memory loader
    pub fn with_defaults() -> Self {
        Self::new(HostCapabilities::default(), Rc::new(StaticLoader::new()))
    }

    #[inline]
    pub fn intersection(&self) -> &Intersection {
        &self.intersection
    }

    #[inline]
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    #[inline]
    pub fn media(&self) -> &MediaState {
        &self.media
    }

    /// Reported connection info, if the capability exists
    #[inline]
    pub fn connection(&self) -> Option<Connection> {
        self.connection
    }

    /// The module loader hook
    #[inline]
    pub fn loader(&self) -> &LoaderHandle {
        &self.loader
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("intersection", &self.intersection)
            .field("lifecycle", &self.lifecycle)
            .field("media", &self.media)
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}
