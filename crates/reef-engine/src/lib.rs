//! Reef Engine
//!
//! Deferred, condition-gated activation of document subtrees.
//!
//! A tree of island elements declares async readiness conditions
//! (`on:visible`, `on:idle`, `on:load`, `on:interaction`, `on:media`,
//! `on:save-data`); each island activates only once its own conditions
//! and its nearest conditioned ancestor island have settled. While an
//! island waits, not-yet-defined custom elements inside it are masked
//! behind inert stand-ins and deferred `<template data-island>` markup
//! stays parked.
//!
//! # Example
//! ```rust,ignore
//! use reef_engine::{Config, Engine};
//!
//! let engine = Engine::new(Config::default());
//! // ... build the document tree, then:
//! let islands = engine.scan();
//! engine.host().lifecycle().fire_load();
//! engine.settle();
//! ```

mod config;
mod engine;

pub use config::Config;
pub use engine::Engine;

// Re-export sub-crates for advanced usage
pub use reef_dom as dom;
pub use reef_host as host;
pub use reef_hydrate as hydrate;

pub use reef_hydrate::{HydrateError, Island, IslandState};

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
