//! Reef Hydrate - Condition-gated island activation
//!
//! The hydration core: a library of composable async readiness
//! conditions, the island activation state machine, the placeholder
//! mask/restore protocol, deferred template promotion, and the init
//! strategy registry. Everything runs on one cooperative executor;
//! ordering falls out of readiness signals, not threads.

mod condition;
mod error;
mod island;
mod placeholder;
mod strategy;
mod template;

pub use condition::{ConditionKind, Conditions, Gate};
pub use error::HydrateError;
pub use island::{
    Hydrator, HydrateOptions, Island, IslandState, ATTR_DEFER, ATTR_IMPORT, ATTR_READY,
    ATTR_TEMPLATE, ATTR_TYPE,
};
pub use placeholder::{
    default_fallback, rename_node, FallbackEntry, FallbackHandler, FallbackMatcher, RestoreFn,
};
pub use strategy::{InitContext, InitFn, InitFuture, StrategyRegistry, DEFAULT_TYPE};
pub use template::{OnceRegistry, TemplatePolicy};
