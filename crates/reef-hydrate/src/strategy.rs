//! Init strategies
//!
//! Named activation routines run once an island's conditions and
//! ancestor have settled. The host registers bindings for its view
//! libraries; the engine only awaits them. Lookup falls back from the
//! declared `type` to the raw import specifier, and a declared import
//! with no explicit type runs the built-in default strategy (the
//! module load itself is the work).

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use reef_dom::{Document, NodeId};
use reef_host::Module;

use crate::error::HydrateError;
use crate::island::{Hydrator, Island, ATTR_IMPORT, ATTR_TYPE};

/// Name of the built-in strategy used for bare imports
pub const DEFAULT_TYPE: &str = "default";

/// What an init strategy is given to work with
#[derive(Clone)]
pub struct InitContext {
    pub document: Rc<RefCell<Document>>,
    /// The island element, the strategy's receiver
    pub node: NodeId,
    /// The dynamically imported module, when `import` was declared
    pub module: Option<Module>,
}

/// Boxed strategy future
pub type InitFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>>>>;

/// An init strategy
pub type InitFn = Rc<dyn Fn(InitContext) -> InitFuture>;

/// Name → strategy table; last registration wins
pub struct StrategyRegistry {
    entries: RefCell<HashMap<String, InitFn>>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyRegistry {
    /// Create a registry holding the built-in default strategy
    pub fn new() -> Self {
        let registry = Self {
            entries: RefCell::new(HashMap::new()),
        };
        // the import itself is the activation; nothing further to run
        registry.add(DEFAULT_TYPE, Rc::new(|_ctx| Box::pin(async { Ok(()) })));
        registry
    }

    /// Register a strategy by name, replacing any previous one
    pub fn add(&self, name: &str, init: InitFn) {
        self.entries.borrow_mut().insert(name.to_string(), init);
    }

    /// Look up a strategy
    pub fn get(&self, name: &str) -> Option<InitFn> {
        self.entries.borrow().get(name).cloned()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.entries.borrow().keys().cloned().collect();
        f.debug_struct("StrategyRegistry")
            .field("names", &names)
            .finish()
    }
}

impl Hydrator {
    /// Run the island's declared strategy, if any.
    ///
    /// A declared type or specifier with no registered handler is a
    /// no-op; loader and strategy failures propagate to the caller.
    pub(crate) async fn run_strategy(&self, island: &Rc<Island>) -> Result<(), HydrateError> {
        let node = island.node();
        let (type_attr, import_attr) = {
            let doc = self.doc.borrow();
            (
                doc.attr(node, ATTR_TYPE).map(str::to_string),
                doc.attr(node, ATTR_IMPORT).map(str::to_string),
            )
        };

        let lookup = type_attr
            .clone()
            .or_else(|| import_attr.clone())
            .map(|key| (key.clone(), self.strategies.get(&key)));
        let (name, init) = match lookup {
            None => return Ok(()),
            Some((name, Some(init))) => (name, init),
            // a bare import with no custom binding runs the default
            // strategy; an unknown declared type is a no-op
            Some((name, None)) => {
                if type_attr.is_none() {
                    match self.strategies.get(DEFAULT_TYPE) {
                        Some(init) => (DEFAULT_TYPE.to_string(), init),
                        None => return Ok(()),
                    }
                } else {
                    tracing::warn!(?node, %name, "no init strategy registered, skipping");
                    return Ok(());
                }
            }
        };

        let module = match &import_attr {
            Some(specifier) => Some(self.host.loader().import(specifier).await?),
            None => None,
        };

        tracing::debug!(?node, %name, "running init strategy");
        let context = InitContext {
            document: Rc::clone(&self.doc),
            node,
            module,
        };
        init(context)
            .await
            .map_err(|source| HydrateError::Strategy { name, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_registration_wins() {
        let registry = StrategyRegistry::new();
        registry.add("vue", Rc::new(|_| Box::pin(async { anyhow::bail!("first") })));
        registry.add("vue", Rc::new(|_| Box::pin(async { Ok(()) })));

        let init = registry.get("vue").unwrap();
        let ctx = InitContext {
            document: Rc::new(RefCell::new(Document::new())),
            node: NodeId::NONE,
            module: None,
        };
        assert!(smol::block_on(init(ctx)).is_ok());
    }

    #[test]
    fn test_unknown_lookup() {
        let registry = StrategyRegistry::new();
        assert!(registry.get("marko").is_none());
        assert!(registry.get(DEFAULT_TYPE).is_some());
    }
}
