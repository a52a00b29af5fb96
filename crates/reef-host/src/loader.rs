//! Dynamic module loading
//!
//! Abstraction over the host's dynamic import. The engine only needs
//! "resolve a specifier to a module handle, asynchronously, or fail";
//! bundling and specifier rewriting happen upstream.

use std::cell::RefCell;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

/// A loaded module handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    specifier: String,
}

impl Module {
    pub fn new(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
        }
    }

    /// The specifier this module was loaded from
    #[inline]
    pub fn specifier(&self) -> &str {
        &self.specifier
    }
}

/// Module load failure
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    #[error("module not found: {0}")]
    NotFound(String),
    #[error("module failed to load: {0}")]
    Failed(String),
}

/// Boxed single-threaded future, the loader's return shape
pub type LocalBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host hook for dynamic imports
pub trait ModuleLoader {
    /// Resolve a specifier to a module handle
    fn import<'a>(&'a self, specifier: &str) -> LocalBoxFuture<'a, Result<Module, LoadError>>;
}

/// In-memory loader: every specifier resolves unless denied.
///
/// Keeps the set of specifiers it has served, so tests and demos can
/// assert on what was imported.
#[derive(Debug, Default)]
pub struct StaticLoader {
    denied: RefCell<HashSet<String>>,
    served: RefCell<Vec<String>>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a specifier fail to load
    pub fn deny(&self, specifier: &str) {
        self.denied.borrow_mut().insert(specifier.to_string());
    }

    /// Specifiers served so far, in import order
    pub fn served(&self) -> Vec<String> {
        self.served.borrow().clone()
    }
}

impl ModuleLoader for StaticLoader {
    fn import<'a>(&'a self, specifier: &str) -> LocalBoxFuture<'a, Result<Module, LoadError>> {
        let specifier = specifier.to_string();
        Box::pin(async move {
            if self.denied.borrow().contains(&specifier) {
                return Err(LoadError::NotFound(specifier));
            }
            tracing::info!(%specifier, "module import");
            self.served.borrow_mut().push(specifier.clone());
            Ok(Module::new(specifier))
        })
    }
}

/// Shared loader handle
pub type LoaderHandle = Rc<dyn ModuleLoader>;
