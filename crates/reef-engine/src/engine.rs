//! Engine - wires the document, host environment, and hydrator
//! together over one cooperative executor

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use smol::LocalExecutor;

use reef_dom::{Document, NodeId};
use reef_host::{Host, LoaderHandle, StaticLoader};
use reef_hydrate::{FallbackHandler, FallbackMatcher, Hydrator, InitFn, Island};

use crate::config::Config;

/// The assembled hydration engine for one page view
pub struct Engine {
    doc: Rc<RefCell<Document>>,
    host: Rc<Host>,
    hydrator: Rc<Hydrator>,
    executor: Rc<LocalExecutor<'static>>,
    config: Config,
}

impl Engine {
    /// Create an engine with the in-memory module loader
    pub fn new(config: Config) -> Self {
        Self::with_loader(config, Rc::new(StaticLoader::new()))
    }

    /// Create an engine with a host-supplied module loader
    pub fn with_loader(config: Config, loader: LoaderHandle) -> Self {
        let doc = Rc::new(RefCell::new(Document::new()));
        // the island element itself is live, never a masking candidate
        let _ = doc.borrow_mut().defined_mut().define(&config.tag_name);

        let host = Rc::new(Host::new(config.capabilities(), loader));
        let executor = Rc::new(LocalExecutor::new());
        let hydrator = Hydrator::new(
            Rc::clone(&doc),
            Rc::clone(&host),
            config.options(),
            Rc::clone(&executor),
        );
        tracing::info!(tag = %config.tag_name, "engine created");
        Self {
            doc,
            host,
            hydrator,
            executor,
            config,
        }
    }

    /// The engine's document
    pub fn document(&self) -> Rc<RefCell<Document>> {
        Rc::clone(&self.doc)
    }

    /// The host environment
    #[inline]
    pub fn host(&self) -> &Rc<Host> {
        &self.host
    }

    /// The hydrator driving island activation
    #[inline]
    pub fn hydrator(&self) -> &Rc<Hydrator> {
        &self.hydrator
    }

    /// Engine configuration
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Attach one island element and start its hydration
    pub fn attach(&self, node: NodeId) -> Rc<Island> {
        self.hydrator.attach(node)
    }

    /// Discover island elements in document order and attach each
    pub fn scan(&self) -> Vec<Rc<Island>> {
        let islands: Vec<NodeId> = {
            let doc = self.doc.borrow();
            let root = doc.root();
            doc.tree()
                .descendants(root)
                .filter(|&n| doc.tag_name(n) == Some(self.config.tag_name.as_str()))
                .collect()
        };
        tracing::debug!(count = islands.len(), "island scan");
        islands.into_iter().map(|n| self.attach(n)).collect()
    }

    /// Resolve once every qualifying ancestor island of `node` is
    /// ready
    pub fn ready_when(&self, node: NodeId) -> impl Future<Output = ()> + 'static {
        self.hydrator.ready_when(node)
    }

    /// Register an init strategy by name
    pub fn add_init_type(&self, name: &str, init: InitFn) {
        self.hydrator.add_init_type(name, init);
    }

    /// Merge a placeholder selector/handler pair into the fallback
    /// table
    pub fn add_fallback(&self, key: &str, matches: FallbackMatcher, handler: FallbackHandler) {
        self.hydrator.add_fallback(key, matches, handler);
    }

    /// Spawn a host task onto the engine's executor
    pub fn spawn<T: 'static>(&self, future: impl Future<Output = T> + 'static) -> smol::Task<T> {
        self.executor.spawn(future)
    }

    /// Run one pending task, returning whether anything ran
    pub fn tick(&self) -> bool {
        self.executor.try_tick()
    }

    /// Drive the executor until no task can make progress
    pub fn settle(&self) {
        while self.executor.try_tick() {}
    }

    /// Block on a future while driving the engine's executor
    pub fn block_on<T>(&self, future: impl Future<Output = T>) -> T {
        smol::block_on(self.executor.run(future))
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
