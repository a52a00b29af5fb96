//! Island activation state machine
//!
//! An [`Island`] is the unit of hydration: one element whose subtree
//! stays inert until the island's declared conditions and its nearest
//! conditioned ancestor island have settled. The [`Hydrator`] owns the
//! island records and drives each island through
//! `Attached → MaybeMasked → Waiting → PromotingTemplates →
//! RunningStrategy → Ready`.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::rc::{Rc, Weak};

use smol::LocalExecutor;

use reef_dom::{Document, NodeId};
use reef_host::{Host, ReadySignal};

use crate::condition::{Conditions, Gate};
use crate::error::HydrateError;
use crate::placeholder::{default_fallback, FallbackEntry, FallbackHandler, FallbackMatcher};
use crate::strategy::StrategyRegistry;
use crate::template::OnceRegistry;

/// Marker attribute set when an island reaches `Ready`
pub const ATTR_READY: &str = "ready";
/// Attribute suppressing a descendant's own initialization
pub const ATTR_DEFER: &str = "defer-hydration";
/// Strategy type attribute
pub const ATTR_TYPE: &str = "type";
/// Module import attribute
pub const ATTR_IMPORT: &str = "import";
/// Deferred-template policy attribute
pub const ATTR_TEMPLATE: &str = "data-island";

/// Activation states, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IslandState {
    Attached,
    Masked,
    Waiting,
    PromotingTemplates,
    RunningStrategy,
    Ready,
}

/// Hydrator options
#[derive(Debug, Clone)]
pub struct HydrateOptions {
    /// Island element tag name
    pub tag_name: String,
    /// Condition attribute prefix
    pub attribute_prefix: String,
}

impl Default for HydrateOptions {
    fn default() -> Self {
        Self {
            tag_name: "is-land".to_string(),
            attribute_prefix: "on:".to_string(),
        }
    }
}

impl HydrateOptions {
    /// Tag-name prefix used for placeholder stand-ins
    pub fn rename_prefix(&self) -> String {
        format!("{}--", self.tag_name)
    }
}

/// One island's live state
pub struct Island {
    node: NodeId,
    state: Cell<IslandState>,
    ready: ReadySignal,
    conditions_evaluated: Cell<bool>,
    hydration_started: Cell<bool>,
    masked_selectors: RefCell<HashSet<String>>,
}

impl Island {
    fn new(node: NodeId) -> Self {
        Self {
            node,
            state: Cell::new(IslandState::Attached),
            ready: ReadySignal::new(),
            conditions_evaluated: Cell::new(false),
            hydration_started: Cell::new(false),
            masked_selectors: RefCell::new(HashSet::new()),
        }
    }

    /// The element this island controls
    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Current activation state
    #[inline]
    pub fn state(&self) -> IslandState {
        self.state.get()
    }

    /// Whether the island has reached the terminal state
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready.is_resolved()
    }

    /// Whether this island's conditions have been evaluated yet
    #[inline]
    pub fn conditions_evaluated(&self) -> bool {
        self.conditions_evaluated.get()
    }

    /// Handle to the readiness signal
    pub fn ready_signal(&self) -> ReadySignal {
        self.ready.clone()
    }

    /// Wait until the island is ready
    pub async fn wait(&self) {
        self.ready.wait().await;
    }

    pub(crate) fn set_state(&self, state: IslandState) {
        tracing::debug!(node = ?self.node, ?state, "island transition");
        self.state.set(state);
    }

    /// Record a masked selector key; returns false when the selector
    /// already ran for this island
    pub(crate) fn mark_selector(&self, key: &str) -> bool {
        self.masked_selectors.borrow_mut().insert(key.to_string())
    }
}

impl std::fmt::Debug for Island {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Island")
            .field("node", &self.node)
            .field("state", &self.state.get())
            .field("ready", &self.ready.is_resolved())
            .finish()
    }
}

/// Owns island records and drives their activation
pub struct Hydrator {
    pub(crate) doc: Rc<RefCell<Document>>,
    pub(crate) host: Rc<Host>,
    pub(crate) options: HydrateOptions,
    pub(crate) executor: Rc<LocalExecutor<'static>>,
    pub(crate) islands: RefCell<HashMap<NodeId, Rc<Island>>>,
    pub(crate) conditions: Conditions,
    pub(crate) strategies: StrategyRegistry,
    pub(crate) fallbacks: RefCell<Vec<FallbackEntry>>,
    pub(crate) once: OnceRegistry,
    weak_self: Weak<Hydrator>,
}

impl Hydrator {
    pub fn new(
        doc: Rc<RefCell<Document>>,
        host: Rc<Host>,
        options: HydrateOptions,
        executor: Rc<LocalExecutor<'static>>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|weak| Self {
            doc,
            host,
            options,
            executor,
            islands: RefCell::new(HashMap::new()),
            conditions: Conditions::new(),
            strategies: StrategyRegistry::new(),
            fallbacks: RefCell::new(vec![default_fallback()]),
            once: OnceRegistry::new(),
            weak_self: weak.clone(),
        })
    }

    #[inline]
    pub fn options(&self) -> &HydrateOptions {
        &self.options
    }

    #[inline]
    pub fn document(&self) -> &Rc<RefCell<Document>> {
        &self.doc
    }

    #[inline]
    pub fn host(&self) -> &Rc<Host> {
        &self.host
    }

    /// Register an init strategy by name; last registration wins
    pub fn add_init_type(&self, name: &str, init: crate::strategy::InitFn) {
        self.strategies.add(name, init);
    }

    /// Merge a placeholder selector/handler pair into the fallback
    /// table; an entry with the same key replaces the previous one.
    /// Islands attached afterwards pick it up.
    pub fn add_fallback(&self, key: &str, matches: FallbackMatcher, handler: FallbackHandler) {
        let mut table = self.fallbacks.borrow_mut();
        table.retain(|entry| entry.key != key);
        table.push(FallbackEntry {
            key: key.to_string(),
            matches,
            handler,
        });
    }

    /// Get or create the island record for an element without starting
    /// hydration
    pub fn island_for(&self, node: NodeId) -> Rc<Island> {
        Rc::clone(
            self.islands
                .borrow_mut()
                .entry(node)
                .or_insert_with(|| Rc::new(Island::new(node))),
        )
    }

    /// Attach an island element: create its record and spawn hydration
    /// on the executor. Attaching twice is a no-op. Hydration errors
    /// surface on the host's error channel (logged), matching
    /// unhandled-rejection semantics.
    pub fn attach(&self, node: NodeId) -> Rc<Island> {
        let island = self.island_for(node);
        if !island.hydration_started.replace(true) {
            let Some(this) = self.weak_self.upgrade() else {
                return island;
            };
            let spawned = Rc::clone(&island);
            self.executor
                .spawn(async move {
                    if let Err(err) = this.hydrate(&spawned).await {
                        tracing::error!(node = ?spawned.node(), %err, "island hydration failed");
                    }
                })
                .detach();
        }
        island
    }

    /// Drive one island through the full activation sequence
    pub async fn hydrate(&self, island: &Rc<Island>) -> Result<(), HydrateError> {
        let node = island.node();
        let prefix = self.options.attribute_prefix.clone();

        let has_conditions = {
            let doc = self.doc.borrow();
            Conditions::has_any(&doc, node, &prefix)
        };
        // Only mask when loading conditions are in play; an
        // unconditioned island activates immediately anyway
        if has_conditions {
            island.set_state(IslandState::Masked);
            self.mask_fallback_content(island);
        }

        island.set_state(IslandState::Waiting);
        let mut gates: Vec<Gate> = Vec::new();
        let ancestors = self.conditioned_ancestors(node, None);
        if let Some(nearest) = ancestors.first() {
            gates.push(Gate::one(nearest.ready_signal()));
        }
        let declared = {
            let doc = self.doc.borrow();
            Conditions::declared(&doc, node, &prefix)
        };
        for (kind, arg) in declared {
            gates.push(self.conditions.arm(&self.doc, &self.host, node, kind, &arg));
        }
        island.conditions_evaluated.set(true);
        // every gate is armed at this point; settle order is irrelevant
        for gate in &gates {
            gate.wait().await;
        }

        island.set_state(IslandState::PromotingTemplates);
        self.promote_templates(island);

        island.set_state(IslandState::RunningStrategy);
        self.run_strategy(island).await?;

        {
            let mut doc = self.doc.borrow_mut();
            doc.set_attr(node, ATTR_READY, "");
            let deferred: Vec<NodeId> = doc
                .tree()
                .descendants(node)
                .filter(|&n| doc.has_attr(n, ATTR_DEFER))
                .collect();
            for n in deferred {
                doc.remove_attr(n, ATTR_DEFER);
            }
        }
        island.set_state(IslandState::Ready);
        island.ready_signal().resolve();
        tracing::info!(?node, "island ready");
        Ok(())
    }

    /// Ancestor islands of `node` that declare at least one condition,
    /// nearest first. The walk stops at the document root, or at
    /// `stop_at` when given (exclusive).
    pub(crate) fn conditioned_ancestors(
        &self,
        node: NodeId,
        stop_at: Option<NodeId>,
    ) -> Vec<Rc<Island>> {
        let ids: Vec<NodeId> = {
            let doc = self.doc.borrow();
            let mut out = Vec::new();
            for ancestor in doc.tree().ancestors(node) {
                if Some(ancestor) == stop_at || doc.tree().get(ancestor).is_document() {
                    break;
                }
                if doc.tag_name(ancestor) == Some(self.options.tag_name.as_str())
                    && Conditions::has_any(&doc, ancestor, &self.options.attribute_prefix)
                {
                    out.push(ancestor);
                }
            }
            out
        };
        ids.into_iter().map(|id| self.island_for(id)).collect()
    }

    /// Resolve once every qualifying ancestor island of `node` is
    /// ready. A node outside any conditioned island resolves
    /// immediately.
    pub fn ready_when(&self, node: NodeId) -> impl Future<Output = ()> + 'static {
        let ancestors = self.conditioned_ancestors(node, None);
        async move {
            for island in &ancestors {
                island.wait().await;
            }
        }
    }
}

impl std::fmt::Debug for Hydrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hydrator")
            .field("options", &self.options)
            .field("islands", &self.islands.borrow().len())
            .finish_non_exhaustive()
    }
}
