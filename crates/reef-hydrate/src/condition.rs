//! Condition library
//!
//! The fixed vocabulary of readiness conditions an island can declare,
//! each one an async predicate over the host environment. Conditions
//! are *armed* (listeners installed) at creation time; the returned
//! [`Gate`] only waits on signals that already exist, so a batch of
//! gates can be awaited in any order without changing semantics.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use reef_dom::{Document, ListenerId, NodeId};
use reef_host::{Host, ReadySignal};

/// Default interaction triggers
const DEFAULT_INTERACTION_EVENTS: &str = "click,touchstart";

/// A declared condition name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    Visible,
    Idle,
    Load,
    Interaction,
    Media,
    SaveData,
}

impl ConditionKind {
    /// Every condition, in attribute-scan order
    pub const ALL: [ConditionKind; 6] = [
        Self::Visible,
        Self::Idle,
        Self::Load,
        Self::Interaction,
        Self::Media,
        Self::SaveData,
    ];

    /// The unprefixed attribute name
    pub fn name(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Idle => "idle",
            Self::Load => "load",
            Self::Interaction => "interaction",
            Self::Media => "media",
            Self::SaveData => "save-data",
        }
    }

    /// Parse an unprefixed attribute name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// An armed condition: one or more signals that must all settle
#[derive(Debug, Clone)]
pub struct Gate {
    signals: Vec<ReadySignal>,
}

impl Gate {
    /// Gate on a single signal
    pub fn one(signal: ReadySignal) -> Self {
        Self {
            signals: vec![signal],
        }
    }

    /// Gate on several signals settling
    pub fn all(signals: Vec<ReadySignal>) -> Self {
        Self { signals }
    }

    /// A gate that is already open
    pub fn open() -> Self {
        Self {
            signals: Vec::new(),
        }
    }

    /// Check without waiting
    pub fn is_open(&self) -> bool {
        self.signals.iter().all(ReadySignal::is_resolved)
    }

    /// Wait for every signal. All signals exist before the first
    /// await, so settling order does not matter.
    pub async fn wait(&self) {
        for signal in &self.signals {
            signal.wait().await;
        }
    }
}

/// The condition library, holding the process-wide idle cache.
///
/// The load signal and per-media-query signals are already
/// process-wide inside the host; the combined idle+load gate is cached
/// here so every `on:idle` island shares it.
#[derive(Debug, Default)]
pub struct Conditions {
    idle: RefCell<Option<Gate>>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a node declares any condition attribute
    pub fn has_any(doc: &Document, node: NodeId, prefix: &str) -> bool {
        ConditionKind::ALL
            .into_iter()
            .any(|kind| doc.has_attr(node, &format!("{prefix}{}", kind.name())))
    }

    /// Collect a node's declared conditions with their raw arguments,
    /// in vocabulary order
    pub fn declared(doc: &Document, node: NodeId, prefix: &str) -> Vec<(ConditionKind, String)> {
        let mut out = Vec::new();
        for kind in ConditionKind::ALL {
            let attr = format!("{prefix}{}", kind.name());
            if doc.has_attr(node, &attr) {
                let arg = doc.attr(node, &attr).unwrap_or_default().to_string();
                out.push((kind, arg));
            }
        }
        out
    }

    /// Arm a condition for a node, returning its gate
    pub fn arm(
        &self,
        doc: &Rc<RefCell<Document>>,
        host: &Host,
        node: NodeId,
        kind: ConditionKind,
        arg: &str,
    ) -> Gate {
        match kind {
            ConditionKind::Visible => Gate::one(host.intersection().observe(node)),
            ConditionKind::Load => Gate::one(host.lifecycle().load_signal()),
            ConditionKind::Idle => self.idle(host),
            ConditionKind::Interaction => Self::interaction(doc, node, arg),
            ConditionKind::Media => Gate::one(host.media().watch(arg)),
            ConditionKind::SaveData => Self::save_data(host, arg),
        }
    }

    /// Idle gate: both the idle callback and the load event, cached
    /// process-wide so every caller shares one gate
    fn idle(&self, host: &Host) -> Gate {
        if let Some(gate) = self.idle.borrow().as_ref() {
            return gate.clone();
        }
        let gate = Gate::all(vec![
            host.lifecycle().load_signal(),
            host.lifecycle().idle_signal(),
        ]);
        *self.idle.borrow_mut() = Some(gate.clone());
        gate
    }

    /// Interaction gate: resolves on the first of the listed events,
    /// then removes the remaining listeners
    fn interaction(doc: &Rc<RefCell<Document>>, node: NodeId, arg: &str) -> Gate {
        let overrides = if arg.is_empty() {
            DEFAULT_INTERACTION_EVENTS
        } else {
            arg
        };
        let events: Vec<String> = overrides
            .split(',')
            .map(|entry| entry.trim().to_string())
            .filter(|entry| !entry.is_empty())
            .collect();

        let signal = ReadySignal::new();
        let ids: Rc<RefCell<Vec<ListenerId>>> = Rc::new(RefCell::new(Vec::new()));
        let weak: Weak<RefCell<Document>> = Rc::downgrade(doc);

        let mut document = doc.borrow_mut();
        for event in &events {
            let signal = signal.clone();
            let ids_for_closure = Rc::clone(&ids);
            let weak = weak.clone();
            let id = document.add_listener(
                node,
                event,
                true,
                Rc::new(move || {
                    signal.resolve();
                    // cleanup the other event handlers
                    if let Some(doc) = weak.upgrade() {
                        let mut doc = doc.borrow_mut();
                        for id in ids_for_closure.borrow().iter() {
                            doc.remove_listener(node, *id);
                        }
                    }
                }),
            );
            ids.borrow_mut().push(id);
        }
        Gate::one(signal)
    }

    /// Save-data gate: settles immediately when the reported
    /// preference equals the expected one or the capability is absent;
    /// otherwise never resolves. There is no change event to react to,
    /// so the mismatch is a permanent block rather than a poll.
    fn save_data(host: &Host, arg: &str) -> Gate {
        let expects = arg != "false";
        match host.connection() {
            None => Gate::open(),
            Some(connection) if connection.save_data == expects => Gate::open(),
            Some(_) => Gate::one(ReadySignal::new()),
        }
    }
}
