//! Viewport intersection source
//!
//! Models the host's intersection machinery as an event source that
//! settles a [`ReadySignal`] per observed node. An observation is
//! delivered at most once; delivery detaches the observer. Geometry is
//! optional: hosts may drive `intersect` directly, or register rects
//! and let viewport updates trigger delivery.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use reef_dom::NodeId;

use crate::signal::ReadySignal;

/// Axis-aligned rectangle in viewport coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rect
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check if this rect intersects another
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Intersection observation source
#[derive(Debug)]
pub struct Intersection {
    supported: bool,
    viewport: Cell<Rect>,
    rects: RefCell<HashMap<NodeId, Rect>>,
    observers: RefCell<HashMap<NodeId, ReadySignal>>,
    deliveries: Cell<u64>,
}

impl Intersection {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            viewport: Cell::new(Rect::new(0.0, 0.0, 1280.0, 720.0)),
            rects: RefCell::new(HashMap::new()),
            observers: RefCell::new(HashMap::new()),
            deliveries: Cell::new(0),
        }
    }

    /// Check if the capability is available
    #[inline]
    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Begin observing a node. Resolves on the first intersecting
    /// observation, then detaches. Without capability support the
    /// returned signal is already resolved.
    pub fn observe(&self, node: NodeId) -> ReadySignal {
        if !self.supported {
            return ReadySignal::resolved();
        }
        let signal = self
            .observers
            .borrow_mut()
            .entry(node)
            .or_insert_with(ReadySignal::new)
            .clone();
        // initial observation: already-intersecting nodes resolve now
        if self.rect_intersects(node) {
            self.deliver(node);
        }
        signal
    }

    /// Notify the source that a node intersected the viewport
    pub fn intersect(&self, node: NodeId) {
        self.deliver(node);
    }

    /// Record a node's geometry, delivering an observation if it now
    /// intersects
    pub fn set_rect(&self, node: NodeId, rect: Rect) {
        self.rects.borrow_mut().insert(node, rect);
        if self.is_observed(node) && self.rect_intersects(node) {
            self.deliver(node);
        }
    }

    /// Update the viewport, re-checking every observed node
    pub fn set_viewport(&self, viewport: Rect) {
        self.viewport.set(viewport);
        let observed: Vec<NodeId> = self.observers.borrow().keys().copied().collect();
        for node in observed {
            if self.rect_intersects(node) {
                self.deliver(node);
            }
        }
    }

    /// Check whether a node still has an attached observer
    pub fn is_observed(&self, node: NodeId) -> bool {
        self.observers.borrow().contains_key(&node)
    }

    /// Number of observations delivered so far
    pub fn deliveries(&self) -> u64 {
        self.deliveries.get()
    }

    fn rect_intersects(&self, node: NodeId) -> bool {
        self.rects
            .borrow()
            .get(&node)
            .is_some_and(|r| r.intersects(&self.viewport.get()))
    }

    fn deliver(&self, node: NodeId) {
        if let Some(signal) = self.observers.borrow_mut().remove(&node) {
            tracing::debug!(?node, "intersection delivered");
            self.deliveries.set(self.deliveries.get() + 1);
            signal.resolve();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reef_dom::Document;

    fn node() -> NodeId {
        Document::new().create_element("div")
    }

    #[test]
    fn test_intersect_resolves_and_detaches() {
        let source = Intersection::new(true);
        let n = node();
        let signal = source.observe(n);
        assert!(!signal.is_resolved());

        source.intersect(n);
        assert!(signal.is_resolved());
        assert!(!source.is_observed(n));
        assert_eq!(source.deliveries(), 1);

        // observer detached: nothing further is delivered
        source.intersect(n);
        assert_eq!(source.deliveries(), 1);
    }

    #[test]
    fn test_already_intersecting_resolves_on_observe() {
        let source = Intersection::new(true);
        let n = node();
        source.set_rect(n, Rect::new(10.0, 10.0, 100.0, 100.0));

        let signal = source.observe(n);
        assert!(signal.is_resolved());
        assert_eq!(source.deliveries(), 1);
    }

    #[test]
    fn test_unsupported_resolves_immediately() {
        let source = Intersection::new(false);
        let signal = source.observe(node());
        assert!(signal.is_resolved());
        assert_eq!(source.deliveries(), 0);
    }

    #[test]
    fn test_viewport_scroll_delivers() {
        let source = Intersection::new(true);
        let n = node();
        source.set_rect(n, Rect::new(0.0, 2000.0, 100.0, 100.0));
        let signal = source.observe(n);
        assert!(!signal.is_resolved());

        // scroll down past the element
        source.set_viewport(Rect::new(0.0, 1950.0, 1280.0, 720.0));
        assert!(signal.is_resolved());
    }
}
