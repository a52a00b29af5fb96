//! Document
//!
//! Owns the node arena plus the per-document registries (event
//! listeners, defined tag names) and provides the element-level
//! conveniences the hydration engine works through.

use std::cell::RefCell;
use std::rc::Rc;

use crate::custom_elements::DefinedRegistry;
use crate::events::{EventRegistry, ListenerFn, ListenerId};
use crate::node::{ElementData, NodeData, TextData};
use crate::shadow::{ShadowData, ShadowRootMode};
use crate::tree::Tree;
use crate::NodeId;

/// A host document
#[derive(Debug)]
pub struct Document {
    tree: Tree,
    root: NodeId,
    events: EventRegistry,
    defined: DefinedRegistry,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with a root node
    pub fn new() -> Self {
        let mut tree = Tree::new();
        let root = tree.alloc(NodeData::Document);
        Self {
            tree,
            root,
            events: EventRegistry::new(),
            defined: DefinedRegistry::new(),
        }
    }

    /// Document root node
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    #[inline]
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    #[inline]
    pub fn defined(&self) -> &DefinedRegistry {
        &self.defined
    }

    #[inline]
    pub fn defined_mut(&mut self) -> &mut DefinedRegistry {
        &mut self.defined
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let tag = tag.to_lowercase();
        let is_template = tag == "template";
        let id = self.tree.alloc(NodeData::Element(ElementData::new(tag)));
        if is_template {
            let content = self.tree.alloc(NodeData::Fragment);
            self.element_mut(id).template_content = content;
        }
        id
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.alloc(NodeData::Text(TextData {
            content: content.to_string(),
        }))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.tree.alloc(NodeData::Comment(content.to_string()))
    }

    /// Create a detached content fragment
    pub fn create_fragment(&mut self) -> NodeId {
        self.tree.alloc(NodeData::Fragment)
    }

    /// Tag name of an element node
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.tree.get(id).as_element().map(|e| e.tag.as_str())
    }

    /// Get an attribute value
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.tree.get(id).as_element().and_then(|e| e.attr(name))
    }

    /// Check for an attribute's presence
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.tree
            .get(id)
            .as_element()
            .is_some_and(|e| e.has_attr(name))
    }

    /// Set an attribute on an element; non-elements are ignored
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.tree.get_mut(id).as_element_mut() {
            el.set_attr(name, value);
        }
    }

    /// Remove an attribute, returning whether it was present
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        self.tree
            .get_mut(id)
            .as_element_mut()
            .is_some_and(|el| el.remove_attr(name))
    }

    /// Parked content fragment of a `<template>` element
    pub fn template_content(&self, id: NodeId) -> NodeId {
        self.tree
            .get(id)
            .as_element()
            .map_or(NodeId::NONE, |e| e.template_content)
    }

    /// Attach shadow content to a host element, returning the content
    /// fragment. Re-attaching returns the existing fragment.
    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> NodeId {
        if let Some(shadow) = self.shadow(host) {
            return shadow.content;
        }
        let content = self.tree.alloc(NodeData::Fragment);
        self.element_mut(host).shadow = Some(ShadowData { mode, content });
        content
    }

    /// Shadow content of an element, if attached
    pub fn shadow(&self, id: NodeId) -> Option<ShadowData> {
        self.tree.get(id).as_element().and_then(|e| e.shadow)
    }

    /// Materialize a declarative shadow root from a direct child
    /// `<template shadowrootmode>` (or legacy `shadowroot`), if the
    /// host has no shadow yet. The template content is cloned into the
    /// new shadow fragment; the template itself is left in place.
    pub fn materialize_declarative_shadow(&mut self, host: NodeId) -> Option<ShadowData> {
        if let Some(shadow) = self.shadow(host) {
            return Some(shadow);
        }
        let tmpl = self.tree.children(host).into_iter().find(|&c| {
            self.tree.get(c).as_element().is_some_and(|e| {
                e.is_template() && (e.has_attr("shadowrootmode") || e.has_attr("shadowroot"))
            })
        })?;
        let mode = self
            .attr(tmpl, "shadowrootmode")
            .or_else(|| self.attr(tmpl, "shadowroot"))
            .map(ShadowRootMode::parse)
            .unwrap_or_default();
        let content = self.attach_shadow(host, mode);
        let tmpl_content = self.template_content(tmpl);
        if tmpl_content.is_some() {
            for child in self.tree.children(tmpl_content) {
                let copy = self.clone_subtree(child);
                self.tree.append_child(content, copy);
            }
        }
        self.shadow(host)
    }

    /// Deep-copy a subtree, returning the detached copy's root.
    /// Listener registrations are not copied.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let data = match &self.tree.get(id).data {
            NodeData::Document | NodeData::Fragment => NodeData::Fragment,
            NodeData::Element(el) => {
                let mut copy = ElementData::new(el.tag.clone());
                copy.attrs = el.attrs.clone();
                NodeData::Element(copy)
            }
            NodeData::Text(t) => NodeData::Text(TextData {
                content: t.content.clone(),
            }),
            NodeData::Comment(c) => NodeData::Comment(c.clone()),
        };
        let copy = self.tree.alloc(data);

        let template_content = self
            .tree
            .get(id)
            .as_element()
            .map_or(NodeId::NONE, |e| e.template_content);
        if template_content.is_some() {
            let content_copy = self.clone_subtree(template_content);
            self.element_mut(copy).template_content = content_copy;
        }

        for child in self.tree.children(id) {
            let child_copy = self.clone_subtree(child);
            self.tree.append_child(copy, child_copy);
        }
        copy
    }

    /// Register an event listener on a node
    pub fn add_listener(
        &mut self,
        node: NodeId,
        event: &str,
        once: bool,
        callback: ListenerFn,
    ) -> ListenerId {
        self.events.add(node, event, once, callback)
    }

    /// Remove an event listener
    pub fn remove_listener(&mut self, node: NodeId, id: ListenerId) {
        self.events.remove(node, id);
    }

    /// Number of listeners registered on a node
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.events.count(node)
    }

    /// Dispatch an event on a node, invoking callbacks outside the
    /// document borrow so they may re-enter it. Returns the number of
    /// listeners fired.
    pub fn dispatch_event(doc: &Rc<RefCell<Document>>, node: NodeId, event: &str) -> usize {
        let fired = doc.borrow_mut().events.collect_fired(node, event);
        tracing::debug!(?node, event, listeners = fired.len(), "dispatch");
        for callback in &fired {
            callback();
        }
        fired.len()
    }

    fn element_mut(&mut self, id: NodeId) -> &mut ElementData {
        self.tree
            .get_mut(id)
            .as_element_mut()
            .unwrap_or_else(|| panic!("node {id:?} is not an element"))
    }
}
