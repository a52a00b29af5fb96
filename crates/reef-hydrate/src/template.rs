//! Deferred template promotion
//!
//! Markup parked in `<template data-island>` holders stays inert until
//! its island begins activating, then gets spliced into the live tree.
//! The `replace` policy discards the island's other children; `once`
//! deduplicates identical content process-wide.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use reef_dom::{serialize_children, NodeId};

use crate::island::{Hydrator, Island, ATTR_TEMPLATE};

/// Deferred template activation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplatePolicy {
    /// Discard the island's other children and host only this content
    Replace,
    /// Promote identical content at most once per process
    Once,
    /// Splice in place
    #[default]
    Splice,
}

impl TemplatePolicy {
    /// Parse a `data-island` attribute value; unknown values splice
    pub fn parse(value: &str) -> Self {
        match value {
            "replace" => Self::Replace,
            "once" => Self::Once,
            _ => Self::Splice,
        }
    }
}

/// Process-wide record of once-promoted template content, keyed by
/// serialized markup
#[derive(Debug, Default)]
pub struct OnceRegistry {
    seen: RefCell<HashSet<String>>,
}

impl OnceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether content was already promoted
    pub fn already_promoted(&self, markup: &str) -> bool {
        self.seen.borrow().contains(markup)
    }

    /// Record promoted content
    pub fn record(&self, markup: &str) {
        self.seen.borrow_mut().insert(markup.to_string());
    }
}

impl Hydrator {
    /// Splice this island's deferred templates into the live tree.
    ///
    /// Templates nested inside a deeper conditioned island are left
    /// for that island to process.
    pub(crate) fn promote_templates(&self, island: &Rc<Island>) {
        let island_node = island.node();
        let templates: Vec<NodeId> = {
            let doc = self.doc.borrow();
            doc.tree()
                .descendants(island_node)
                .filter(|&n| {
                    doc.tree()
                        .get(n)
                        .as_element()
                        .is_some_and(|el| el.is_template() && el.has_attr(ATTR_TEMPLATE))
                })
                .collect()
        };

        for tmpl in templates {
            if !self
                .conditioned_ancestors(tmpl, Some(island_node))
                .is_empty()
            {
                continue;
            }

            let policy = {
                let doc = self.doc.borrow();
                doc.attr(tmpl, ATTR_TEMPLATE)
                    .map(TemplatePolicy::parse)
                    .unwrap_or_default()
            };

            match policy {
                TemplatePolicy::Replace => {
                    tracing::debug!(?tmpl, "template replacing island content");
                    let mut doc = self.doc.borrow_mut();
                    let content = doc.template_content(tmpl);
                    doc.tree_mut().remove_children(island_node);
                    if content.is_some() {
                        doc.tree_mut().move_children(content, island_node);
                    }
                    break;
                }
                TemplatePolicy::Once => {
                    let markup = {
                        let doc = self.doc.borrow();
                        let content = doc.template_content(tmpl);
                        if content.is_some() {
                            serialize_children(doc.tree(), content)
                        } else {
                            String::new()
                        }
                    };
                    if !markup.is_empty() {
                        if self.once.already_promoted(&markup) {
                            tracing::debug!(?tmpl, "duplicate once-template removed");
                            self.doc.borrow_mut().tree_mut().detach(tmpl);
                            return;
                        }
                        self.once.record(&markup);
                    }
                    self.splice_template(tmpl);
                }
                TemplatePolicy::Splice => self.splice_template(tmpl),
            }
        }
    }

    /// Replace a template node with its parked content children
    fn splice_template(&self, tmpl: NodeId) {
        let mut doc = self.doc.borrow_mut();
        let parent = doc.tree().parent(tmpl);
        if parent.is_none() {
            return;
        }
        let content = doc.template_content(tmpl);
        if content.is_some() {
            for child in doc.tree().children(content) {
                doc.tree_mut().insert_before(parent, child, tmpl);
            }
        }
        doc.tree_mut().detach(tmpl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse() {
        assert_eq!(TemplatePolicy::parse("replace"), TemplatePolicy::Replace);
        assert_eq!(TemplatePolicy::parse("once"), TemplatePolicy::Once);
        assert_eq!(TemplatePolicy::parse(""), TemplatePolicy::Splice);
        assert_eq!(TemplatePolicy::parse("later"), TemplatePolicy::Splice);
    }

    #[test]
    fn test_once_registry() {
        let once = OnceRegistry::new();
        assert!(!once.already_promoted("<p>hi</p>"));
        once.record("<p>hi</p>");
        assert!(once.already_promoted("<p>hi</p>"));
        assert!(!once.already_promoted("<p>other</p>"));
    }
}
