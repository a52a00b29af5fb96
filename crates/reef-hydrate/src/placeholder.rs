//! Placeholder masking and restoration
//!
//! Elements inside a conditioned island that would initialize
//! themselves (not-yet-defined custom elements) are swapped for an
//! inert stand-in under a prefixed tag name. Children and shadow
//! content are *moved* onto the stand-in so their state survives; once
//! every qualifying enclosing island is ready, the same nodes move
//! back and the original element is swapped into place.

use std::rc::Rc;

use reef_dom::{DefinedRegistry, Document, NodeId};

use crate::island::{Hydrator, Island, ATTR_DEFER};
use crate::HydrateOptions;

/// Decides whether a node should be masked
pub type FallbackMatcher = Rc<dyn Fn(&Document, &HydrateOptions, NodeId) -> bool>;

/// Masks a node and returns the closure that restores it
pub type FallbackHandler = Rc<dyn Fn(&mut Document, NodeId, &str) -> RestoreFn>;

/// Deferred restoration of a masked node
pub type RestoreFn = Box<dyn FnOnce(&mut Document)>;

/// One selector/handler pair in the fallback table
#[derive(Clone)]
pub struct FallbackEntry {
    /// Table key; a later registration with the same key wins
    pub key: String,
    pub matches: FallbackMatcher,
    pub handler: FallbackHandler,
}

impl std::fmt::Debug for FallbackEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackEntry")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// The built-in fallback: mask custom elements that are not yet
/// defined, are not islands themselves, and are not already deferred
/// through `defer-hydration`.
pub fn default_fallback() -> FallbackEntry {
    FallbackEntry {
        key: "undefined-elements".to_string(),
        matches: Rc::new(|doc, options, node| {
            let Some(tag) = doc.tag_name(node) else {
                return false;
            };
            DefinedRegistry::is_custom_name(tag)
                && tag != options.tag_name
                && !doc.defined().is_defined(tag)
                && !doc.has_attr(node, ATTR_DEFER)
        }),
        handler: Rc::new(rename_node),
    }
}

/// Mask a node by renaming it: a stand-in under `prefix + tag` takes
/// over its attributes, children, and shadow content. Returns the
/// restoration closure.
pub fn rename_node(doc: &mut Document, node: NodeId, prefix: &str) -> RestoreFn {
    let tag = doc
        .tag_name(node)
        .map(str::to_string)
        .unwrap_or_default();
    let standin = doc.create_element(&format!("{prefix}{tag}"));

    let attrs = doc
        .tree()
        .get(node)
        .as_element()
        .map(|el| el.attrs.clone())
        .unwrap_or_default();
    for attr in attrs {
        doc.set_attr(standin, &attr.name, &attr.value);
    }

    // Declarative shadow templates materialize before the move so the
    // stand-in carries the shadow content too
    doc.materialize_declarative_shadow(node);
    if let Some(shadow) = doc.shadow(node) {
        let standin_content = doc.attach_shadow(standin, shadow.mode);
        doc.tree_mut().move_children(shadow.content, standin_content);
    }

    // Same child nodes, not copies, to preserve their state
    doc.tree_mut().move_children(node, standin);
    doc.tree_mut().replace_with(node, standin);
    tracing::debug!(?node, ?standin, %tag, "masked");

    Box::new(move |doc: &mut Document| {
        if let (Some(standin_shadow), Some(original_shadow)) =
            (doc.shadow(standin), doc.shadow(node))
        {
            doc.tree_mut()
                .move_children(standin_shadow.content, original_shadow.content);
        }
        doc.tree_mut().move_children(standin, node);
        doc.tree_mut().replace_with(standin, node);
        tracing::debug!(?node, "restored");
    })
}

impl Hydrator {
    /// Mask every fallback match inside an island and schedule each
    /// restoration against the readiness of the islands enclosing it.
    ///
    /// Matches process deepest-first so descendant placeholders are in
    /// place before an ancestor's; restorations are scheduled
    /// shallowest-first. Each selector runs at most once per island,
    /// and a node is only masked by its closest conditioned island.
    pub(crate) fn mask_fallback_content(&self, island: &Rc<Island>) {
        let prefix = self.options.rename_prefix();
        let entries: Vec<FallbackEntry> = self.fallbacks.borrow().clone();

        for entry in entries {
            if !island.mark_selector(&entry.key) {
                continue;
            }

            let matches: Vec<NodeId> = {
                let doc = self.doc.borrow();
                doc.tree()
                    .descendants(island.node())
                    .filter(|&n| (entry.matches)(&doc, &self.options, n))
                    .collect()
            };

            let mut scheduled = Vec::new();
            for node in matches.into_iter().rev() {
                if !self.doc.borrow().tree().is_connected(node) {
                    continue;
                }
                let parents = self.conditioned_ancestors(node, None);
                if parents.first().map(|p| p.node()) != Some(island.node()) {
                    continue;
                }
                let restore = {
                    let mut doc = self.doc.borrow_mut();
                    (entry.handler)(&mut doc, node, &prefix)
                };
                scheduled.push((node, parents, restore));
            }

            for (node, parents, restore) in scheduled.into_iter().rev() {
                let doc = Rc::clone(&self.doc);
                self.executor
                    .spawn(async move {
                        for parent in &parents {
                            parent.wait().await;
                        }
                        tracing::debug!(?node, "placeholder restoration firing");
                        restore(&mut doc.borrow_mut());
                    })
                    .detach();
            }
        }
    }
}
