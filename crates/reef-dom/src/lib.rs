//! Reef DOM - Host document tree
//!
//! Arena-based document tree the hydration engine runs against.
//! Nodes are addressed by [`NodeId`] and are never deallocated for the
//! lifetime of a document, so ids held across suspension points stay
//! valid. Mutation operations relink nodes instead of copying them,
//! which is what lets the placeholder protocol preserve child state
//! across a mask/restore cycle.

mod custom_elements;
mod document;
mod events;
mod markup;
mod node;
mod shadow;
mod tree;

pub use custom_elements::{DefineError, DefinedRegistry};
pub use document::Document;
pub use events::{EventRegistry, Listener, ListenerFn, ListenerId};
pub use markup::{serialize, serialize_children};
pub use node::{Attribute, ElementData, Node, NodeData, TextData};
pub use shadow::{ShadowData, ShadowRootMode};
pub use tree::{Ancestors, Descendants, Tree};

/// Node identifier (index into the document arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Sentinel for "no node" (unset parent/sibling links)
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this is the sentinel id
    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Check if this id refers to a node
    #[inline]
    pub fn is_some(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}
