//! Document tree (arena-based allocation)
//!
//! The arena only ever grows: detached nodes stay allocated so any
//! [`NodeId`] handed out remains valid for the document's lifetime.
//! That property is load-bearing for placeholder restoration, which
//! holds ids across suspension points and relinks the original nodes.

use crate::node::{Node, NodeData};
use crate::NodeId;

/// Arena-based document tree
#[derive(Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Allocate a new detached node
    pub fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    /// Get a node by id
    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Get a mutable node by id
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Number of allocated nodes (including detached ones)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parent of a node (NONE if detached or root)
    #[inline]
    pub fn parent(&self, id: NodeId) -> NodeId {
        self.get(id).parent
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// The child is detached from its previous position first; its own
    /// subtree moves with it.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);

        let last = self.get(parent).last_child;
        if last.is_some() {
            self.get_mut(last).next_sibling = child;
            self.get_mut(child).prev_sibling = last;
        } else {
            self.get_mut(parent).first_child = child;
        }
        self.get_mut(parent).last_child = child;
        self.get_mut(child).parent = parent;
    }

    /// Insert `new` under `parent` immediately before `reference`.
    ///
    /// A NONE reference appends.
    pub fn insert_before(&mut self, parent: NodeId, new: NodeId, reference: NodeId) {
        if reference.is_none() {
            self.append_child(parent, new);
            return;
        }
        self.detach(new);

        let prev = self.get(reference).prev_sibling;
        if prev.is_some() {
            self.get_mut(prev).next_sibling = new;
        } else {
            self.get_mut(parent).first_child = new;
        }
        {
            let n = self.get_mut(new);
            n.prev_sibling = prev;
            n.next_sibling = reference;
            n.parent = parent;
        }
        self.get_mut(reference).prev_sibling = new;
    }

    /// Unlink a node from its parent and siblings.
    ///
    /// The node keeps its own children; detaching an already-detached
    /// node is a no-op.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let n = self.get(id);
            (n.parent, n.prev_sibling, n.next_sibling)
        };
        if parent.is_none() {
            return;
        }

        if prev.is_some() {
            self.get_mut(prev).next_sibling = next;
        } else {
            self.get_mut(parent).first_child = next;
        }
        if next.is_some() {
            self.get_mut(next).prev_sibling = prev;
        } else {
            self.get_mut(parent).last_child = prev;
        }

        let n = self.get_mut(id);
        n.parent = NodeId::NONE;
        n.prev_sibling = NodeId::NONE;
        n.next_sibling = NodeId::NONE;
    }

    /// Swap a detached `replacement` into the tree position of `old`.
    ///
    /// `old` is detached afterwards and keeps its children.
    pub fn replace_with(&mut self, old: NodeId, replacement: NodeId) {
        let parent = self.get(old).parent;
        if parent.is_none() {
            return;
        }
        let next = self.get(old).next_sibling;
        self.detach(old);
        self.insert_before(parent, replacement, next);
    }

    /// Move every child of `from` onto the end of `to`, in order.
    ///
    /// Nodes are relinked, not copied, so child identity (and any state
    /// hanging off it) is preserved.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        loop {
            let child = self.get(from).first_child;
            if child.is_none() {
                break;
            }
            self.append_child(to, child);
        }
    }

    /// Detach every child of `parent`
    pub fn remove_children(&mut self, parent: NodeId) {
        loop {
            let child = self.get(parent).first_child;
            if child.is_none() {
                break;
            }
            self.detach(child);
        }
    }

    /// Children of a node, in order
    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.get(parent).first_child;
        while cur.is_some() {
            out.push(cur);
            cur = self.get(cur).next_sibling;
        }
        out
    }

    /// Iterator over ancestors, starting from the parent
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(id).parent,
        }
    }

    /// Pre-order iterator over the descendants of `root` (excluding
    /// `root` itself). Does not descend into template or shadow
    /// content fragments.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        let mut stack = Vec::new();
        let mut cur = self.get(root).last_child;
        while cur.is_some() {
            stack.push(cur);
            cur = self.get(cur).prev_sibling;
        }
        Descendants { tree: self, stack }
    }

    /// Check whether `id` is reachable from a document root
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut cur = id;
        loop {
            if self.get(cur).is_document() {
                return true;
            }
            let parent = self.get(cur).parent;
            if parent.is_none() {
                return false;
            }
            cur = parent;
        }
    }

    /// Check whether `ancestor` strictly contains `id`
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }
}

/// Iterator over a node's ancestors, nearest first
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: NodeId,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_none() {
            return None;
        }
        let cur = self.next;
        self.next = self.tree.get(cur).parent;
        Some(cur)
    }
}

/// Pre-order descendant iterator
pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let mut child = self.tree.get(id).last_child;
        while child.is_some() {
            self.stack.push(child);
            child = self.tree.get(child).prev_sibling;
        }
        Some(id)
    }
}
