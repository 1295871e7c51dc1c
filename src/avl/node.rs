//! Balanced tree node.

use crate::types::{Entry, NodeId};

/// A node of the balanced search tree.
///
/// Child links own their subtree through the arena; `parent` is a plain
/// back-reference id and never owns anything.
#[derive(Debug, Clone)]
pub struct AvlNode {
    pub(crate) entry: Entry,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) parent: Option<NodeId>,
    /// Height of the subtree rooted here; a leaf has height 1
    pub(crate) height: usize,
}

impl AvlNode {
    /// Create a detached leaf below `parent`
    pub fn new(entry: Entry, parent: Option<NodeId>) -> Self {
        Self {
            entry,
            left: None,
            right: None,
            parent,
            height: 1,
        }
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn height(&self) -> usize {
        self.height
    }
}
