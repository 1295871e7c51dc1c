//! Multiway node shared by the B-tree, B+-tree and B*-tree.

use crate::types::{Entry, Key, NodeId};

/// A node of a multiway tree.
///
/// Internal nodes hold full entries (not bare separators), so a lookup can
/// resolve at any level. When internal, `children.len() == entries.len() + 1`.
/// `next` threads leaves into an ascending chain for the variants that keep
/// one; it is always `None` on internal nodes.
#[derive(Debug, Clone)]
pub struct MultiwayNode {
    /// Entries in ascending key order
    pub(crate) entries: Vec<Entry>,
    /// Child links, empty on leaves
    pub(crate) children: Vec<NodeId>,
    pub(crate) is_leaf: bool,
    /// Next leaf in key order
    pub(crate) next: Option<NodeId>,
}

impl MultiwayNode {
    /// Create an empty leaf
    pub fn leaf() -> Self {
        Self {
            entries: Vec::new(),
            children: Vec::new(),
            is_leaf: true,
            next: None,
        }
    }

    /// Create an internal node from its parts
    pub fn internal(entries: Vec<Entry>, children: Vec<NodeId>) -> Self {
        Self {
            entries,
            children,
            is_leaf: false,
            next: None,
        }
    }

    /// Entries stored in this node
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Child ids, empty on leaves
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// Next leaf in the chain, if this tree keeps one
    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the first entry whose key is `>= key`
    pub fn lower_bound(&self, key: Key) -> usize {
        self.entries.partition_point(|e| e.key() < key)
    }

    /// Index of the first entry whose key is `> key`; new duplicates land here
    pub fn upper_bound(&self, key: Key) -> usize {
        self.entries.partition_point(|e| e.key() <= key)
    }

    /// Position of an entry with exactly `key`, if this node holds one
    pub fn find(&self, key: Key) -> Option<usize> {
        let idx = self.lower_bound(key);
        match self.entries.get(idx) {
            Some(entry) if entry.key() == key => Some(idx),
            _ => None,
        }
    }
}
