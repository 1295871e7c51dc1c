//! Multiway tree cursors for iteration.
//!
//! [`InOrder`] visits every entry in ascending key order, internal entries
//! included. It maintains a stack of `(node_id, entry_index)` pairs
//! representing the current position in the tree.
//!
//! [`LeafCursor`] only follows the leaf chain, so it never touches internal
//! nodes after locating the leftmost leaf.

use super::node::MultiwayNode;
use crate::arena::NodeArena;
use crate::types::{Entry, NodeId};

/// In-order iterator over a multiway tree
pub struct InOrder<'a> {
    nodes: &'a NodeArena<MultiwayNode>,
    /// Path to the current position. For an internal frame `(id, i)` on top
    /// of the stack, child `i` has already been visited.
    stack: Vec<(NodeId, usize)>,
}

impl<'a> InOrder<'a> {
    pub(crate) fn new(nodes: &'a NodeArena<MultiwayNode>, root: NodeId) -> Self {
        let mut cursor = Self {
            nodes,
            stack: Vec::new(),
        };
        cursor.descend_to_leftmost(root);
        cursor
    }

    /// Push the path from `id` down to its leftmost leaf
    fn descend_to_leftmost(&mut self, id: NodeId) {
        let mut current = id;
        loop {
            self.stack.push((current, 0));
            let node = &self.nodes[current];
            if node.is_leaf {
                return;
            }
            current = node.children[0];
        }
    }
}

impl<'a> Iterator for InOrder<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        loop {
            let (id, pos) = *self.stack.last()?;
            let node = &nodes[id];

            if pos >= node.len() {
                self.stack.pop();
                continue;
            }

            if let Some(top) = self.stack.last_mut() {
                top.1 += 1;
            }
            if !node.is_leaf {
                self.descend_to_leftmost(node.children[pos + 1]);
            }
            return Some(&node.entries[pos]);
        }
    }
}

/// Cursor walking the `next` chain of a leaf-chained tree
pub struct LeafCursor<'a> {
    nodes: &'a NodeArena<MultiwayNode>,
    /// Current leaf, `None` once the chain is exhausted
    leaf: Option<NodeId>,
    /// Next entry index within the current leaf
    pos: usize,
}

impl<'a> LeafCursor<'a> {
    pub(crate) fn new(nodes: &'a NodeArena<MultiwayNode>, first_leaf: NodeId) -> Self {
        Self {
            nodes,
            leaf: Some(first_leaf),
            pos: 0,
        }
    }
}

impl<'a> Iterator for LeafCursor<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        loop {
            let node = &nodes[self.leaf?];
            if let Some(entry) = node.entries.get(self.pos) {
                self.pos += 1;
                return Some(entry);
            }
            // Move to next leaf page
            self.leaf = node.next;
            self.pos = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::btree::{BPlusIndex, BTreeIndex};
    use crate::error::Result;
    use crate::types::{Entry, Key};

    #[test]
    fn test_in_order_visits_internal_entries() -> Result<()> {
        let mut tree = BTreeIndex::new(2)?;
        for k in [50, 10, 40, 20, 30, 60, 70, 5] {
            tree.insert(k, k.to_string());
        }
        assert!(tree.height() > 1);

        let keys: Vec<Key> = tree.iter().map(Entry::key).collect();
        assert_eq!(keys, vec![5, 10, 20, 30, 40, 50, 60, 70]);
        Ok(())
    }

    #[test]
    fn test_in_order_empty() -> Result<()> {
        let tree = BTreeIndex::new(3)?;
        assert_eq!(tree.iter().count(), 0);
        Ok(())
    }

    #[test]
    fn test_leaf_cursor_skips_internal_entries() -> Result<()> {
        let mut tree = BPlusIndex::new(2)?;
        for k in 1..=10 {
            tree.insert(k, k.to_string());
        }

        let leaf_keys: Vec<Key> = tree.leaf_entries().map(Entry::key).collect();
        let root = tree.node(tree.root()).unwrap();
        assert!(!root.is_leaf());
        for separator in root.entries() {
            assert!(!leaf_keys.contains(&separator.key()));
        }
        assert!(leaf_keys.windows(2).all(|w| w[0] < w[1]));

        let mut cursor = tree.leaf_entries();
        while cursor.next().is_some() {}
        assert_eq!(cursor.next(), None);
        Ok(())
    }
}
