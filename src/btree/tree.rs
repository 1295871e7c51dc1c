//! Multiway tree core implementation.
//!
//! This module provides the [`MultiwayTree`] struct with operations for:
//! - search: Point lookups, resolving at internal nodes when possible
//! - insert: Top-down insertion that splits full nodes before entering them
//! - delete: Top-down removal that refills thin children before entering them
//!
//! All nodes live in a [`NodeArena`]; traversal is an explicit loop over
//! node ids, so no operation recurses more than one level deep.

use super::cursor::{InOrder, LeafCursor};
use super::node::MultiwayNode;
use super::policy::{FillPolicy, LeafChain};
use crate::arena::NodeArena;
use crate::engine::TreeNode;
use crate::error::{IndexError, Result};
use crate::types::{Entry, Key, NodeId, TreeConfig};
use std::marker::PhantomData;

/// What a removal descent is looking for
#[derive(Debug, Clone, Copy)]
enum Target {
    /// First entry with this key
    Key(Key),
    /// Rightmost entry of the subtree (in-order predecessor of its parent entry)
    Max,
    /// Leftmost entry of the subtree (in-order successor of its parent entry)
    Min,
}

/// An in-memory multiway search tree of minimum degree `d`.
///
/// Every node holds at most `2d-1` entries; non-root nodes hold at least
/// `P::min_fill(d)` entries and all leaves sit at the same depth.
#[derive(Debug)]
pub struct MultiwayTree<P: FillPolicy> {
    /// Node storage
    nodes: NodeArena<MultiwayNode>,
    /// Root node; an empty leaf when the tree is empty
    root: NodeId,
    config: TreeConfig,
    /// Number of stored entries
    len: usize,
    /// Number of levels, 1 for a lone leaf root
    height: usize,
    _policy: PhantomData<P>,
}

impl<P: FillPolicy> Default for MultiwayTree<P> {
    fn default() -> Self {
        Self::from_valid_config(TreeConfig::default())
    }
}

impl<P: FillPolicy> MultiwayTree<P> {
    /// Create an empty tree with minimum degree `min_degree`
    pub fn new(min_degree: usize) -> Result<Self> {
        Ok(Self::from_valid_config(TreeConfig::new(min_degree)?))
    }

    /// Create an empty tree from a configuration
    pub fn with_config(config: TreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: TreeConfig) -> Self {
        let mut nodes = NodeArena::new();
        let root = nodes.alloc(MultiwayNode::leaf());
        Self {
            nodes,
            root,
            config,
            len: 0,
            height: 1,
            _policy: PhantomData,
        }
    }

    /// Minimum degree `d`
    pub fn min_degree(&self) -> usize {
        self.config.min_degree
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree holds no entries
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Root node id
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Borrow a node by id
    pub fn node(&self, id: NodeId) -> Option<&MultiwayNode> {
        self.nodes.get(id)
    }

    /// Remove every entry, leaving a single empty leaf
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.alloc(MultiwayNode::leaf());
        self.len = 0;
        self.height = 1;
    }

    /// Look up the first entry with `key`
    pub fn search(&self, key: Key) -> Option<&Entry> {
        let mut node = &self.nodes[self.root];
        loop {
            if let Some(idx) = node.find(key) {
                return Some(&node.entries[idx]);
            }
            if node.is_leaf {
                return None;
            }
            node = &self.nodes[node.children[node.lower_bound(key)]];
        }
    }

    /// Insert an entry. Duplicate keys are kept, after existing equal keys.
    pub fn insert(&mut self, key: Key, payload: impl Into<String>) {
        let entry = Entry::new(key, payload);
        let max = self.config.max_keys();

        if self.nodes[self.root].len() == max {
            // Hang the old root under a fresh one and split it
            let old_root = self.root;
            self.root = self
                .nodes
                .alloc(MultiwayNode::internal(Vec::new(), vec![old_root]));
            self.height += 1;
            self.split_child(self.root, 0);
            tracing::debug!(variant = P::NAME, height = self.height, "root split");
        }

        let mut current = self.root;
        loop {
            let node = &self.nodes[current];
            let mut idx = node.upper_bound(key);
            if node.is_leaf {
                self.nodes[current].entries.insert(idx, entry);
                break;
            }

            let child = node.children[idx];
            if self.nodes[child].len() == max {
                self.split_child(current, idx);
                if key >= self.nodes[current].entries[idx].key() {
                    idx += 1;
                }
            }
            current = self.nodes[current].children[idx];
        }

        self.len += 1;
    }

    /// Delete the first entry with `key`, returning it if present
    pub fn delete(&mut self, key: Key) -> Option<Entry> {
        let removed = self.remove_from(self.root, Target::Key(key));
        self.collapse_root();
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// In-order iterator over every entry
    pub fn iter(&self) -> InOrder<'_> {
        InOrder::new(&self.nodes, self.root)
    }

    /// Split the full child at `idx` of `parent`, promoting its median entry
    fn split_child(&mut self, parent: NodeId, idx: usize) {
        let d = self.config.min_degree;
        let child_id = self.nodes[parent].children[idx];

        let child = &mut self.nodes[child_id];
        let right_entries = child.entries.split_off(d);
        let Some(median) = child.entries.pop() else {
            panic!("split of under-full node {child_id}");
        };
        let right_children = if child.is_leaf {
            Vec::new()
        } else {
            child.children.split_off(d)
        };
        let is_leaf = child.is_leaf;
        let chained = P::LEAF_CHAIN && is_leaf;
        let next = if chained { child.next } else { None };

        let right_id = self.nodes.alloc(MultiwayNode {
            entries: right_entries,
            children: right_children,
            is_leaf,
            next,
        });
        if chained {
            self.nodes[child_id].next = Some(right_id);
        }

        let parent_node = &mut self.nodes[parent];
        parent_node.entries.insert(idx, median);
        parent_node.children.insert(idx + 1, right_id);

        tracing::trace!(variant = P::NAME, %child_id, %right_id, "split node");
    }

    /// Remove `target` from the subtree rooted at `start`.
    ///
    /// Every node entered below `start` holds at least `d` entries (or was
    /// just refilled), so removing one entry never underflows it.
    fn remove_from(&mut self, start: NodeId, target: Target) -> Option<Entry> {
        let d = self.config.min_degree;
        let mut current = start;

        loop {
            let node = &self.nodes[current];
            let (idx, hit) = match target {
                Target::Key(key) => {
                    let idx = node.lower_bound(key);
                    let hit = node.entries.get(idx).map_or(false, |e| e.key() == key);
                    (idx, hit)
                }
                Target::Max if node.is_leaf => (node.len().checked_sub(1)?, true),
                Target::Max => (node.children.len() - 1, false),
                Target::Min => (0, node.is_leaf && !node.is_empty()),
            };

            if node.is_leaf {
                if hit {
                    return Some(self.nodes[current].entries.remove(idx));
                }
                return None;
            }

            let left = node.children[idx];
            if hit {
                let right = node.children[idx + 1];
                if self.nodes[left].len() >= d {
                    let pred = self.remove_from(left, Target::Max)?;
                    return Some(std::mem::replace(
                        &mut self.nodes[current].entries[idx],
                        pred,
                    ));
                }
                if self.nodes[right].len() >= d {
                    let succ = self.remove_from(right, Target::Min)?;
                    return Some(std::mem::replace(
                        &mut self.nodes[current].entries[idx],
                        succ,
                    ));
                }
                // Both neighbours are thin: pull the entry down into a merged child
                self.merge_children(current, idx);
                current = left;
                continue;
            }

            let idx = if self.nodes[left].len() < d {
                self.fill_child(current, idx)
            } else {
                idx
            };
            current = self.nodes[current].children[idx];
        }
    }

    /// Bring the child at `idx` of `parent` up to at least `d` entries by
    /// borrowing from a sibling or merging with one.
    ///
    /// Returns the index of the child that now covers the original range.
    fn fill_child(&mut self, parent: NodeId, idx: usize) -> usize {
        let d = self.config.min_degree;
        let (left_lends, right_lends, last) = {
            let children = &self.nodes[parent].children;
            let last = children.len() - 1;
            let lends = |id: NodeId| P::can_lend(self.nodes[id].len(), d);
            (
                idx > 0 && lends(children[idx - 1]),
                idx < last && lends(children[idx + 1]),
                last,
            )
        };

        if left_lends {
            self.borrow_from_prev(parent, idx);
            idx
        } else if right_lends {
            self.borrow_from_next(parent, idx);
            idx
        } else if idx < last {
            self.merge_children(parent, idx);
            idx
        } else {
            self.merge_children(parent, idx - 1);
            idx - 1
        }
    }

    /// Rotate the last entry of the left sibling through the parent
    fn borrow_from_prev(&mut self, parent: NodeId, idx: usize) {
        let (sibling_id, child_id) = {
            let children = &self.nodes[parent].children;
            (children[idx - 1], children[idx])
        };

        let sibling = &mut self.nodes[sibling_id];
        let Some(lent) = sibling.entries.pop() else {
            panic!("borrow from empty sibling {sibling_id}");
        };
        let lent_child = if sibling.is_leaf {
            None
        } else {
            sibling.children.pop()
        };

        let separator = std::mem::replace(&mut self.nodes[parent].entries[idx - 1], lent);
        let child = &mut self.nodes[child_id];
        child.entries.insert(0, separator);
        if let Some(grandchild) = lent_child {
            child.children.insert(0, grandchild);
        }

        tracing::trace!(variant = P::NAME, from = %sibling_id, to = %child_id, "borrow from left sibling");
    }

    /// Rotate the first entry of the right sibling through the parent
    fn borrow_from_next(&mut self, parent: NodeId, idx: usize) {
        let (child_id, sibling_id) = {
            let children = &self.nodes[parent].children;
            (children[idx], children[idx + 1])
        };

        let sibling = &mut self.nodes[sibling_id];
        if sibling.entries.is_empty() {
            panic!("borrow from empty sibling {sibling_id}");
        }
        let lent = sibling.entries.remove(0);
        let lent_child = if sibling.is_leaf {
            None
        } else {
            Some(sibling.children.remove(0))
        };

        let separator = std::mem::replace(&mut self.nodes[parent].entries[idx], lent);
        let child = &mut self.nodes[child_id];
        child.entries.push(separator);
        if let Some(grandchild) = lent_child {
            child.children.push(grandchild);
        }

        tracing::trace!(variant = P::NAME, from = %sibling_id, to = %child_id, "borrow from right sibling");
    }

    /// Merge child `idx + 1` of `parent` into child `idx`, absorbing the separator
    fn merge_children(&mut self, parent: NodeId, idx: usize) {
        let parent_node = &mut self.nodes[parent];
        let separator = parent_node.entries.remove(idx);
        let right_id = parent_node.children.remove(idx + 1);
        let left_id = parent_node.children[idx];

        let right = self.nodes.free(right_id);
        let left = &mut self.nodes[left_id];
        left.entries.push(separator);
        left.entries.extend(right.entries);
        left.children.extend(right.children);
        if P::LEAF_CHAIN && left.is_leaf {
            // The absorbed leaf drops out of the chain
            left.next = right.next;
        }

        tracing::trace!(variant = P::NAME, into = %left_id, absorbed = %right_id, "merge nodes");
    }

    /// Replace an empty internal root by its only child
    fn collapse_root(&mut self) {
        loop {
            let root = &self.nodes[self.root];
            if !root.is_empty() || root.is_leaf {
                return;
            }
            let child = root.children[0];
            self.nodes.free(self.root);
            self.root = child;
            self.height -= 1;
            tracing::debug!(variant = P::NAME, height = self.height, "root collapsed");
        }
    }

    fn leftmost_leaf(&self) -> NodeId {
        let mut current = self.root;
        loop {
            let node = &self.nodes[current];
            if node.is_leaf {
                return current;
            }
            current = node.children[0];
        }
    }

    /// Check every structural invariant of the tree
    pub fn validate(&self) -> Result<()> {
        let d = self.config.min_degree;
        let max = self.config.max_keys();
        let min = P::min_fill(d);

        let mut stack: Vec<(NodeId, usize, Option<Key>, Option<Key>)> =
            vec![(self.root, 1, None, None)];
        let mut leaves = Vec::new();
        let mut visited = 0;
        let mut entries = 0;

        while let Some((id, depth, lo, hi)) = stack.pop() {
            let node = self
                .nodes
                .get(id)
                .ok_or_else(|| IndexError::invariant(format!("dangling node {id}")))?;
            visited += 1;
            entries += node.len();

            if node.len() > max {
                return Err(IndexError::invariant(format!(
                    "node {id} holds {} entries, max is {max}",
                    node.len()
                )));
            }
            if id != self.root && node.len() < min {
                return Err(IndexError::invariant(format!(
                    "node {id} holds {} entries, min is {min}",
                    node.len()
                )));
            }
            if node.entries.windows(2).any(|w| w[0].key() > w[1].key()) {
                return Err(IndexError::invariant(format!("node {id} is not sorted")));
            }
            let out_of_range = node.entries.iter().any(|e| {
                lo.map_or(false, |lo| e.key() < lo) || hi.map_or(false, |hi| e.key() > hi)
            });
            if out_of_range {
                return Err(IndexError::invariant(format!(
                    "node {id} holds keys outside its parent's range"
                )));
            }

            if node.is_leaf {
                if !node.children.is_empty() {
                    return Err(IndexError::invariant(format!("leaf {id} has children")));
                }
                if depth != self.height {
                    return Err(IndexError::invariant(format!(
                        "leaf {id} at depth {depth}, tree height is {}",
                        self.height
                    )));
                }
                leaves.push(id);
                continue;
            }

            if node.children.len() != node.len() + 1 {
                return Err(IndexError::invariant(format!(
                    "node {id} has {} entries but {} children",
                    node.len(),
                    node.children.len()
                )));
            }
            if node.next.is_some() {
                return Err(IndexError::invariant(format!(
                    "internal node {id} has a leaf link"
                )));
            }
            // Push right-to-left so leaves are collected in key order
            for (i, &child) in node.children.iter().enumerate().rev() {
                let child_lo = if i == 0 { lo } else { Some(node.entries[i - 1].key()) };
                let child_hi = node.entries.get(i).map(Entry::key).or(hi);
                stack.push((child, depth + 1, child_lo, child_hi));
            }
        }

        if entries != self.len {
            return Err(IndexError::invariant(format!(
                "counted {entries} entries, tree reports {}",
                self.len
            )));
        }
        if visited != self.nodes.len() {
            return Err(IndexError::invariant(format!(
                "{} live nodes but only {visited} reachable",
                self.nodes.len()
            )));
        }

        for (i, &leaf) in leaves.iter().enumerate() {
            let expected = if P::LEAF_CHAIN {
                leaves.get(i + 1).copied()
            } else {
                None
            };
            if self.nodes[leaf].next != expected {
                return Err(IndexError::invariant(format!(
                    "leaf {leaf} links to {:?}, expected {:?}",
                    self.nodes[leaf].next, expected
                )));
            }
        }

        Ok(())
    }

    /// Export the tree structure for visualization
    pub fn export_tree(&self) -> Option<TreeNode> {
        if self.is_empty() {
            return None;
        }
        Some(self.export_node(self.root))
    }

    fn export_node(&self, id: NodeId) -> TreeNode {
        let node = &self.nodes[id];
        TreeNode {
            node_id: id.value(),
            is_leaf: node.is_leaf,
            keys: node.entries.iter().map(Entry::key).collect(),
            payloads: node.entries.iter().map(|e| e.payload().to_string()).collect(),
            height: None,
            children: node.children.iter().map(|&c| self.export_node(c)).collect(),
        }
    }
}

impl<P: LeafChain> MultiwayTree<P> {
    /// Walk the leaf chain from the leftmost leaf
    pub fn leaf_entries(&self) -> LeafCursor<'_> {
        LeafCursor::new(&self.nodes, self.leftmost_leaf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btree::{Classic, LeafChained, Redistributing};

    fn keys<P: FillPolicy>(tree: &MultiwayTree<P>) -> Vec<Key> {
        tree.iter().map(Entry::key).collect()
    }

    #[test]
    fn test_tree_empty() -> Result<()> {
        let tree = MultiwayTree::<Classic>::new(2)?;
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.search(1), None);
        assert!(tree.export_tree().is_none());
        tree.validate()
    }

    #[test]
    fn test_tree_rejects_small_degree() {
        assert!(matches!(
            MultiwayTree::<Classic>::new(1),
            Err(IndexError::InvalidDegree { degree: 1, .. })
        ));
        assert!(MultiwayTree::<LeafChained>::new(0).is_err());
        assert!(MultiwayTree::<Redistributing>::with_config(TreeConfig { min_degree: 1 }).is_err());
    }

    #[test]
    fn test_root_split_shape() -> Result<()> {
        let mut tree = MultiwayTree::<Classic>::new(2)?;
        for k in [10, 20, 5] {
            tree.insert(k, k.to_string());
        }
        assert_eq!(tree.height(), 1);

        // Fourth insert finds a full root: [5 10 20] splits around 10
        tree.insert(6, "6");
        assert_eq!(tree.height(), 2);
        let root = tree.node(tree.root()).unwrap();
        assert_eq!(root.entries()[0].key(), 10);
        assert_eq!(root.children().len(), 2);
        assert_eq!(keys(&tree), vec![5, 6, 10, 20]);
        tree.validate()
    }

    #[test]
    fn test_search_resolves_at_internal_node() -> Result<()> {
        let mut tree = MultiwayTree::<LeafChained>::new(2)?;
        for k in 1..=4 {
            tree.insert(k, format!("v{k}"));
        }
        let root = tree.node(tree.root()).unwrap();
        assert!(!root.is_leaf());
        let separator = root.entries()[0].clone();
        assert_eq!(tree.search(separator.key()), Some(&separator));
        Ok(())
    }

    #[test]
    fn test_delete_internal_entry() -> Result<()> {
        let mut tree = MultiwayTree::<Classic>::new(2)?;
        for k in [10, 20, 30, 5, 6, 7] {
            tree.insert(k, k.to_string());
        }
        tree.validate()?;

        let root_key = tree.node(tree.root()).unwrap().entries()[0].key();
        let removed = tree.delete(root_key).unwrap();
        assert_eq!(removed.key(), root_key);
        assert_eq!(tree.search(root_key), None);
        assert_eq!(tree.len(), 5);
        tree.validate()
    }

    #[test]
    fn test_delete_until_empty_collapses_root() -> Result<()> {
        let mut tree = MultiwayTree::<Classic>::new(2)?;
        for k in 0..40 {
            tree.insert(k, k.to_string());
        }
        assert!(tree.height() > 2);

        for k in 0..40 {
            assert_eq!(tree.delete(k).map(Entry::into_payload), Some(k.to_string()));
            tree.validate()?;
        }
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.delete(3), None);
        Ok(())
    }

    #[test]
    fn test_delete_missing_key_keeps_entries() -> Result<()> {
        let mut tree = MultiwayTree::<Redistributing>::new(3)?;
        for k in (0..60).step_by(2) {
            tree.insert(k, k.to_string());
        }
        assert_eq!(tree.delete(31), None);
        assert_eq!(tree.len(), 30);
        assert_eq!(keys(&tree), (0..60).step_by(2).collect::<Vec<_>>());
        tree.validate()
    }

    #[test]
    fn test_duplicates_are_kept() -> Result<()> {
        let mut tree = MultiwayTree::<Classic>::new(2)?;
        for payload in ["a", "b", "c", "d", "e"] {
            tree.insert(7, payload);
        }
        tree.insert(3, "x");
        assert_eq!(tree.len(), 6);
        tree.validate()?;

        let mut removed = Vec::new();
        while let Some(entry) = tree.delete(7) {
            removed.push(entry.into_payload());
            tree.validate()?;
        }
        removed.sort();
        assert_eq!(removed, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(keys(&tree), vec![3]);
        Ok(())
    }

    #[test]
    fn test_clear() -> Result<()> {
        let mut tree = MultiwayTree::<LeafChained>::new(2)?;
        for k in 0..20 {
            tree.insert(k, "v");
        }
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.leaf_entries().count(), 0);
        tree.validate()
    }

    #[test]
    fn test_export_tree() -> Result<()> {
        let mut tree = MultiwayTree::<Classic>::new(2)?;
        for k in 1..=4 {
            tree.insert(k, format!("v{k}"));
        }
        let exported = tree.export_tree().unwrap();
        assert!(!exported.is_leaf);
        assert_eq!(exported.keys, vec![2]);
        assert_eq!(exported.children.len(), 2);
        assert_eq!(exported.children[1].payloads, vec!["v3", "v4"]);
        Ok(())
    }
}
