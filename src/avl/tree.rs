//! Height-balanced binary search tree.
//!
//! Heights are canonical subtree heights (`1 + max(child heights)`, empty
//! subtree 0). After every insert or delete the tree walks from the
//! affected node up to the root, refreshing heights and rotating wherever
//! the two child heights differ by more than one.

use super::node::AvlNode;
use crate::arena::NodeArena;
use crate::engine::TreeNode;
use crate::error::{IndexError, Result};
use crate::types::{Entry, Key, NodeId};

/// AVL tree over integer-keyed entries
#[derive(Debug, Default)]
pub struct BalancedSearchTree {
    nodes: NodeArena<AvlNode>,
    root: Option<NodeId>,
    len: usize,
}

impl BalancedSearchTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the whole tree, 0 when empty
    pub fn height(&self) -> usize {
        self.subtree_height(self.root)
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Borrow a node by id
    pub fn node(&self, id: NodeId) -> Option<&AvlNode> {
        self.nodes.get(id)
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Look up the first entry with `key` met on the search path
    pub fn search(&self, key: Key) -> Option<&Entry> {
        self.find(key).map(|id| &self.nodes[id].entry)
    }

    /// Insert an entry. An equal key descends to the right.
    pub fn insert(&mut self, key: Key, payload: impl Into<String>) {
        let entry = Entry::new(key, payload);
        let Some(mut current) = self.root else {
            self.root = Some(self.nodes.alloc(AvlNode::new(entry, None)));
            self.len = 1;
            return;
        };

        loop {
            let node = &self.nodes[current];
            let next = if key < node.entry.key() {
                node.left
            } else {
                node.right
            };
            match next {
                Some(child) => current = child,
                None => break,
            }
        }

        let goes_left = key < self.nodes[current].entry.key();
        let id = self.nodes.alloc(AvlNode::new(entry, Some(current)));
        if goes_left {
            self.nodes[current].left = Some(id);
        } else {
            self.nodes[current].right = Some(id);
        }
        self.len += 1;

        self.rebalance(Some(id));
    }

    /// Delete the first entry with `key`, returning it if present
    pub fn delete(&mut self, key: Key) -> Option<Entry> {
        let target = self.find(key)?;
        let node = &self.nodes[target];

        let removed = match (node.left, node.right) {
            (Some(_), Some(right)) => {
                // Take over the in-order successor's entry, then unlink the successor
                let successor = self.leftmost(right);
                let successor_entry = self.splice(successor);
                std::mem::replace(&mut self.nodes[target].entry, successor_entry)
            }
            _ => self.splice(target),
        };

        self.len -= 1;
        Some(removed)
    }

    /// In-order iterator over every entry
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tree: self,
            next: self.root.map(|root| self.leftmost(root)),
        }
    }

    fn find(&self, key: Key) -> Option<NodeId> {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            let node_key = node.entry.key();
            if key == node_key {
                return Some(id);
            }
            current = if key < node_key { node.left } else { node.right };
        }
        None
    }

    fn leftmost(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(left) = self.nodes[current].left {
            current = left;
        }
        current
    }

    fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.nodes[id].right {
            return Some(self.leftmost(right));
        }
        let mut child = id;
        let mut parent = self.nodes[id].parent;
        while let Some(p) = parent {
            if self.nodes[p].left == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.nodes[p].parent;
        }
        None
    }

    /// Unlink a node with at most one child and rebalance from its parent
    fn splice(&mut self, id: NodeId) -> Entry {
        let node = &self.nodes[id];
        debug_assert!(
            node.left.is_none() || node.right.is_none(),
            "splice of node {id} with two children"
        );
        let child = node.left.or(node.right);
        let parent = node.parent;

        self.replace_child(parent, id, child);
        if let Some(child) = child {
            self.nodes[child].parent = parent;
        }
        let removed = self.nodes.free(id);

        self.rebalance(parent);
        removed.entry
    }

    /// Point whichever link held `old` (a parent's child slot or the root) at `new`
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                let parent_node = &mut self.nodes[p];
                if parent_node.left == Some(old) {
                    parent_node.left = new;
                } else {
                    parent_node.right = new;
                }
            }
        }
    }

    fn subtree_height(&self, id: Option<NodeId>) -> usize {
        id.map_or(0, |id| self.nodes[id].height)
    }

    fn update_height(&mut self, id: NodeId) {
        let node = &self.nodes[id];
        let height = 1 + self
            .subtree_height(node.left)
            .max(self.subtree_height(node.right));
        self.nodes[id].height = height;
    }

    /// Left height minus right height
    fn balance_factor(&self, id: NodeId) -> isize {
        let node = &self.nodes[id];
        self.subtree_height(node.left) as isize - self.subtree_height(node.right) as isize
    }

    /// Walk from `start` to the root fixing heights and rotating where needed
    fn rebalance(&mut self, start: Option<NodeId>) {
        let mut current = start;
        while let Some(id) = current {
            self.update_height(id);
            let balance = self.balance_factor(id);

            let (left, right) = (self.nodes[id].left, self.nodes[id].right);
            let subtree_root = match (left, right) {
                (Some(left), _) if balance > 1 => {
                    // Left-right shape needs the child straightened first
                    if self.balance_factor(left) < 0 {
                        self.rotate_left(left);
                    }
                    self.rotate_right(id)
                }
                (_, Some(right)) if balance < -1 => {
                    if self.balance_factor(right) > 0 {
                        self.rotate_right(right);
                    }
                    self.rotate_left(id)
                }
                _ => id,
            };

            current = self.nodes[subtree_root].parent;
        }
    }

    /// Rotate `x` down to the left; returns the new subtree root
    fn rotate_left(&mut self, x: NodeId) -> NodeId {
        debug_assert!(
            self.nodes[x].right.is_some(),
            "rotate_left on {x} without a right child"
        );
        let Some(y) = self.nodes[x].right else {
            return x;
        };
        let inner = self.nodes[y].left;
        let parent = self.nodes[x].parent;

        self.nodes[x].right = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(x);
        }

        self.nodes[y].parent = parent;
        self.replace_child(parent, x, Some(y));

        self.nodes[y].left = Some(x);
        self.nodes[x].parent = Some(y);

        self.update_height(x);
        self.update_height(y);
        tracing::trace!(pivot = %x, new_root = %y, "rotate left");
        y
    }

    /// Rotate `x` down to the right; returns the new subtree root
    fn rotate_right(&mut self, x: NodeId) -> NodeId {
        debug_assert!(
            self.nodes[x].left.is_some(),
            "rotate_right on {x} without a left child"
        );
        let Some(y) = self.nodes[x].left else {
            return x;
        };
        let inner = self.nodes[y].right;
        let parent = self.nodes[x].parent;

        self.nodes[x].left = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(x);
        }

        self.nodes[y].parent = parent;
        self.replace_child(parent, x, Some(y));

        self.nodes[y].right = Some(x);
        self.nodes[x].parent = Some(y);

        self.update_height(x);
        self.update_height(y);
        tracing::trace!(pivot = %x, new_root = %y, "rotate right");
        y
    }

    /// Check ordering, parent links, heights and balance of every node
    pub fn validate(&self) -> Result<()> {
        let Some(root) = self.root else {
            if self.len != 0 || !self.nodes.is_empty() {
                return Err(IndexError::invariant("empty tree with live nodes"));
            }
            return Ok(());
        };
        if self.nodes[root].parent.is_some() {
            return Err(IndexError::invariant(format!("root {root} has a parent")));
        }

        let mut visited = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self
                .nodes
                .get(id)
                .ok_or_else(|| IndexError::invariant(format!("dangling node {id}")))?;
            visited += 1;

            for child in [node.left, node.right].into_iter().flatten() {
                if self.nodes.get(child).and_then(|c| c.parent) != Some(id) {
                    return Err(IndexError::invariant(format!(
                        "child {child} does not point back at {id}"
                    )));
                }
                stack.push(child);
            }

            let expected = 1 + self
                .subtree_height(node.left)
                .max(self.subtree_height(node.right));
            if node.height != expected {
                return Err(IndexError::invariant(format!(
                    "node {id} records height {}, actual {expected}",
                    node.height
                )));
            }
            if self.balance_factor(id).abs() > 1 {
                return Err(IndexError::invariant(format!(
                    "node {id} is unbalanced ({})",
                    self.balance_factor(id)
                )));
            }
        }

        if visited != self.len || visited != self.nodes.len() {
            return Err(IndexError::invariant(format!(
                "reached {visited} nodes, tree reports {} entries and {} live nodes",
                self.len,
                self.nodes.len()
            )));
        }

        // In-order keys must never decrease
        let mut previous: Option<Key> = None;
        for entry in self.iter() {
            if previous.map_or(false, |p| p > entry.key()) {
                return Err(IndexError::invariant(format!(
                    "key {} follows {:?} in order",
                    entry.key(),
                    previous
                )));
            }
            previous = Some(entry.key());
        }

        Ok(())
    }

    /// Export the tree structure for visualization
    pub fn export_tree(&self) -> Option<TreeNode> {
        self.root.map(|root| self.export_node(root))
    }

    fn export_node(&self, id: NodeId) -> TreeNode {
        let node = &self.nodes[id];
        TreeNode {
            node_id: id.value(),
            is_leaf: node.left.is_none() && node.right.is_none(),
            keys: vec![node.entry.key()],
            payloads: vec![node.entry.payload().to_string()],
            height: Some(node.height),
            children: [node.left, node.right]
                .into_iter()
                .flatten()
                .map(|child| self.export_node(child))
                .collect(),
        }
    }
}

/// In-order iterator following parent links
pub struct Iter<'a> {
    tree: &'a BalancedSearchTree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.successor(id);
        Some(&self.tree.nodes[id].entry)
    }
}
