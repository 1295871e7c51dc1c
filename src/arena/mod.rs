//! Slot arena owning the nodes of one tree.
//!
//! Every engine stores its nodes in a [`NodeArena`] and links them by
//! [`NodeId`] instead of owned pointers. Parent back-references in the
//! balanced tree and the leaf chain in the multiway trees are plain ids, so
//! no ownership cycles exist and splits/merges only rewrite integers.

mod freelist;

use crate::types::NodeId;
use freelist::FreeList;
use std::ops::{Index, IndexMut};

/// Arena of nodes addressed by [`NodeId`]
#[derive(Debug)]
pub struct NodeArena<N> {
    /// Node slots; `None` marks a freed slot
    slots: Vec<Option<N>>,
    /// Freed slots available for reuse
    free: FreeList,
}

impl<N> Default for NodeArena<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> NodeArena<N> {
    /// Create an empty arena
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: FreeList::new(),
        }
    }

    /// Store a node and return its id, reusing a freed slot when possible
    pub fn alloc(&mut self, node: N) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.index()] = Some(node);
            return id;
        }
        let id = NodeId::new(self.slots.len() as u32);
        self.slots.push(Some(node));
        id
    }

    /// Remove a node from the arena and hand it back to the caller
    pub fn free(&mut self, id: NodeId) -> N {
        match self.slots.get_mut(id.index()).and_then(Option::take) {
            Some(node) => {
                self.free.push(id);
                node
            }
            None => panic!("double free of node {id}"),
        }
    }

    /// Borrow a live node
    pub fn get(&self, id: NodeId) -> Option<&N> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Mutably borrow a live node
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut N> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Check if the arena holds no live nodes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every node
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free = FreeList::new();
    }
}

impl<N> Index<NodeId> for NodeArena<N> {
    type Output = N;

    fn index(&self, id: NodeId) -> &N {
        match self.get(id) {
            Some(node) => node,
            None => panic!("dangling node id {id}"),
        }
    }
}

impl<N> IndexMut<NodeId> for NodeArena<N> {
    fn index_mut(&mut self, id: NodeId) -> &mut N {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("dangling node id {id}"),
        }
    }
}
