//! Free slot tracking.
//!
//! Slots released by merges and splices are reused by later allocations
//! so a long insert/delete workload does not grow the arena unboundedly.

use crate::types::NodeId;

/// Manages free node slots for reuse
#[derive(Debug, Default)]
pub struct FreeList {
    /// Stack of released slot ids, most recently freed on top
    slots: Vec<NodeId>,
}

impl FreeList {
    /// Create a new empty free list
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Add a slot to the free list
    pub fn push(&mut self, id: NodeId) {
        self.slots.push(id);
    }

    /// Get a free slot, if available
    pub fn pop(&mut self) -> Option<NodeId> {
        self.slots.pop()
    }

    /// Get the number of free slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freelist_operations() {
        let mut fl = FreeList::new();
        assert_eq!(fl.len(), 0);
        assert_eq!(fl.pop(), None);

        fl.push(NodeId::new(5));
        fl.push(NodeId::new(10));
        assert_eq!(fl.len(), 2);

        assert_eq!(fl.pop(), Some(NodeId::new(10)));
        assert_eq!(fl.pop(), Some(NodeId::new(5)));
        assert_eq!(fl.pop(), None);
    }
}
