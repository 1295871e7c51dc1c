//! Node identifier type.

use std::fmt;

/// Identifier of a node slot inside a [`NodeArena`](crate::arena::NodeArena).
///
/// Ids are 0-indexed slot positions. A freed id may be handed out again by
/// a later allocation, so an id is only meaningful while its node is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw slot number, as shown in tree exports
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Slot position in the arena
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
