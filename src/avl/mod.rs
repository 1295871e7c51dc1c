//! Height-balanced binary search tree (AVL).
//!
//! Nodes live in an arena; each node owns its children by id and keeps a
//! non-owning parent id so rebalancing can walk upward without recursion.

mod node;
mod tree;

pub use node::AvlNode;
pub use tree::{BalancedSearchTree, Iter};
