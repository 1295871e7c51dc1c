//! Multiway tree implementations.
//!
//! This module provides three in-memory multiway search trees that share
//! one split/merge/borrow core ([`MultiwayTree`]) and differ only in their
//! [`FillPolicy`]:
//! - [`BTreeIndex`]: classic B-tree
//! - [`BPlusIndex`]: B-tree whose leaves form an ascending linked chain
//! - [`BStarIndex`]: chained leaves, and siblings keep lending entries to
//!   an under-full neighbour while they hold more than `⌊2d/3⌋` keys
//!
//! Internal nodes of all three store full entries rather than bare
//! separators, so a key can be answered without reaching a leaf.

mod cursor;
mod node;
mod policy;
mod tree;

pub use cursor::{InOrder, LeafCursor};
pub use node::MultiwayNode;
pub use policy::{Classic, FillPolicy, LeafChain, LeafChained, Redistributing};
pub use tree::MultiwayTree;

/// Classic B-tree of minimum degree `d`
pub type BTreeIndex = MultiwayTree<Classic>;

/// B+-style tree: B-tree shape with leaves threaded in key order
pub type BPlusIndex = MultiwayTree<LeafChained>;

/// B*-style tree: leaf-chained, redistributes before merging
pub type BStarIndex = MultiwayTree<Redistributing>;
