//! # Ordered Index Engines
//!
//! Four in-memory ordered indexes over `(i64 key, String payload)` entries
//! that answer the same insert/search/delete calls, so identical workloads
//! can be replayed against each of them.
//!
//! ## Architecture
//!
//! - **Arena** (`arena`): slot storage with a free list; nodes refer to each
//!   other by [`NodeId`]
//! - **Balanced tree** (`avl`): height-balanced binary search tree
//! - **Multiway trees** (`btree`): B-tree, B+ tree and B* tree sharing one
//!   split/merge/borrow core
//! - **Engine** (`engine`): the [`OrderedIndex`] trait and the [`Engine`]
//!   facade selected by [`Config`]
//! - **Script** (`script`): parser for operation scripts replayed by the CLI
//!
//! ## Usage
//!
//! ```rust
//! use ordered_index::{Config, Engine, IndexKind, OrderedIndex};
//!
//! # fn main() -> ordered_index::Result<()> {
//! for kind in IndexKind::ALL {
//!     let mut engine = Engine::open(&Config::new(kind).min_degree(2))?;
//!
//!     engine.insert(10, "a".to_string());
//!     engine.insert(20, "b".to_string());
//!
//!     assert_eq!(engine.search(10).map(|e| e.payload()), Some("a"));
//!     assert!(engine.delete(20).is_some());
//!     assert!(engine.search(20).is_none());
//!     engine.validate()?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod arena;
pub mod avl;
pub mod btree;
pub mod engine;
pub mod error;
pub mod script;
pub mod types;

pub use error::{IndexError, Result};
pub use types::{Entry, Key, NodeId, TreeConfig, DEFAULT_MIN_DEGREE, MIN_DEGREE};

// Re-export main public API
pub use avl::BalancedSearchTree;
pub use btree::{BPlusIndex, BStarIndex, BTreeIndex};
pub use engine::{Config, Engine, IndexKind, IndexStats, OrderedIndex, TreeNode};
pub use script::{load_script, parse_script, Operation};
