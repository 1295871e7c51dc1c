//! Interchangeable engine facade.
//!
//! Every back-end answers the same three calls through [`OrderedIndex`];
//! [`Engine`] wraps one of the four concrete trees so a driver can pick a
//! back-end from configuration and feed all of them identical workloads.

use crate::avl::BalancedSearchTree;
use crate::btree::{BPlusIndex, BStarIndex, BTreeIndex, FillPolicy, MultiwayTree};
use crate::error::{IndexError, Result};
use crate::types::{Entry, Key, TreeConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A key-ordered associative store
pub trait OrderedIndex {
    /// Add an entry; duplicate keys are accepted
    fn insert(&mut self, key: Key, payload: String);

    /// Find an entry by key; `None` is the not-found outcome
    fn search(&self, key: Key) -> Option<&Entry>;

    /// Remove an entry by key, returning it when found
    fn delete(&mut self, key: Key) -> Option<Entry>;

    /// Number of stored entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderedIndex for BalancedSearchTree {
    fn insert(&mut self, key: Key, payload: String) {
        BalancedSearchTree::insert(self, key, payload)
    }

    fn search(&self, key: Key) -> Option<&Entry> {
        BalancedSearchTree::search(self, key)
    }

    fn delete(&mut self, key: Key) -> Option<Entry> {
        BalancedSearchTree::delete(self, key)
    }

    fn len(&self) -> usize {
        BalancedSearchTree::len(self)
    }
}

impl<P: FillPolicy> OrderedIndex for MultiwayTree<P> {
    fn insert(&mut self, key: Key, payload: String) {
        MultiwayTree::insert(self, key, payload)
    }

    fn search(&self, key: Key) -> Option<&Entry> {
        MultiwayTree::search(self, key)
    }

    fn delete(&mut self, key: Key) -> Option<Entry> {
        MultiwayTree::delete(self, key)
    }

    fn len(&self) -> usize {
        MultiwayTree::len(self)
    }
}

/// Available back-ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Avl,
    BTree,
    BPlus,
    BStar,
}

impl IndexKind {
    /// Every back-end, in driver order
    pub const ALL: [IndexKind; 4] = [Self::Avl, Self::BTree, Self::BPlus, Self::BStar];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Avl => "avl",
            Self::BTree => "btree",
            Self::BPlus => "bplus",
            Self::BStar => "bstar",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexKind {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "avl" => Ok(Self::Avl),
            "btree" | "b" => Ok(Self::BTree),
            "bplus" | "b+" => Ok(Self::BPlus),
            "bstar" | "b*" => Ok(Self::BStar),
            _ => Err(IndexError::UnknownKind(s.to_string())),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Which back-end to build
    pub kind: IndexKind,
    /// Multiway tree settings; ignored by the AVL engine
    pub tree: TreeConfig,
}

impl Config {
    /// Create a configuration with the default minimum degree
    pub fn new(kind: IndexKind) -> Self {
        Self {
            kind,
            tree: TreeConfig::default(),
        }
    }

    /// Set the minimum degree (validated when the engine is opened)
    pub fn min_degree(mut self, min_degree: usize) -> Self {
        self.tree.min_degree = min_degree;
        self
    }
}

/// Node type for visualization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Arena slot of the node
    pub node_id: u32,
    /// Whether this is a leaf node
    pub is_leaf: bool,
    /// Keys in this node
    pub keys: Vec<Key>,
    /// Payloads, parallel to `keys`
    pub payloads: Vec<String>,
    /// Subtree height (balanced tree only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<usize>,
    /// Child nodes in key order
    pub children: Vec<TreeNode>,
}

/// Engine statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub kind: IndexKind,
    /// Stored entries
    pub len: usize,
    /// Number of levels
    pub height: usize,
    /// Live nodes
    pub node_count: usize,
}

/// One of the four back-ends behind a common interface
#[derive(Debug)]
pub enum Engine {
    Avl(BalancedSearchTree),
    BTree(BTreeIndex),
    BPlus(BPlusIndex),
    BStar(BStarIndex),
}

impl Engine {
    /// Build an empty engine
    pub fn open(config: &Config) -> Result<Self> {
        let engine = match config.kind {
            IndexKind::Avl => Self::Avl(BalancedSearchTree::new()),
            IndexKind::BTree => Self::BTree(BTreeIndex::with_config(config.tree)?),
            IndexKind::BPlus => Self::BPlus(BPlusIndex::with_config(config.tree)?),
            IndexKind::BStar => Self::BStar(BStarIndex::with_config(config.tree)?),
        };
        tracing::debug!(kind = %config.kind, min_degree = config.tree.min_degree, "opened engine");
        Ok(engine)
    }

    pub fn kind(&self) -> IndexKind {
        match self {
            Self::Avl(_) => IndexKind::Avl,
            Self::BTree(_) => IndexKind::BTree,
            Self::BPlus(_) => IndexKind::BPlus,
            Self::BStar(_) => IndexKind::BStar,
        }
    }

    fn as_index(&self) -> &dyn OrderedIndex {
        match self {
            Self::Avl(tree) => tree,
            Self::BTree(tree) => tree,
            Self::BPlus(tree) => tree,
            Self::BStar(tree) => tree,
        }
    }

    fn as_index_mut(&mut self) -> &mut dyn OrderedIndex {
        match self {
            Self::Avl(tree) => tree,
            Self::BTree(tree) => tree,
            Self::BPlus(tree) => tree,
            Self::BStar(tree) => tree,
        }
    }

    /// Get statistics about the engine
    pub fn stats(&self) -> IndexStats {
        let (height, node_count) = match self {
            Self::Avl(tree) => (tree.height(), tree.node_count()),
            Self::BTree(tree) => (tree.height(), tree.node_count()),
            Self::BPlus(tree) => (tree.height(), tree.node_count()),
            Self::BStar(tree) => (tree.height(), tree.node_count()),
        };
        IndexStats {
            kind: self.kind(),
            len: self.as_index().len(),
            height,
            node_count,
        }
    }

    /// Check the structural invariants of the wrapped tree
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Avl(tree) => tree.validate(),
            Self::BTree(tree) => tree.validate(),
            Self::BPlus(tree) => tree.validate(),
            Self::BStar(tree) => tree.validate(),
        }
    }

    /// Every entry in ascending key order
    pub fn entries(&self) -> Box<dyn Iterator<Item = &Entry> + '_> {
        match self {
            Self::Avl(tree) => Box::new(tree.iter()),
            Self::BTree(tree) => Box::new(tree.iter()),
            Self::BPlus(tree) => Box::new(tree.iter()),
            Self::BStar(tree) => Box::new(tree.iter()),
        }
    }

    /// Export the tree structure for visualization
    pub fn export_tree(&self) -> Option<TreeNode> {
        match self {
            Self::Avl(tree) => tree.export_tree(),
            Self::BTree(tree) => tree.export_tree(),
            Self::BPlus(tree) => tree.export_tree(),
            Self::BStar(tree) => tree.export_tree(),
        }
    }
}

impl OrderedIndex for Engine {
    fn insert(&mut self, key: Key, payload: String) {
        self.as_index_mut().insert(key, payload)
    }

    fn search(&self, key: Key) -> Option<&Entry> {
        self.as_index().search(key)
    }

    fn delete(&mut self, key: Key) -> Option<Entry> {
        self.as_index_mut().delete(key)
    }

    fn len(&self) -> usize {
        self.as_index().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() -> Result<()> {
        assert_eq!("AVL".parse::<IndexKind>()?, IndexKind::Avl);
        assert_eq!("b+".parse::<IndexKind>()?, IndexKind::BPlus);
        assert_eq!(" bstar ".parse::<IndexKind>()?, IndexKind::BStar);
        assert!(matches!(
            "trie".parse::<IndexKind>(),
            Err(IndexError::UnknownKind(ref s)) if s == "trie"
        ));
        for kind in IndexKind::ALL {
            assert_eq!(kind.to_string().parse::<IndexKind>()?, kind);
        }
        Ok(())
    }

    #[test]
    fn test_open_validates_degree() {
        assert!(Engine::open(&Config::new(IndexKind::BTree).min_degree(1)).is_err());
        assert!(Engine::open(&Config::new(IndexKind::BStar).min_degree(0)).is_err());
        // The balanced tree ignores the degree
        assert!(Engine::open(&Config::new(IndexKind::Avl).min_degree(1)).is_ok());
    }

    #[test]
    fn test_engines_share_one_interface() -> Result<()> {
        for kind in IndexKind::ALL {
            let mut engine = Engine::open(&Config::new(kind).min_degree(2))?;
            assert_eq!(engine.kind(), kind);

            for k in [10, 20, 5, 6, 12] {
                engine.insert(k, format!("v{k}"));
            }
            assert_eq!(engine.len(), 5);
            assert_eq!(engine.search(6).map(Entry::payload), Some("v6"));
            assert_eq!(engine.search(7), None);

            assert_eq!(engine.delete(20), Some(Entry::new(20, "v20")));
            assert_eq!(engine.delete(20), None);
            engine.validate()?;

            let keys: Vec<Key> = engine.entries().map(Entry::key).collect();
            assert_eq!(keys, vec![5, 6, 10, 12], "{kind}");

            let stats = engine.stats();
            assert_eq!(stats.len, 4);
            assert!(stats.height >= 1);
            assert!(stats.node_count >= 1);
        }
        Ok(())
    }

    #[test]
    fn test_export_serializes() -> Result<()> {
        let mut engine = Engine::open(&Config::new(IndexKind::BPlus).min_degree(2))?;
        for k in 1..=4 {
            engine.insert(k, k.to_string());
        }
        let tree = engine.export_tree().unwrap();
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["isLeaf"], false);
        assert_eq!(json["keys"][0], 2);
        assert!(json.get("height").is_none());
        Ok(())
    }

    #[test]
    fn test_config_serde() {
        let config = Config::new(IndexKind::BStar).min_degree(4);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"kind":"bstar","tree":{"minDegree":4}}"#);
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
