//! Common types used throughout the index engines.

mod node_id;

pub use node_id::NodeId;

use crate::error::{IndexError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Record key. Keys compare by natural integer order.
pub type Key = i64;

/// Smallest minimum degree a multiway tree accepts
pub const MIN_DEGREE: usize = 2;

/// Minimum degree used when none is configured
pub const DEFAULT_MIN_DEGREE: usize = 3;

/// An immutable `(key, payload)` record.
///
/// Entries are ordered by key only; two entries with the same key and
/// different payloads are distinct records that may coexist in an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: Key,
    payload: String,
}

impl Entry {
    /// Create a new entry
    pub fn new(key: Key, payload: impl Into<String>) -> Self {
        Self {
            key,
            payload: payload.into(),
        }
    }

    /// The record key
    pub fn key(&self) -> Key {
        self.key
    }

    /// The associated payload
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Consume the entry and return its payload
    pub fn into_payload(self) -> String {
        self.payload
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.key, self.payload)
    }
}

/// Multiway tree configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeConfig {
    /// Minimum degree `d`: nodes hold at most `2d-1` keys
    pub min_degree: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            min_degree: DEFAULT_MIN_DEGREE,
        }
    }
}

impl TreeConfig {
    /// Create a config, rejecting degrees below [`MIN_DEGREE`]
    pub fn new(min_degree: usize) -> Result<Self> {
        let config = Self { min_degree };
        config.validate()?;
        Ok(config)
    }

    /// Check the degree bound; deserialized configs bypass `new`
    pub fn validate(&self) -> Result<()> {
        if self.min_degree < MIN_DEGREE {
            return Err(IndexError::InvalidDegree {
                degree: self.min_degree,
                min: MIN_DEGREE,
            });
        }
        Ok(())
    }

    /// Maximum number of keys per node (`2d-1`)
    pub fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }
}
