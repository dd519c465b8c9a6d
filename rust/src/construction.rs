//! Construction and initialization logic for BPlusIndex and its nodes.
//!
//! This module contains configuration validation, fallible node allocation,
//! and the constructors for the index.

use crate::arena::NodeArena;
use crate::compare::{DropRelease, NaturalOrder, ReleaseHooks};
use crate::error::{IndexError, IndexResult, IndexResultExt, InitResult};
use crate::types::{
    BPlusIndex, BranchNode, LeafNode, NodeRef, MIN_BRANCHING_FACTOR, NULL_NODE,
};

/// Default minimum degree for index nodes
pub const DEFAULT_BRANCHING_FACTOR: usize = 3;

/// Largest branching factor whose node buffer sizes cannot overflow
const MAX_BRANCHING_FACTOR: usize = usize::MAX / 4;

/// Construction-time settings for an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// Minimum degree `t`; nodes hold `t - 1 ..= 2t - 1` keys.
    pub branching_factor: usize,
    /// Cap on leaf plus branch nodes. Inserts that would exceed it fail with
    /// `AllocationFailure`.
    pub node_limit: Option<usize>,
}

impl IndexConfig {
    pub fn new(branching_factor: usize) -> Self {
        Self {
            branching_factor,
            node_limit: None,
        }
    }

    pub fn with_node_limit(mut self, node_limit: usize) -> Self {
        self.node_limit = Some(node_limit);
        self
    }

    /// Reject settings that cannot produce a valid tree.
    pub fn validate(&self) -> InitResult<()> {
        if self.branching_factor < MIN_BRANCHING_FACTOR {
            return Err(IndexError::invalid_branching_factor(
                self.branching_factor,
                MIN_BRANCHING_FACTOR,
            ));
        }
        if self.branching_factor > MAX_BRANCHING_FACTOR {
            return Err(IndexError::invalid_configuration(
                "branching factor",
                &format!("{} exceeds {}", self.branching_factor, MAX_BRANCHING_FACTOR),
            ));
        }
        if self.node_limit == Some(0) {
            return Err(IndexError::invalid_configuration(
                "node limit",
                "must allow at least the root leaf",
            ));
        }
        Ok(())
    }

    /// Most keys a node may hold.
    pub fn max_keys(&self) -> usize {
        self.branching_factor.saturating_mul(2).saturating_sub(1)
    }

    /// Fewest keys a non-root node may hold.
    pub fn min_keys(&self) -> usize {
        self.branching_factor.saturating_sub(1)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BRANCHING_FACTOR)
    }
}

impl<K, R> BPlusIndex<K, R> {
    /// Create an index ordered by `K: Ord` whose keys and records are dropped
    /// on release.
    ///
    /// # Arguments
    ///
    /// * `branching_factor` - Minimum degree `t` (at least 2)
    ///
    /// # Examples
    ///
    /// ```
    /// use parking_index::BPlusIndex;
    ///
    /// let index = BPlusIndex::<i32, String>::new(3).unwrap();
    /// assert!(index.is_empty());
    /// assert!(BPlusIndex::<i32, String>::new(1).is_err());
    /// ```
    pub fn new(branching_factor: usize) -> InitResult<Self> {
        Self::with_strategies(branching_factor, NaturalOrder, DropRelease)
    }

    /// Create an index with [`DEFAULT_BRANCHING_FACTOR`].
    pub fn with_default_branching_factor() -> InitResult<Self> {
        Self::new(DEFAULT_BRANCHING_FACTOR)
    }
}

impl<K, R, C, H: ReleaseHooks<K, R>> BPlusIndex<K, R, C, H> {
    /// Create an empty index with an explicit comparator and release strategy.
    ///
    /// Fails with `InvalidConfiguration` when `branching_factor < 2` and with
    /// `AllocationFailure` when the root leaf cannot be allocated.
    pub fn with_strategies(branching_factor: usize, comparator: C, hooks: H) -> InitResult<Self> {
        Self::with_config(IndexConfig::new(branching_factor), comparator, hooks)
    }

    /// Create an empty index from a full configuration.
    pub fn with_config(config: IndexConfig, comparator: C, hooks: H) -> InitResult<Self> {
        config.validate()?;

        let mut leaf_arena = NodeArena::new();
        let root_leaf = LeafNode::try_new(config.branching_factor)?;
        let root_id = leaf_arena.allocate(root_leaf).with_context("root leaf")?;

        Ok(Self {
            branching_factor: config.branching_factor,
            node_limit: config.node_limit,
            root: NodeRef::leaf(root_id),
            first_leaf: root_id,
            last_leaf: root_id,
            len: 0,
            height: 1,
            leaf_arena,
            branch_arena: NodeArena::new(),
            comparator,
            hooks,
        })
    }

    /// The configuration this index was built with.
    pub fn config(&self) -> IndexConfig {
        IndexConfig {
            branching_factor: self.branching_factor,
            node_limit: self.node_limit,
        }
    }
}

fn reserved_vec<T>(slots: usize, resource: &str) -> IndexResult<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(slots)
        .map_err(|e| IndexError::allocation_failure(resource, &e.to_string()))?;
    Ok(buffer)
}

impl<K, R> LeafNode<K, R> {
    /// Creates an empty, unlinked leaf sized for branching factor `t`.
    ///
    /// Buffers hold `2t` entries: a full node plus the one being inserted
    /// before it splits.
    pub fn try_new(branching_factor: usize) -> IndexResult<Self> {
        let slots = 2 * branching_factor;
        Ok(Self {
            keys: reserved_vec(slots, "leaf keys")?,
            records: reserved_vec(slots, "leaf records")?,
            next: NULL_NODE,
            prev: NULL_NODE,
        })
    }
}

impl<K, R> BranchNode<K, R> {
    /// Creates an empty branch sized for branching factor `t`.
    pub fn try_new(branching_factor: usize) -> IndexResult<Self> {
        let slots = 2 * branching_factor;
        Ok(Self {
            keys: reserved_vec(slots, "branch keys")?,
            children: reserved_vec(slots + 1, "branch children")?,
        })
    }
}

/// Sizing heuristics for construction
pub mod sizing {
    use super::DEFAULT_BRANCHING_FACTOR;

    /// Suggest a branching factor for the expected number of records.
    ///
    /// Small collections keep the default so splits stay cheap; larger ones
    /// trade wider nodes for a shallower tree.
    pub fn recommended_branching_factor(expected_records: usize) -> usize {
        if expected_records < 1_000 {
            DEFAULT_BRANCHING_FACTOR
        } else if expected_records < 100_000 {
            16
        } else if expected_records < 10_000_000 {
            32
        } else {
            64
        }
    }
}
