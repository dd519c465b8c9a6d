//! Core types and data structures for BPlusIndex.
//!
//! This module contains the fundamental data structures, type definitions,
//! and constants used throughout the index implementation.

use std::marker::PhantomData;

use crate::arena::NodeArena;
use crate::compare::{DropRelease, NaturalOrder, ReleaseHooks};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Smallest branching factor that still yields a valid multiway tree
pub(crate) const MIN_BRANCHING_FACTOR: usize = 2;

// ============================================================================
// TYPE DEFINITIONS
// ============================================================================

/// Node ID type for arena-based allocation
pub type NodeId = u32;

/// Sentinel for "no node" in sibling links
pub const NULL_NODE: NodeId = u32::MAX;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Insert-optimized B+ tree index.
///
/// Keys live in sorted leaves chained left to right; internal nodes hold
/// separator copies that route a descent to the right leaf. With branching
/// factor `t`, every node except the root holds between `t - 1` and
/// `2t - 1` keys and the root holds at most `2t - 1`.
///
/// # Type Parameters
///
/// * `K` - Key type; ordered by the comparator `C`
/// * `R` - Record type; owned by the index, never inspected
/// * `C` - Key ordering, [`NaturalOrder`] by default
/// * `H` - Release strategy for keys and records, [`DropRelease`] by default
///
/// # Examples
///
/// ```
/// use parking_index::BPlusIndex;
///
/// let mut index = BPlusIndex::new(3).unwrap();
/// index.insert(20, "twenty").unwrap();
/// index.insert(10, "ten").unwrap();
///
/// assert_eq!(index.get(&10), Some(&"ten"));
/// assert!(index.insert(10, "again").unwrap_err().is_duplicate_key());
///
/// let keys: Vec<_> = index.keys().copied().collect();
/// assert_eq!(keys, [10, 20]);
/// ```
///
/// # Performance Characteristics
///
/// - **Insertion**: O(t log n)
/// - **Lookup**: O(log n)
/// - **Ordered scan**: O(n), independent of height
#[derive(Debug)]
pub struct BPlusIndex<K, R, C = NaturalOrder, H = DropRelease>
where
    H: ReleaseHooks<K, R>,
{
    /// Minimum degree `t`.
    pub(crate) branching_factor: usize,
    /// Upper bound on the total number of nodes, if configured.
    pub(crate) node_limit: Option<usize>,
    pub(crate) root: NodeRef<K, R>,
    /// Head of the leaf chain.
    pub(crate) first_leaf: NodeId,
    /// Tail of the leaf chain.
    pub(crate) last_leaf: NodeId,
    /// Number of stored records.
    pub(crate) len: usize,
    /// Levels from root to leaf; a lone root leaf has height 1.
    pub(crate) height: usize,

    pub(crate) leaf_arena: NodeArena<LeafNode<K, R>>,
    pub(crate) branch_arena: NodeArena<BranchNode<K, R>>,

    pub(crate) comparator: C,
    pub(crate) hooks: H,
}

/// Leaf node holding keys and their records.
#[derive(Debug, Clone)]
pub struct LeafNode<K, R> {
    /// Sorted keys.
    pub(crate) keys: Vec<K>,
    /// Records parallel to `keys`.
    pub(crate) records: Vec<R>,
    /// Right sibling in the leaf chain.
    pub(crate) next: NodeId,
    /// Left sibling in the leaf chain.
    pub(crate) prev: NodeId,
}

/// Internal node holding separator keys and child references.
#[derive(Debug, Clone)]
pub struct BranchNode<K, R> {
    /// Sorted separator keys.
    pub(crate) keys: Vec<K>,
    /// Always one more child than keys.
    pub(crate) children: Vec<NodeRef<K, R>>,
}

// ============================================================================
// ENUMS AND RESULT TYPES
// ============================================================================

/// Node reference that can be either a leaf or branch node
#[derive(Debug, PartialEq, Eq)]
pub enum NodeRef<K, R> {
    Leaf(NodeId, PhantomData<(K, R)>),
    Branch(NodeId, PhantomData<(K, R)>),
}

impl<K, R> Clone for NodeRef<K, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, R> Copy for NodeRef<K, R> {}

impl<K, R> NodeRef<K, R> {
    pub fn leaf(id: NodeId) -> Self {
        NodeRef::Leaf(id, PhantomData)
    }

    pub fn branch(id: NodeId) -> Self {
        NodeRef::Branch(id, PhantomData)
    }

    /// Return the raw node ID.
    pub fn id(&self) -> NodeId {
        match *self {
            NodeRef::Leaf(id, _) => id,
            NodeRef::Branch(id, _) => id,
        }
    }

    /// Returns true if this reference points to a leaf node.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeRef::Leaf(_, _))
    }
}
