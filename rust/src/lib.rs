//! Insert-optimized B+ tree index for a smart-parking system.
//!
//! [`BPlusIndex`] maps ordered keys to owned, mutable records. Nodes are
//! split on overflow and separators propagate upward along the recorded
//! descent path; leaves form a doubly linked chain, so an ordered scan is
//! independent of tree height. There is no removal: entries live until the
//! whole index is torn down.
//!
//! The [`parking`] module builds the parking lot on top of two indexes,
//! vehicles keyed by registration number and spaces keyed by id, using only
//! insert, point lookup, and ordered scan.
//!
//! ```
//! use parking_index::BPlusIndex;
//!
//! let mut spaces = BPlusIndex::new(3).unwrap();
//! for id in (1..=50).rev() {
//!     spaces.insert(id, format!("space {}", id)).unwrap();
//! }
//! let first_free_above_20 = spaces
//!     .items()
//!     .skip_while(|(id, _)| **id < 21)
//!     .map(|(id, _)| *id)
//!     .next();
//! assert_eq!(first_free_above_20, Some(21));
//! ```

mod arena;
mod compare;
mod construction;
mod error;
mod get_operations;
mod insert_operations;
mod iteration;
mod node;
mod teardown;
mod tree_structure;
mod types;
mod validation;

pub mod parking;

pub use arena::{ArenaStats, NodeArena};
pub use compare::{CompareFn, DropRelease, KeyComparator, NaturalOrder, ReleaseFns, ReleaseHooks};
pub use construction::{sizing, IndexConfig, DEFAULT_BRANCHING_FACTOR};
pub use error::{
    IndexError, IndexResult, IndexResultExt, InitResult, KeyResult, ModifyResult,
};
pub use iteration::{ItemIterator, KeyIterator, ValueIterator};
pub use teardown::TeardownStats;
pub use types::{BPlusIndex, BranchNode, LeafNode, NodeId, NodeRef, NULL_NODE};
