//! Tree structure queries for BPlusIndex.
//!
//! Size, shape, and boundary-entry queries that do not depend on key order.

use crate::arena::ArenaStats;
use crate::compare::ReleaseHooks;
use crate::types::{BPlusIndex, NodeRef};

impl<K, R, C, H: ReleaseHooks<K, R>> BPlusIndex<K, R, C, H> {
    /// Returns the number of records in the index.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the index holds no records.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Levels from root to leaf; 1 while the root is a leaf.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn branching_factor(&self) -> usize {
        self.branching_factor
    }

    /// Returns true if the root is a leaf node.
    pub fn is_leaf_root(&self) -> bool {
        self.root.is_leaf()
    }

    /// Returns the number of leaf nodes in the index.
    pub fn leaf_count(&self) -> usize {
        self.leaf_arena.len()
    }

    /// Returns the number of internal nodes in the index.
    pub fn branch_count(&self) -> usize {
        self.branch_arena.len()
    }

    /// Total nodes allocated, the quantity a node limit caps.
    pub fn node_count(&self) -> usize {
        self.leaf_arena.len() + self.branch_arena.len()
    }

    /// Number of separator copies held by internal nodes.
    pub fn separator_count(&self) -> usize {
        self.branch_arena.iter().map(|branch| branch.keys.len()).sum()
    }

    /// Count the leaf and branch nodes reachable from the root.
    pub fn count_nodes_in_tree(&self) -> (usize, usize) {
        let mut counts = (0, 0);
        self.count_nodes_recursive(&self.root, &mut counts);
        counts
    }

    fn count_nodes_recursive(&self, node: &NodeRef<K, R>, counts: &mut (usize, usize)) {
        match node {
            NodeRef::Leaf(..) => counts.0 += 1,
            NodeRef::Branch(id, _) => {
                counts.1 += 1;
                if let Some(branch) = self.get_branch(*id) {
                    for child in &branch.children {
                        self.count_nodes_recursive(child, counts);
                    }
                }
            }
        }
    }

    /// Entry with the smallest key.
    pub fn first(&self) -> Option<(&K, &R)> {
        self.get_leaf(self.first_leaf)?.entry(0)
    }

    /// Entry with the largest key.
    pub fn last(&self) -> Option<(&K, &R)> {
        let leaf = self.get_leaf(self.last_leaf)?;
        leaf.entry(leaf.len().checked_sub(1)?)
    }

    pub fn leaf_arena_stats(&self) -> ArenaStats {
        self.leaf_arena.stats()
    }

    pub fn branch_arena_stats(&self) -> ArenaStats {
        self.branch_arena.stats()
    }
}
