//! GET operations for BPlusIndex.
//!
//! This module contains the read path: root-to-leaf descent, point lookup,
//! and the checked arena accessors the rest of the crate builds on.

use crate::compare::{KeyComparator, ReleaseHooks};
use crate::error::{IndexError, KeyResult, TreeResult};
use crate::types::{BPlusIndex, BranchNode, LeafNode, NodeId, NodeRef};

impl<K, R, C, H> BPlusIndex<K, R, C, H>
where
    C: KeyComparator<K>,
    H: ReleaseHooks<K, R>,
{
    // ============================================================================
    // PUBLIC GET OPERATIONS
    // ============================================================================

    /// Get a reference to the record stored under `key`.
    ///
    /// Returns `None` when the key is absent. Structural corruption met on
    /// the way down is logged at error level and also reported as `None`;
    /// use [`try_get`](Self::try_get) to tell the two apart.
    ///
    /// # Examples
    ///
    /// ```
    /// use parking_index::BPlusIndex;
    ///
    /// let mut index = BPlusIndex::new(3).unwrap();
    /// index.insert(7, "seven").unwrap();
    /// assert_eq!(index.get(&7), Some(&"seven"));
    /// assert_eq!(index.get(&8), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&R> {
        match self.try_get(key) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!("lookup aborted: {e}");
                None
            }
        }
    }

    /// Look up `key`, surfacing structural corruption as an error.
    pub fn try_get(&self, key: &K) -> KeyResult<Option<&R>> {
        let leaf_id = self.find_leaf(key)?;
        let leaf = self.leaf_node(leaf_id)?;
        Ok(leaf.get(key, &self.comparator))
    }

    /// Get a mutable reference to the record stored under `key`.
    ///
    /// Records may be updated in place; keys never change.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut R> {
        let leaf_id = match self.find_leaf(key) {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("mutable lookup aborted: {e}");
                return None;
            }
        };
        let Self {
            leaf_arena,
            comparator,
            ..
        } = self;
        leaf_arena.get_mut(leaf_id)?.get_mut(key, comparator)
    }

    /// Check if key exists in the index.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    // ============================================================================
    // DESCENT
    // ============================================================================

    /// Walk from the root to the leaf responsible for `key`.
    pub(crate) fn find_leaf(&self, key: &K) -> TreeResult<NodeId> {
        self.descend(key, |_, _| {})
    }

    /// Walk from the root to the leaf responsible for `key`, reporting each
    /// branch visited and the child slot taken.
    ///
    /// At each branch the smallest `i` with `key < keys[i]` is taken (`n` if
    /// none). The walk fails with `StructuralCorruption` on a missing node, a
    /// branch whose child count is not one more than its key count, or a
    /// leaf found at a depth other than the tree height.
    pub(crate) fn descend<F>(&self, key: &K, mut visit: F) -> TreeResult<NodeId>
    where
        F: FnMut(NodeId, usize),
    {
        let mut node = self.root;
        let mut depth = 1;
        loop {
            match node {
                NodeRef::Leaf(id, _) => {
                    if depth != self.height {
                        return Err(IndexError::structural_corruption(
                            "Descent",
                            &format!(
                                "leaf {} at depth {} in a tree of height {}",
                                id, depth, self.height
                            ),
                        ));
                    }
                    return Ok(id);
                }
                NodeRef::Branch(id, _) => {
                    if depth >= self.height {
                        return Err(IndexError::structural_corruption(
                            "Descent",
                            &format!("branch {} at leaf depth {}", id, depth),
                        ));
                    }
                    let branch = self.branch_node(id)?;
                    if branch.children.len() != branch.keys.len() + 1 {
                        return Err(IndexError::structural_corruption(
                            &format!("Branch {}", id),
                            &format!(
                                "{} keys but {} children",
                                branch.keys.len(),
                                branch.children.len()
                            ),
                        ));
                    }
                    let index = branch.find_child_index(key, &self.comparator);
                    visit(id, index);
                    node = branch.child(index).ok_or_else(|| {
                        IndexError::structural_corruption(
                            &format!("Branch {}", id),
                            &format!("no child at slot {}", index),
                        )
                    })?;
                    depth += 1;
                }
            }
        }
    }
}

impl<K, R, C, H: ReleaseHooks<K, R>> BPlusIndex<K, R, C, H> {
    // ============================================================================
    // ARENA ACCESS METHODS
    // ============================================================================

    /// Get a reference to a leaf node in the arena.
    pub fn get_leaf(&self, id: NodeId) -> Option<&LeafNode<K, R>> {
        self.leaf_arena.get(id)
    }

    /// Get a reference to a branch node in the arena.
    pub fn get_branch(&self, id: NodeId) -> Option<&BranchNode<K, R>> {
        self.branch_arena.get(id)
    }

    /// Leaf lookup that treats a dangling id as corruption.
    pub(crate) fn leaf_node(&self, id: NodeId) -> TreeResult<&LeafNode<K, R>> {
        self.leaf_arena
            .get(id)
            .ok_or_else(|| IndexError::structural_corruption("Leaf arena", &format!("no leaf {}", id)))
    }

    /// Branch lookup that treats a dangling id as corruption.
    pub(crate) fn branch_node(&self, id: NodeId) -> TreeResult<&BranchNode<K, R>> {
        self.branch_arena.get(id).ok_or_else(|| {
            IndexError::structural_corruption("Branch arena", &format!("no branch {}", id))
        })
    }

    pub(crate) fn leaf_node_mut(&mut self, id: NodeId) -> TreeResult<&mut LeafNode<K, R>> {
        self.leaf_arena
            .get_mut(id)
            .ok_or_else(|| IndexError::structural_corruption("Leaf arena", &format!("no leaf {}", id)))
    }

    pub(crate) fn branch_node_mut(&mut self, id: NodeId) -> TreeResult<&mut BranchNode<K, R>> {
        self.branch_arena.get_mut(id).ok_or_else(|| {
            IndexError::structural_corruption("Branch arena", &format!("no branch {}", id))
        })
    }
}
