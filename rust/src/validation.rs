//! Validation and debugging utilities for BPlusIndex.
//!
//! This module contains the invariant checker used by tests and diagnostics.
//! It walks the whole tree, so it is O(n) and not meant for hot paths.

use std::cmp::Ordering;

use crate::compare::{KeyComparator, ReleaseHooks};
use crate::error::{IndexError, IndexResult, TreeResult};
use crate::types::{BPlusIndex, NodeId, NodeRef, NULL_NODE};

// ============================================================================
// VALIDATION METHODS
// ============================================================================

impl<K, R, C, H> BPlusIndex<K, R, C, H>
where
    C: KeyComparator<K>,
    H: ReleaseHooks<K, R>,
{
    /// Check if the index maintains its structural invariants.
    pub fn check_invariants(&self) -> bool {
        self.check_invariants_detailed().is_ok()
    }

    /// Check invariants, reporting the first violation found.
    ///
    /// Verified: equal leaf depth, one more child than keys in every branch,
    /// node occupancy bounds, key order and separator bounds, separators
    /// equal to the first key of the subtree to their right, a complete and
    /// consistent doubly linked leaf chain, and arena/tree agreement.
    pub fn check_invariants_detailed(&self) -> IndexResult<()> {
        let mut leaves_in_order = Vec::new();
        self.check_node(self.root, None, None, 1, &mut leaves_in_order)?;
        self.check_leaf_chain(&leaves_in_order)?;
        self.check_scan_order()?;
        self.check_arena_tree_consistency()
    }

    /// Recursively check a subtree whose keys must lie in `[lower, upper)`.
    /// Returns the smallest key in the subtree.
    fn check_node<'a>(
        &'a self,
        node: NodeRef<K, R>,
        lower: Option<&K>,
        upper: Option<&K>,
        depth: usize,
        leaves: &mut Vec<NodeId>,
    ) -> TreeResult<Option<&'a K>> {
        let is_root = depth == 1;
        let max_keys = 2 * self.branching_factor - 1;
        let min_keys = self.branching_factor - 1;

        match node {
            NodeRef::Leaf(id, _) => {
                let component = format!("Leaf {}", id);
                let leaf = self.leaf_node(id)?;
                if depth != self.height {
                    return Err(IndexError::structural_corruption(
                        &component,
                        &format!("at depth {} in a tree of height {}", depth, self.height),
                    ));
                }
                if leaf.keys.len() != leaf.records.len() {
                    return Err(IndexError::structural_corruption(
                        &component,
                        &format!("{} keys but {} records", leaf.keys.len(), leaf.records.len()),
                    ));
                }
                self.check_occupancy(&component, leaf.len(), is_root, min_keys, max_keys)?;
                self.check_sorted_within(&component, &leaf.keys, lower, upper)?;
                leaves.push(id);
                Ok(leaf.first_key())
            }
            NodeRef::Branch(id, _) => {
                let component = format!("Branch {}", id);
                let branch = self.branch_node(id)?;
                if depth >= self.height {
                    return Err(IndexError::structural_corruption(
                        &component,
                        &format!("at leaf depth {}", depth),
                    ));
                }
                if branch.children.len() != branch.keys.len() + 1 {
                    return Err(IndexError::structural_corruption(
                        &component,
                        &format!(
                            "{} keys but {} children",
                            branch.keys.len(),
                            branch.children.len()
                        ),
                    ));
                }
                if is_root && branch.keys.is_empty() {
                    return Err(IndexError::structural_corruption(&component, "empty root branch"));
                }
                self.check_occupancy(&component, branch.len(), is_root, min_keys, max_keys)?;
                self.check_sorted_within(&component, &branch.keys, lower, upper)?;

                let mut subtree_min = None;
                for (i, child) in branch.children.iter().enumerate() {
                    let child_lower = if i == 0 { lower } else { branch.keys.get(i - 1) };
                    let child_upper = branch.keys.get(i).or(upper);
                    let child_min =
                        self.check_node(*child, child_lower, child_upper, depth + 1, leaves)?;
                    if i == 0 {
                        subtree_min = child_min;
                    } else if let (Some(separator), Some(first)) = (child_lower, child_min) {
                        if self.comparator.compare(separator, first) != Ordering::Equal {
                            return Err(IndexError::structural_corruption(
                                &component,
                                &format!("separator {} is not the first key of child {}", i - 1, i),
                            ));
                        }
                    }
                }
                Ok(subtree_min)
            }
        }
    }

    fn check_occupancy(
        &self,
        component: &str,
        len: usize,
        is_root: bool,
        min_keys: usize,
        max_keys: usize,
    ) -> TreeResult<()> {
        if len > max_keys || (!is_root && len < min_keys) {
            return Err(IndexError::structural_corruption(
                component,
                &format!("{} keys outside {}..={}", len, min_keys, max_keys),
            ));
        }
        Ok(())
    }

    fn check_sorted_within(
        &self,
        component: &str,
        keys: &[K],
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> TreeResult<()> {
        let cmp = &self.comparator;
        if let Some(i) = keys
            .windows(2)
            .position(|pair| cmp.compare(&pair[0], &pair[1]) != Ordering::Less)
        {
            return Err(IndexError::structural_corruption(
                component,
                &format!("keys {} and {} out of order", i, i + 1),
            ));
        }
        if let (Some(lower), Some(first)) = (lower, keys.first()) {
            if cmp.compare(first, lower) == Ordering::Less {
                return Err(IndexError::structural_corruption(component, "key below lower bound"));
            }
        }
        if let (Some(upper), Some(last)) = (upper, keys.last()) {
            if cmp.compare(last, upper) != Ordering::Less {
                return Err(IndexError::structural_corruption(component, "key at or above upper bound"));
            }
        }
        Ok(())
    }

    /// Check that the leaf chain visits exactly the tree's leaves, left to
    /// right, with consistent back links and the right entry count.
    fn check_leaf_chain(&self, expected: &[NodeId]) -> TreeResult<()> {
        let mut chain = Vec::with_capacity(expected.len());
        let mut entries = 0;
        let mut prev = NULL_NODE;
        let mut current = self.first_leaf;
        while current != NULL_NODE {
            if chain.len() > self.leaf_arena.len() {
                return Err(IndexError::structural_corruption("Leaf chain", "cycle detected"));
            }
            let leaf = self.leaf_node(current)?;
            if leaf.prev != prev {
                return Err(IndexError::structural_corruption(
                    "Leaf chain",
                    &format!("leaf {} points back to {} instead of {}", current, leaf.prev, prev),
                ));
            }
            entries += leaf.len();
            chain.push(current);
            prev = current;
            current = leaf.next;
        }

        if prev != self.last_leaf {
            return Err(IndexError::structural_corruption(
                "Leaf chain",
                &format!("ends at {} but last leaf is {}", prev, self.last_leaf),
            ));
        }
        if chain != expected {
            return Err(IndexError::structural_corruption(
                "Leaf chain",
                &format!("tree has {:?}, linked list has {:?}", expected, chain),
            ));
        }
        if entries != self.len {
            return Err(IndexError::structural_corruption(
                "Leaf chain",
                &format!("{} entries but index length is {}", entries, self.len),
            ));
        }
        Ok(())
    }

    fn check_scan_order(&self) -> TreeResult<()> {
        let mut previous: Option<&K> = None;
        let mut count = 0;
        for (key, _) in self.items() {
            if let Some(previous) = previous {
                if self.comparator.compare(previous, key) != Ordering::Less {
                    return Err(IndexError::structural_corruption(
                        "Ordered scan",
                        &format!("unsorted keys at position {}", count),
                    ));
                }
            }
            previous = Some(key);
            count += 1;
        }
        if count != self.len {
            return Err(IndexError::structural_corruption(
                "Ordered scan",
                &format!("yielded {} entries but index length is {}", count, self.len),
            ));
        }
        Ok(())
    }

    fn check_arena_tree_consistency(&self) -> TreeResult<()> {
        let (tree_leaves, tree_branches) = self.count_nodes_in_tree();
        if tree_leaves != self.leaf_arena.len() || tree_branches != self.branch_arena.len() {
            return Err(IndexError::structural_corruption(
                "Arena",
                &format!(
                    "tree reaches {} leaves and {} branches, arenas hold {} and {}",
                    tree_leaves,
                    tree_branches,
                    self.leaf_arena.len(),
                    self.branch_arena.len()
                ),
            ));
        }
        Ok(())
    }

    /// Entry counts of each leaf, in chain order.
    pub fn leaf_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::new();
        let mut current = self.first_leaf;
        while let Some(leaf) = self.get_leaf(current) {
            sizes.push(leaf.len());
            current = leaf.next;
            if sizes.len() > self.leaf_arena.len() {
                break;
            }
        }
        sizes
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{BPlusIndex, NodeRef, NULL_NODE};

    fn scenario_index() -> BPlusIndex<i32, i32> {
        let mut index = BPlusIndex::new(3).unwrap();
        for k in [10, 20, 5, 6, 12, 30, 7, 17] {
            index.insert(k, k).unwrap();
        }
        index
    }

    fn root_branch_id(index: &BPlusIndex<i32, i32>) -> u32 {
        match index.root {
            NodeRef::Branch(id, _) => id,
            NodeRef::Leaf(..) => panic!("expected a branch root"),
        }
    }

    #[test]
    fn test_valid_trees_pass() {
        assert!(scenario_index().check_invariants());
        assert!(BPlusIndex::<i32, i32>::new(2).unwrap().check_invariants());
        assert_eq!(scenario_index().leaf_sizes(), vec![4, 4]);
    }

    #[test]
    fn test_wrong_separator_detected() {
        let mut index = scenario_index();
        let root = root_branch_id(&index);
        index.branch_arena.get_mut(root).unwrap().keys[0] = 11;
        let err = index.check_invariants_detailed().unwrap_err();
        assert!(err.is_corruption());
        assert!(err.to_string().contains("separator"));
    }

    #[test]
    fn test_broken_back_link_detected() {
        let mut index = scenario_index();
        let last = index.last_leaf;
        index.leaf_arena.get_mut(last).unwrap().prev = NULL_NODE;
        assert!(!index.check_invariants());
    }

    #[test]
    fn test_unsorted_leaf_detected() {
        let mut index = scenario_index();
        let first = index.first_leaf;
        index.leaf_arena.get_mut(first).unwrap().keys.swap(0, 1);
        let err = index.check_invariants_detailed().unwrap_err();
        assert!(err.to_string().contains("out of order"));
    }

    #[test]
    fn test_length_mismatch_detected() {
        let mut index = scenario_index();
        index.len += 1;
        assert!(!index.check_invariants());
    }

    #[test]
    fn test_underfull_leaf_detected() {
        let mut index = scenario_index();
        let first = index.first_leaf;
        let leaf = index.leaf_arena.get_mut(first).unwrap();
        leaf.keys.truncate(1);
        leaf.records.truncate(1);
        index.len -= 3;
        let err = index.check_invariants_detailed().unwrap_err();
        assert!(err.to_string().contains("outside"));
    }
}
