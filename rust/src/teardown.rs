//! Whole-tree teardown.
//!
//! Every node, key, and record is handed to the release strategy exactly
//! once. Teardown runs from [`BPlusIndex::destroy`] or, failing that, from
//! `Drop`.

use crate::compare::ReleaseHooks;
use crate::types::{BPlusIndex, BranchNode, LeafNode, NodeRef, NULL_NODE};

/// What a teardown released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownStats {
    pub leaves: usize,
    pub branches: usize,
    /// Leaf keys plus separator copies.
    pub keys: usize,
    pub records: usize,
}

impl<K, R, C, H: ReleaseHooks<K, R>> BPlusIndex<K, R, C, H> {
    /// Release every node, key, and record, consuming the index.
    ///
    /// # Examples
    ///
    /// ```
    /// use parking_index::BPlusIndex;
    ///
    /// let mut index = BPlusIndex::new(2).unwrap();
    /// for k in 0..4 {
    ///     index.insert(k, k).unwrap();
    /// }
    /// let stats = index.destroy();
    /// assert_eq!(stats.records, 4);
    /// assert_eq!(stats.leaves, 2);
    /// assert_eq!(stats.branches, 1);
    /// ```
    pub fn destroy(mut self) -> TeardownStats {
        self.release_all()
    }

    /// Walk from the root releasing each node's contents, then sweep any
    /// nodes the walk could not reach. Idempotent: an already released index
    /// has empty arenas and releases nothing.
    pub(crate) fn release_all(&mut self) -> TeardownStats {
        let mut stats = TeardownStats::default();
        if self.leaf_arena.is_empty() && self.branch_arena.is_empty() {
            return stats;
        }

        let mut leaves = self.leaf_arena.take_slots();
        let mut branches = self.branch_arena.take_slots();
        Self::release_subtree(
            self.root,
            &mut leaves,
            &mut branches,
            &mut self.hooks,
            &mut stats,
        );

        let unreachable = leaves.iter().flatten().count() + branches.iter().flatten().count();
        if unreachable > 0 {
            tracing::warn!(unreachable, "releasing nodes detached from the root");
        }
        for leaf in leaves.into_iter().flatten() {
            Self::release_leaf(leaf, &mut self.hooks, &mut stats);
        }
        for branch in branches.into_iter().flatten() {
            Self::release_branch_keys(branch, &mut self.hooks, &mut stats);
        }

        self.len = 0;
        self.first_leaf = NULL_NODE;
        self.last_leaf = NULL_NODE;
        stats
    }

    fn release_subtree(
        node: NodeRef<K, R>,
        leaves: &mut [Option<LeafNode<K, R>>],
        branches: &mut [Option<BranchNode<K, R>>],
        hooks: &mut H,
        stats: &mut TeardownStats,
    ) {
        match node {
            NodeRef::Leaf(id, _) => {
                if let Some(leaf) = leaves.get_mut(id as usize).and_then(Option::take) {
                    Self::release_leaf(leaf, hooks, stats);
                }
            }
            NodeRef::Branch(id, _) => {
                if let Some(branch) = branches.get_mut(id as usize).and_then(Option::take) {
                    let children = Self::release_branch_keys(branch, hooks, stats);
                    for child in children {
                        Self::release_subtree(child, leaves, branches, hooks, stats);
                    }
                }
            }
        }
    }

    fn release_leaf(leaf: LeafNode<K, R>, hooks: &mut H, stats: &mut TeardownStats) {
        for (key, record) in leaf.keys.into_iter().zip(leaf.records) {
            hooks.release_key(key);
            hooks.release_record(record);
            stats.keys += 1;
            stats.records += 1;
        }
        stats.leaves += 1;
    }

    /// Release a branch's separators and hand back its children.
    fn release_branch_keys(
        branch: BranchNode<K, R>,
        hooks: &mut H,
        stats: &mut TeardownStats,
    ) -> Vec<NodeRef<K, R>> {
        for key in branch.keys {
            hooks.release_key(key);
            stats.keys += 1;
        }
        stats.branches += 1;
        branch.children
    }
}

impl<K, R, C, H> Drop for BPlusIndex<K, R, C, H>
where
    H: ReleaseHooks<K, R>,
{
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::TeardownStats;
    use crate::compare::{NaturalOrder, ReleaseFns, ReleaseHooks};
    use crate::types::{BPlusIndex, NodeRef};

    #[derive(Clone, Default)]
    struct CountingRelease {
        keys: Rc<Cell<usize>>,
        records: Rc<Cell<usize>>,
    }

    impl<K, R> ReleaseHooks<K, R> for CountingRelease {
        fn release_key(&mut self, _key: K) {
            self.keys.set(self.keys.get() + 1);
        }

        fn release_record(&mut self, _record: R) {
            self.records.set(self.records.get() + 1);
        }
    }

    #[test]
    fn test_destroy_never_populated_index() {
        let hooks = CountingRelease::default();
        let index: BPlusIndex<String, u32, _, _> =
            BPlusIndex::with_strategies(3, NaturalOrder, hooks.clone()).unwrap();
        let stats = index.destroy();
        assert_eq!(stats.leaves, 1);
        assert_eq!(stats.branches, 0);
        assert_eq!(stats.keys, 0);
        assert_eq!(hooks.records.get(), 0);
    }

    #[test]
    fn test_destroy_releases_records_and_separators_once() {
        let hooks = CountingRelease::default();
        let mut index = BPlusIndex::with_strategies(2, NaturalOrder, hooks.clone()).unwrap();
        for k in 0..100 {
            index.insert(k, k.to_string()).unwrap();
        }
        let separators = index.separator_count();
        let leaves = index.leaf_count();
        let branches = index.branch_count();

        let stats = index.destroy();
        assert_eq!(stats.records, 100);
        assert_eq!(stats.keys, 100 + separators);
        assert_eq!(stats.leaves, leaves);
        assert_eq!(stats.branches, branches);
        assert_eq!(hooks.records.get(), 100);
        assert_eq!(hooks.keys.get(), 100 + separators);
    }

    #[test]
    fn test_drop_releases_without_destroy() {
        let hooks = CountingRelease::default();
        {
            let mut index = BPlusIndex::with_strategies(3, NaturalOrder, hooks.clone()).unwrap();
            for k in 0..10 {
                index.insert(k, ()).unwrap();
            }
        }
        assert_eq!(hooks.records.get(), 10);
    }

    #[test]
    fn test_destroy_then_drop_releases_nothing_twice() {
        let hooks = CountingRelease::default();
        let mut index = BPlusIndex::with_strategies(3, NaturalOrder, hooks.clone()).unwrap();
        for k in 0..10 {
            index.insert(k, ()).unwrap();
        }
        index.release_all();
        let after_first = (hooks.keys.get(), hooks.records.get());
        assert_eq!(index.release_all(), TeardownStats::default());
        drop(index);
        assert_eq!((hooks.keys.get(), hooks.records.get()), after_first);
    }

    #[test]
    fn test_release_fns_see_every_record() {
        let released = Rc::new(Cell::new(0u64));
        let sink = Rc::clone(&released);
        let mut index = BPlusIndex::with_strategies(
            3,
            NaturalOrder,
            ReleaseFns::new(|_key: u64| {}, move |record: u64| sink.set(sink.get() + record)),
        )
        .unwrap();
        for k in 1..=20u64 {
            index.insert(k, k).unwrap();
        }
        index.destroy();
        assert_eq!(released.get(), (1..=20).sum::<u64>());
    }

    #[test]
    fn test_detached_nodes_are_still_released() {
        let hooks = CountingRelease::default();
        let mut index = BPlusIndex::with_strategies(2, NaturalOrder, hooks.clone()).unwrap();
        for k in 0..20 {
            index.insert(k, k).unwrap();
        }
        let root_id = match index.root {
            NodeRef::Branch(id, _) => id,
            NodeRef::Leaf(..) => panic!("expected a branch root"),
        };
        index.branch_arena.get_mut(root_id).unwrap().children.pop();

        let stats = index.destroy();
        assert_eq!(stats.records, 20);
        assert_eq!(hooks.records.get(), 20);
    }
}
