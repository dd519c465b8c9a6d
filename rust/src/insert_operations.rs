//! Insert operations for BPlusIndex.
//!
//! Insertion runs in two phases. Planning descends to the target leaf,
//! records the path, rejects duplicates, and sizes the split cascade: one new
//! leaf if the leaf is full, one new branch per full ancestor, and a new root
//! if every ancestor is full. All arena slots and node buffers for that
//! cascade are reserved before anything is touched, so a failure leaves the
//! tree exactly as it was. The apply phase then performs the sorted insert
//! and propagates separators up the recorded path without allocating.

use crate::compare::{KeyComparator, ReleaseHooks};
use crate::error::{IndexError, IndexResultExt, ModifyResult};
use crate::types::{BPlusIndex, BranchNode, LeafNode, NodeId, NodeRef, NULL_NODE};

/// Everything the apply phase needs, gathered before the first mutation.
struct InsertPlan<K, R> {
    /// Branches from the root down, with the child slot taken at each.
    path: Vec<(NodeId, usize)>,
    leaf_id: NodeId,
    position: usize,
    /// Present only when the target leaf must split.
    spare_leaf: Option<LeafNode<K, R>>,
    /// One per branch split, plus one for a new root.
    spare_branches: Vec<BranchNode<K, R>>,
}

impl<K, R, C, H> BPlusIndex<K, R, C, H>
where
    K: Clone,
    C: KeyComparator<K>,
    H: ReleaseHooks<K, R>,
{
    /// Insert a record under a key that is not yet present.
    ///
    /// Returns `DuplicateKey` if the key exists; the stored entry is left
    /// untouched. On any error the given key and record are handed to the
    /// release strategy and the tree is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use parking_index::BPlusIndex;
    ///
    /// let mut index = BPlusIndex::new(3).unwrap();
    /// index.insert("ABC123".to_string(), 1).unwrap();
    /// let err = index.insert("ABC123".to_string(), 2).unwrap_err();
    /// assert!(err.is_duplicate_key());
    /// assert_eq!(index.get(&"ABC123".to_string()), Some(&1));
    /// ```
    pub fn insert(&mut self, key: K, record: R) -> ModifyResult<()> {
        let plan = match self.plan_insert(&key) {
            Ok(plan) => plan,
            Err(e) => {
                if e.is_duplicate_key() {
                    tracing::debug!("rejected duplicate key");
                }
                self.hooks.release_key(key);
                self.hooks.release_record(record);
                return Err(e);
            }
        };
        self.apply_insert(plan, key, record)
            .with_operation("insert")
    }

    fn plan_insert(&mut self, key: &K) -> ModifyResult<InsertPlan<K, R>> {
        let t = self.branching_factor;

        let mut path = Vec::new();
        path.try_reserve_exact(self.height.saturating_sub(1))
            .map_err(|e| IndexError::allocation_failure("descent path", &e.to_string()))?;
        let leaf_id = self
            .descend(key, |id, slot| path.push((id, slot)))
            .with_operation("insert")?;

        let (position, leaf_full) = {
            let leaf = self.leaf_node(leaf_id).with_operation("insert")?;
            match leaf.search_position(key, &self.comparator) {
                Ok(_) => return Err(IndexError::DuplicateKey),
                Err(position) => (position, leaf.is_full(t)),
            }
        };

        if !leaf_full {
            return Ok(InsertPlan {
                path,
                leaf_id,
                position,
                spare_leaf: None,
                spare_branches: Vec::new(),
            });
        }

        let mut branches_needed = 0;
        let mut grows_root = true;
        for &(branch_id, _) in path.iter().rev() {
            if self.branch_node(branch_id)?.is_full(t) {
                branches_needed += 1;
            } else {
                grows_root = false;
                break;
            }
        }
        if grows_root {
            branches_needed += 1;
        }

        self.check_node_limit(1 + branches_needed)?;
        self.leaf_arena.try_reserve(1)?;
        self.branch_arena.try_reserve(branches_needed)?;

        let spare_leaf = LeafNode::try_new(t)?;
        let mut spare_branches = Vec::new();
        spare_branches
            .try_reserve_exact(branches_needed)
            .map_err(|e| IndexError::allocation_failure("split buffers", &e.to_string()))?;
        for _ in 0..branches_needed {
            spare_branches.push(BranchNode::try_new(t)?);
        }

        Ok(InsertPlan {
            path,
            leaf_id,
            position,
            spare_leaf: Some(spare_leaf),
            spare_branches,
        })
    }

    fn check_node_limit(&self, additional: usize) -> ModifyResult<()> {
        let Some(limit) = self.node_limit else {
            return Ok(());
        };
        let current = self.leaf_arena.len() + self.branch_arena.len();
        if current + additional > limit {
            tracing::debug!(current, additional, limit, "node limit reached");
            return Err(IndexError::allocation_failure(
                "index nodes",
                &format!(
                    "{} more nodes would exceed the limit of {}",
                    additional, limit
                ),
            ));
        }
        Ok(())
    }

    fn apply_insert(&mut self, plan: InsertPlan<K, R>, key: K, record: R) -> ModifyResult<()> {
        let InsertPlan {
            mut path,
            leaf_id,
            position,
            spare_leaf,
            mut spare_branches,
        } = plan;
        let t = self.branching_factor;

        let Some(leaf) = self.leaf_arena.get_mut(leaf_id) else {
            self.hooks.release_key(key);
            self.hooks.release_record(record);
            return Err(IndexError::structural_corruption(
                "Leaf arena",
                &format!("no leaf {}", leaf_id),
            ));
        };
        leaf.insert_at(position, key, record);
        self.len += 1;

        let Some(mut right) = spare_leaf else {
            return Ok(());
        };
        leaf.split_into(&mut right, t);
        let separator = right
            .first_key()
            .cloned()
            .ok_or_else(|| IndexError::structural_corruption("Leaf split", "empty right half"))?;
        let old_next = leaf.next;
        right.prev = leaf_id;
        right.next = old_next;

        let right_id = self.leaf_arena.allocate(right)?;
        self.leaf_node_mut(leaf_id)?.next = right_id;
        if old_next == NULL_NODE {
            self.last_leaf = right_id;
        } else {
            self.leaf_node_mut(old_next)?.prev = right_id;
        }
        tracing::trace!(leaf = leaf_id, right = right_id, "leaf split");

        let mut left = NodeRef::leaf(leaf_id);
        let mut promoted = (separator, NodeRef::leaf(right_id));

        while let Some((branch_id, child_index)) = path.pop() {
            let (separator, right) = promoted;
            let branch = self.branch_node_mut(branch_id)?;
            branch.insert_child(child_index, separator, right);
            if branch.keys.len() < 2 * t {
                return Ok(());
            }

            let mut sibling = spare_branches.pop().ok_or_else(|| {
                IndexError::structural_corruption("Branch split", "no reserved sibling")
            })?;
            let median = branch.split_into(&mut sibling, t).ok_or_else(|| {
                IndexError::structural_corruption(
                    &format!("Branch {}", branch_id),
                    "too few keys to split",
                )
            })?;
            let sibling_id = self.branch_arena.allocate(sibling)?;
            tracing::trace!(branch = branch_id, right = sibling_id, "branch split");

            left = NodeRef::branch(branch_id);
            promoted = (median, NodeRef::branch(sibling_id));
        }

        let (separator, right) = promoted;
        let mut root = spare_branches.pop().ok_or_else(|| {
            IndexError::structural_corruption("Root split", "no reserved root")
        })?;
        root.keys.push(separator);
        root.children.push(left);
        root.children.push(right);
        let root_id = self.branch_arena.allocate(root)?;
        self.root = NodeRef::branch(root_id);
        self.height += 1;
        tracing::debug!(height = self.height, "root split");
        Ok(())
    }
}
