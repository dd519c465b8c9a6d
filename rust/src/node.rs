//! Node implementations for BPlusIndex.
//!
//! Leaf and branch operations used by search and insertion: positional
//! search through the comparator, sorted insertion, and the two split shapes.
//! None of these allocate; callers pre-size node buffers through `try_new`.

use crate::compare::KeyComparator;
use crate::types::{BranchNode, LeafNode, NodeRef};

// ============================================================================
// LEAF NODE IMPLEMENTATION
// ============================================================================

impl<K, R> LeafNode<K, R> {
    /// Returns the number of entries in this leaf.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// A full leaf splits on its next insert.
    pub fn is_full(&self, branching_factor: usize) -> bool {
        self.keys.len() >= 2 * branching_factor - 1
    }

    /// Binary search for `key`: `Ok(i)` if present at `i`, otherwise
    /// `Err(i)` with the sorted insertion position.
    pub fn search_position<C: KeyComparator<K>>(
        &self,
        key: &K,
        comparator: &C,
    ) -> Result<usize, usize> {
        self.keys
            .binary_search_by(|probe| comparator.compare(probe, key))
    }

    pub fn get<C: KeyComparator<K>>(&self, key: &K, comparator: &C) -> Option<&R> {
        self.search_position(key, comparator)
            .ok()
            .and_then(|index| self.records.get(index))
    }

    pub fn get_mut<C: KeyComparator<K>>(&mut self, key: &K, comparator: &C) -> Option<&mut R> {
        let index = self.search_position(key, comparator).ok()?;
        self.records.get_mut(index)
    }

    /// Entry at `index`, if any.
    pub fn entry(&self, index: usize) -> Option<(&K, &R)> {
        self.keys.get(index).zip(self.records.get(index))
    }

    pub fn first_key(&self) -> Option<&K> {
        self.keys.first()
    }

    pub fn last_key(&self) -> Option<&K> {
        self.keys.last()
    }

    /// Insert an entry at a position found by `search_position`.
    pub fn insert_at(&mut self, index: usize, key: K, record: R) {
        self.keys.insert(index, key);
        self.records.insert(index, record);
    }

    /// Move the upper half of an overfull leaf into the empty `right`.
    ///
    /// The leaf holds `2t` entries; the first `t` stay and the last `t` move.
    /// Sibling links are left to the caller.
    pub fn split_into(&mut self, right: &mut LeafNode<K, R>, branching_factor: usize) {
        let mid = branching_factor.min(self.keys.len());
        right.keys.extend(self.keys.drain(mid..));
        right.records.extend(self.records.drain(mid..));
    }
}

// ============================================================================
// BRANCH NODE IMPLEMENTATION
// ============================================================================

impl<K, R> BranchNode<K, R> {
    /// Number of separator keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// A full branch splits when it receives another separator.
    pub fn is_full(&self, branching_factor: usize) -> bool {
        self.keys.len() >= 2 * branching_factor - 1
    }

    /// Index of the child whose subtree may contain `key`.
    ///
    /// Keys equal to a separator route right, since a separator is the first
    /// key of its right subtree.
    pub fn find_child_index<C: KeyComparator<K>>(&self, key: &K, comparator: &C) -> usize {
        match self
            .keys
            .binary_search_by(|probe| comparator.compare(probe, key))
        {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }

    pub fn child(&self, index: usize) -> Option<NodeRef<K, R>> {
        self.children.get(index).copied()
    }

    /// Record that the child at `child_index` split: `separator` goes into
    /// the matching key slot and `right` immediately after the original child.
    pub fn insert_child(&mut self, child_index: usize, separator: K, right: NodeRef<K, R>) {
        self.keys.insert(child_index, separator);
        self.children.insert(child_index + 1, right);
    }

    /// Split an overfull branch into the empty `right`, returning the median.
    ///
    /// With `2t` keys and `2t + 1` children, the key at `t - 1` is removed
    /// and returned; `t - 1` keys and `t` children stay, `t` keys and
    /// `t + 1` children move.
    pub fn split_into(&mut self, right: &mut BranchNode<K, R>, branching_factor: usize) -> Option<K> {
        if self.keys.len() < branching_factor || self.children.len() < branching_factor + 1 {
            return None;
        }
        right.keys.extend(self.keys.drain(branching_factor..));
        right.children.extend(self.children.drain(branching_factor..));
        self.keys.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{CompareFn, NaturalOrder};
    use crate::types::NULL_NODE;

    fn leaf_with(keys: &[i32]) -> LeafNode<i32, String> {
        let mut leaf = LeafNode::try_new(3).unwrap();
        for &k in keys {
            leaf.keys.push(k);
            leaf.records.push(format!("r{}", k));
        }
        leaf
    }

    #[test]
    fn test_leaf_search_and_insert_keep_order() {
        let mut leaf = leaf_with(&[10, 20, 30]);
        let index = leaf.search_position(&25, &NaturalOrder).unwrap_err();
        assert_eq!(index, 2);
        leaf.insert_at(index, 25, "r25".into());
        assert_eq!(leaf.keys, vec![10, 20, 25, 30]);
        assert_eq!(leaf.get(&25, &NaturalOrder).map(String::as_str), Some("r25"));
        assert_eq!(leaf.search_position(&10, &NaturalOrder), Ok(0));
        assert!(leaf.get(&11, &NaturalOrder).is_none());
    }

    #[test]
    fn test_leaf_get_mut_changes_record() {
        let mut leaf = leaf_with(&[1, 2]);
        leaf.get_mut(&2, &NaturalOrder).unwrap().push('!');
        assert_eq!(leaf.entry(1), Some((&2, &"r2!".to_string())));
        assert_eq!(leaf.entry(5), None);
    }

    #[test]
    fn test_leaf_full_at_two_t_minus_one() {
        let leaf = leaf_with(&[1, 2, 3, 4]);
        assert!(!leaf.is_full(3));
        let leaf = leaf_with(&[1, 2, 3, 4, 5]);
        assert!(leaf.is_full(3));
    }

    #[test]
    fn test_leaf_split_keeps_first_t() {
        let mut left = leaf_with(&[5, 6, 10, 12, 20, 30]);
        let mut right = LeafNode::try_new(3).unwrap();
        left.split_into(&mut right, 3);

        assert_eq!(left.keys, vec![5, 6, 10]);
        assert_eq!(right.keys, vec![12, 20, 30]);
        assert_eq!(right.records[0], "r12");
        assert_eq!(right.next, NULL_NODE);
        assert_eq!(left.last_key(), Some(&10));
        assert_eq!(right.first_key(), Some(&12));
    }

    #[test]
    fn test_leaf_search_uses_comparator() {
        let leaf = {
            let mut leaf: LeafNode<i32, ()> = LeafNode::try_new(2).unwrap();
            leaf.keys = vec![9, 5, 1];
            leaf.records = vec![(), (), ()];
            leaf
        };
        let descending = CompareFn(|a: &i32, b: &i32| b.cmp(a));
        assert_eq!(leaf.search_position(&5, &descending), Ok(1));
        assert_eq!(leaf.search_position(&7, &descending), Err(1));
    }

    fn branch_with(keys: &[i32]) -> BranchNode<i32, String> {
        let mut branch = BranchNode::try_new(3).unwrap();
        branch.keys.extend_from_slice(keys);
        for id in 0..=keys.len() as u32 {
            branch.children.push(NodeRef::leaf(id));
        }
        branch
    }

    #[test]
    fn test_find_child_index_routes_equal_keys_right() {
        let branch = branch_with(&[10, 20]);
        assert_eq!(branch.find_child_index(&5, &NaturalOrder), 0);
        assert_eq!(branch.find_child_index(&10, &NaturalOrder), 1);
        assert_eq!(branch.find_child_index(&15, &NaturalOrder), 1);
        assert_eq!(branch.find_child_index(&20, &NaturalOrder), 2);
        assert_eq!(branch.find_child_index(&99, &NaturalOrder), 2);
    }

    #[test]
    fn test_insert_child_places_right_sibling_after_origin() {
        let mut branch = branch_with(&[10, 20]);
        branch.insert_child(1, 15, NodeRef::leaf(42));
        assert_eq!(branch.keys, vec![10, 15, 20]);
        let ids: Vec<u32> = branch.children.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![0, 1, 42, 2]);
    }

    #[test]
    fn test_branch_split_promotes_median() {
        // 2t = 6 keys, 7 children
        let mut left = branch_with(&[10, 20, 30, 40, 50, 60]);
        let mut right = BranchNode::try_new(3).unwrap();
        let median = left.split_into(&mut right, 3);

        assert_eq!(median, Some(30));
        assert_eq!(left.keys, vec![10, 20]);
        assert_eq!(left.children.len(), 3);
        assert_eq!(right.keys, vec![40, 50, 60]);
        let ids: Vec<u32> = right.children.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_branch_split_refuses_short_node() {
        let mut left = branch_with(&[10]);
        let mut right = BranchNode::try_new(3).unwrap();
        assert_eq!(left.split_into(&mut right, 3), None);
        assert_eq!(left.keys, vec![10]);
        assert!(right.is_empty());
    }
}
