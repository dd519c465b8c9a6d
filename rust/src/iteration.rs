//! Iterator implementations for BPlusIndex.
//!
//! All iteration walks the leaf chain from `first_leaf` (or back from
//! `last_leaf`), so a full ordered scan never revisits internal nodes.

use std::iter::FusedIterator;

use crate::arena::NodeArena;
use crate::compare::ReleaseHooks;
use crate::types::{BPlusIndex, LeafNode};

// ============================================================================
// ITERATOR STRUCTS
// ============================================================================

/// Iterator over key-record pairs in ascending key order.
pub struct ItemIterator<'a, K, R> {
    leaves: &'a NodeArena<LeafNode<K, R>>,
    front_leaf: Option<&'a LeafNode<K, R>>,
    front_index: usize,
    back_leaf: Option<&'a LeafNode<K, R>>,
    /// One past the next entry to yield from the back.
    back_index: usize,
    remaining: usize,
}

/// Iterator over keys in ascending order.
pub struct KeyIterator<'a, K, R> {
    items: ItemIterator<'a, K, R>,
}

/// Iterator over records in key order.
pub struct ValueIterator<'a, K, R> {
    items: ItemIterator<'a, K, R>,
}

// ============================================================================
// BPLUSINDEX ITERATOR METHODS
// ============================================================================

impl<K, R, C, H: ReleaseHooks<K, R>> BPlusIndex<K, R, C, H> {
    /// Ordered full scan: every `(key, record)` pair in ascending key order.
    ///
    /// The scan is lazy and restartable, and may run alongside lookups.
    ///
    /// # Examples
    ///
    /// ```
    /// use parking_index::BPlusIndex;
    ///
    /// let mut index = BPlusIndex::new(3).unwrap();
    /// for k in [30, 10, 20] {
    ///     index.insert(k, k * 2).unwrap();
    /// }
    /// let items: Vec<_> = index.items().collect();
    /// assert_eq!(items, [(&10, &20), (&20, &40), (&30, &60)]);
    /// ```
    pub fn items(&self) -> ItemIterator<'_, K, R> {
        ItemIterator::new(self)
    }

    /// Same as [`items`](Self::items).
    pub fn iter(&self) -> ItemIterator<'_, K, R> {
        self.items()
    }

    /// Returns an iterator over all keys in sorted order.
    pub fn keys(&self) -> KeyIterator<'_, K, R> {
        KeyIterator {
            items: self.items(),
        }
    }

    /// Returns an iterator over all records in key order.
    pub fn values(&self) -> ValueIterator<'_, K, R> {
        ValueIterator {
            items: self.items(),
        }
    }
}

impl<'a, K, R, C, H: ReleaseHooks<K, R>> IntoIterator for &'a BPlusIndex<K, R, C, H> {
    type Item = (&'a K, &'a R);
    type IntoIter = ItemIterator<'a, K, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.items()
    }
}

// ============================================================================
// ITEMITERATOR IMPLEMENTATION
// ============================================================================

impl<'a, K, R> ItemIterator<'a, K, R> {
    pub fn new<C, H: ReleaseHooks<K, R>>(index: &'a BPlusIndex<K, R, C, H>) -> Self {
        let leaves = &index.leaf_arena;
        let back_leaf = leaves.get(index.last_leaf);
        Self {
            leaves,
            front_leaf: leaves.get(index.first_leaf),
            front_index: 0,
            back_leaf,
            back_index: back_leaf.map_or(0, LeafNode::len),
            remaining: index.len,
        }
    }
}

impl<'a, K, R> Iterator for ItemIterator<'a, K, R> {
    type Item = (&'a K, &'a R);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            let leaf = self.front_leaf?;
            if let Some(entry) = leaf.entry(self.front_index) {
                self.front_index += 1;
                self.remaining -= 1;
                return Some(entry);
            }
            // Only arena access during a scan: one per leaf boundary.
            self.front_leaf = self.leaves.get(leaf.next);
            self.front_index = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, R> DoubleEndedIterator for ItemIterator<'a, K, R> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            let leaf = self.back_leaf?;
            if self.back_index > 0 {
                self.back_index -= 1;
                let entry = leaf.entry(self.back_index)?;
                self.remaining -= 1;
                return Some(entry);
            }
            self.back_leaf = self.leaves.get(leaf.prev);
            self.back_index = self.back_leaf.map_or(0, LeafNode::len);
        }
    }
}

impl<'a, K, R> ExactSizeIterator for ItemIterator<'a, K, R> {}

impl<'a, K, R> FusedIterator for ItemIterator<'a, K, R> {}

// ============================================================================
// KEY AND VALUE ADAPTORS
// ============================================================================

impl<'a, K, R> Iterator for KeyIterator<'a, K, R> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<'a, K, R> DoubleEndedIterator for KeyIterator<'a, K, R> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.items.next_back().map(|(k, _)| k)
    }
}

impl<'a, K, R> ExactSizeIterator for KeyIterator<'a, K, R> {}

impl<'a, K, R> Iterator for ValueIterator<'a, K, R> {
    type Item = &'a R;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<'a, K, R> DoubleEndedIterator for ValueIterator<'a, K, R> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.items.next_back().map(|(_, v)| v)
    }
}

impl<'a, K, R> ExactSizeIterator for ValueIterator<'a, K, R> {}
