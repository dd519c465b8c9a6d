//! Index-addressed node storage.
//!
//! Nodes are never freed individually (the index has no removal), so the
//! arena is a plain append-only `Vec<T>` addressed by `NodeId`. Growth is
//! fallible: callers reserve slots up front and surface allocation failure
//! as an error instead of aborting.

use std::convert::TryFrom;

use crate::error::{IndexError, IndexResult};
use crate::types::{NodeId, NULL_NODE};

/// Statistics for a node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    pub allocated_count: usize,
    pub reserved_capacity: usize,
}

/// Append-only arena of nodes
#[derive(Debug)]
pub struct NodeArena<T> {
    storage: Vec<T>,
}

impl<T> NodeArena<T> {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self {
            storage: Vec::new(),
        }
    }

    /// Make room for `additional` allocations without further reallocation.
    ///
    /// Fails if the id space would be exhausted or the allocator refuses the
    /// request. The arena is unchanged on failure.
    pub fn try_reserve(&mut self, additional: usize) -> IndexResult<()> {
        let needed = self
            .storage
            .len()
            .checked_add(additional)
            .ok_or_else(|| IndexError::allocation_failure("arena slots", "length overflow"))?;
        if needed > NULL_NODE as usize {
            return Err(IndexError::allocation_failure(
                "arena slots",
                &format!("{} nodes exceed the node id space", needed),
            ));
        }
        self.storage
            .try_reserve(additional)
            .map_err(|e| IndexError::allocation_failure("arena slots", &e.to_string()))
    }

    /// Allocate a new item in the arena and return its ID
    #[inline]
    pub fn allocate(&mut self, item: T) -> IndexResult<NodeId> {
        let id = NodeId::try_from(self.storage.len())
            .ok()
            .filter(|id| *id != NULL_NODE)
            .ok_or_else(|| IndexError::allocation_failure("node id", "id space exhausted"))?;
        self.try_reserve(1)?;
        self.storage.push(item);
        Ok(id)
    }

    /// Get a reference to an item in the arena
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        if id == NULL_NODE {
            return None;
        }
        self.storage.get(usize::try_from(id).ok()?)
    }

    /// Get a mutable reference to an item in the arena
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        if id == NULL_NODE {
            return None;
        }
        self.storage.get_mut(usize::try_from(id).ok()?)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Iterate over nodes in allocation order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.storage.iter()
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            allocated_count: self.storage.len(),
            reserved_capacity: self.storage.capacity(),
        }
    }

    /// Move every node out of the arena, leaving it empty.
    ///
    /// Slots are wrapped in `Option` so a walker can take each node exactly once.
    pub(crate) fn take_slots(&mut self) -> Vec<Option<T>> {
        std::mem::take(&mut self.storage)
            .into_iter()
            .map(Some)
            .collect()
    }
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_get() {
        let mut arena = NodeArena::new();
        let a = arena.allocate(42).unwrap();
        let b = arena.allocate(84).unwrap();

        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(arena.get(a), Some(&42));
        assert_eq!(arena.get(b), Some(&84));
        assert!(arena.contains(b));
        assert!(!arena.contains(NULL_NODE));
        assert_eq!(arena.get(7), None);
        assert_eq!(arena.stats().allocated_count, 2);
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut arena = NodeArena::new();
        let id = arena.allocate(String::from("left")).unwrap();
        arena.get_mut(id).unwrap().push_str("-most");
        assert_eq!(arena.get(id).map(String::as_str), Some("left-most"));
        assert!(arena.get_mut(NULL_NODE).is_none());
    }

    #[test]
    fn test_reserve_then_allocate_keeps_capacity() {
        let mut arena: NodeArena<u64> = NodeArena::new();
        arena.try_reserve(3).unwrap();
        let reserved = arena.stats().reserved_capacity;
        assert!(reserved >= 3);
        for i in 0..3 {
            arena.allocate(i).unwrap();
        }
        assert_eq!(arena.stats().reserved_capacity, reserved);
    }

    #[test]
    fn test_reserve_past_id_space_fails() {
        let mut arena: NodeArena<u8> = NodeArena::new();
        let err = arena.try_reserve(NULL_NODE as usize + 1).unwrap_err();
        assert!(err.is_allocation_failure());
        assert!(arena.is_empty());
    }

    #[test]
    fn test_take_slots_empties_arena() {
        let mut arena = NodeArena::new();
        arena.allocate('a').unwrap();
        arena.allocate('b').unwrap();
        let slots = arena.take_slots();
        assert_eq!(slots, vec![Some('a'), Some('b')]);
        assert!(arena.is_empty());
    }
}
