//! Bounded FIFO node cache.
//!
//! The reference implementation keeps this cache as process-wide module
//! state (a single `static NodeCache`). Per spec §9 / §5, that is
//! re-architected here as a field owned by [`crate::index::BTreeIndex`] so
//! that multiple indexes can be open in the same process without sharing
//! cached state.

use crate::node::Node;

/// Default number of nodes the cache holds before evicting.
pub const DEFAULT_CAPACITY: usize = 3;

struct Slot {
    block_id: u64,
    node: Node,
    dirty: bool,
}

/// A small, bounded cache of recently accessed nodes.
///
/// Lookup is a linear scan by block id (the capacity is tiny by design).
/// Repeated reads of a cached block are served without touching disk;
/// writes just update the cached copy and mark it dirty, so they are not
/// persisted until the entry is evicted or the cache is drained. On a miss
/// when the cache is full, the oldest entry (slot 0) is evicted — handed
/// back to the caller to flush if dirty — and the rest shift down,
/// giving first-in, first-out eviction.
pub struct NodeCache {
    capacity: usize,
    slots: Vec<Slot>,
}

impl NodeCache {
    /// A cache with [`DEFAULT_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A cache with a caller-chosen capacity (must be at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity >= 1, "node cache capacity must be at least 1");
        Self {
            capacity,
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Look up a cached node by block id.
    pub fn get(&self, block_id: u64) -> Option<&Node> {
        self.slots
            .iter()
            .find(|s| s.block_id == block_id)
            .map(|s| &s.node)
    }

    /// Mark a cached node dirty. No-op if the block is not cached.
    pub fn mark_dirty(&mut self, block_id: u64) {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.block_id == block_id) {
            slot.dirty = true;
        }
    }

    /// Insert or update the cached copy of `block_id`.
    ///
    /// If the block is already cached, its copy is overwritten in place
    /// (the `dirty` flag is OR'd in, never cleared by a plain update).
    /// Otherwise a new slot is appended, evicting the oldest entry first
    /// if the cache is full. Returns the evicted `(block_id, node)` pair
    /// when it was dirty and must be flushed by the caller.
    pub fn put(&mut self, block_id: u64, node: Node, dirty: bool) -> Option<(u64, Node)> {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.block_id == block_id) {
            slot.node = node;
            slot.dirty |= dirty;
            return None;
        }

        let evicted = if self.slots.len() >= self.capacity {
            let victim = self.slots.remove(0);
            victim.dirty.then_some((victim.block_id, victim.node))
        } else {
            None
        };

        self.slots.push(Slot {
            block_id,
            node,
            dirty,
        });

        evicted
    }

    /// Drain all entries, returning the dirty ones that need to be
    /// written back. Resets the cache to empty.
    pub fn drain_dirty(&mut self) -> Vec<(u64, Node)> {
        self.slots
            .drain(..)
            .filter(|s| s.dirty)
            .map(|s| (s.block_id, s.node))
            .collect()
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for NodeCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u64) -> Node {
        Node::new(id)
    }

    #[test]
    fn miss_then_hit() {
        let mut cache = NodeCache::with_capacity(3);
        assert!(cache.get(1).is_none());
        cache.put(1, node(1), false);
        assert!(cache.get(1).is_some());
    }

    #[test]
    fn fifo_eviction_when_full() {
        let mut cache = NodeCache::with_capacity(3);
        cache.put(1, node(1), false);
        cache.put(2, node(2), false);
        cache.put(3, node(3), false);
        assert_eq!(cache.len(), 3);

        // Inserting a 4th evicts block 1 (the oldest).
        let evicted = cache.put(4, node(4), false);
        assert!(evicted.is_none()); // block 1 was never marked dirty
        assert!(cache.get(1).is_none());
        assert!(cache.get(2).is_some());
        assert!(cache.get(4).is_some());
    }

    #[test]
    fn dirty_victim_is_returned_for_flush() {
        let mut cache = NodeCache::with_capacity(2);
        cache.put(1, node(1), true);
        cache.put(2, node(2), false);

        let evicted = cache.put(3, node(3), false);
        assert_eq!(evicted.map(|(id, _)| id), Some(1));
    }

    #[test]
    fn updating_a_cached_entry_does_not_evict() {
        let mut cache = NodeCache::with_capacity(2);
        cache.put(1, node(1), false);
        cache.put(2, node(2), false);

        let mut updated = node(1);
        updated.num_keys = 5;
        let evicted = cache.put(1, updated.clone(), true);
        assert!(evicted.is_none());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(1), Some(&updated));
    }

    #[test]
    fn drain_dirty_returns_only_dirty_entries_and_empties_cache() {
        let mut cache = NodeCache::with_capacity(3);
        cache.put(1, node(1), false);
        cache.put(2, node(2), true);

        let dirty = cache.drain_dirty();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[0].0, 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn mark_dirty_on_existing_entry() {
        let mut cache = NodeCache::with_capacity(2);
        cache.put(1, node(1), false);
        cache.mark_dirty(1);
        let dirty = cache.drain_dirty();
        assert_eq!(dirty.len(), 1);
    }
}
