//! LRU cache engine
//!
//! Composes the frame pool, the hash index and the recency list. Neither the
//! index nor the list knows about the other; every access goes through the
//! engine, which detaches a record from the list, fixes up the index when a
//! record changes key, and reattaches the record at the head.

use std::fmt;

use tracing::debug;

use crate::error::Result;
use crate::frames::FramePool;
use crate::hmap::{HashIndex, HashTier, SlotId};
use crate::lrul::RecencyList;
use crate::stats::CacheStats;

/// What a [`LruCache::put`] did to the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The key was new and a free frame took it
    Inserted,
    /// The key was cached; its value was overwritten
    Updated,
    /// The key was new and the least recently used entry made room for it
    Evicted {
        /// Key that was dropped
        key: i32,
        /// Value it held
        value: i32,
    },
}

/// Fixed-capacity LRU cache over `i32` keys and values
///
/// All storage is reserved by the constructor; `put` and `get` never
/// allocate. Not synchronized: wrap the whole cache in a lock to share it
/// between threads.
pub struct LruCache {
    frames: FramePool,
    index: HashIndex,
    recency: RecencyList,
    stats: CacheStats,
}

impl LruCache {
    /// Create a cache holding at most `capacity` entries
    ///
    /// # Panics
    /// If `capacity` is 0 or the storage cannot be allocated.
    pub fn new(capacity: u32) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");

        Self::try_new(capacity).unwrap_or_else(|e| panic!("failed to allocate lru cache: {}", e))
    }

    /// Create a cache holding at most `capacity` entries
    ///
    /// # Returns
    /// * `Err(Error::ZeroCapacity)` if `capacity` is 0
    /// * `Err(Error::Alloc(_))` if the frames, slot records or handles cannot be reserved
    pub fn try_new(capacity: u32) -> Result<Self> {
        let frames = FramePool::allocate(capacity)?;
        let index = HashIndex::allocate(capacity)?;
        let recency = RecencyList::with_capacity(capacity)?;

        debug!(
            capacity,
            bucket_bits = index.bits(),
            buckets = index.bucket_count(),
            tier = ?index.tier(),
            "lru cache created"
        );

        Ok(Self {
            frames,
            index,
            recency,
            stats: CacheStats::new(),
        })
    }

    /// Cache `value` under `key`, making it the most recently used entry
    ///
    /// When the key is new and every frame is taken, the least recently used
    /// entry is evicted and its frame reused.
    pub fn put(&mut self, key: i32, value: i32) -> PutOutcome {
        let (slot, outcome) = match self.index.get(key) {
            Some(slot) => {
                self.recency.remove(self.index.item(slot).handle());
                self.stats.record_update();
                (slot, PutOutcome::Updated)
            }
            None if !self.frames.all_used() => {
                let recency = &mut self.recency;
                let slot = self
                    .index
                    .allocate_item(&mut self.frames, |slot| recency.allocate_handle(slot));
                self.index.add(slot, key);
                self.stats.record_insert();
                (slot, PutOutcome::Inserted)
            }
            None => {
                let (slot, outcome) = self.evict_lru();
                self.index.add(slot, key);
                (slot, outcome)
            }
        };

        self.recency.add(self.index.item(slot).handle());
        *self.frames.value_mut(self.index.item(slot).frame()) = value;

        outcome
    }

    /// Unmap the least recently used record and hand it back for reuse
    ///
    /// The record keeps its frame and its (detached) recency handle.
    fn evict_lru(&mut self) -> (SlotId, PutOutcome) {
        let Some(handle) = self.recency.remove_lru() else {
            unreachable!("full lru cache with an empty recency list");
        };
        let slot = self.recency.slot(handle);

        let victim = self.index.item(slot);
        let key = victim.key();
        let value = self.frames.value(victim.frame());
        self.index.remove(slot);

        self.stats.record_eviction();
        debug!(key, value, "lru cache evict");

        (slot, PutOutcome::Evicted { key, value })
    }

    /// Look up `key`, making it the most recently used entry on a hit
    ///
    /// # Returns
    /// * `Some(value)` if the key is cached
    /// * `None` if it is not; nothing is changed in that case
    pub fn get(&mut self, key: i32) -> Option<i32> {
        let Some(slot) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        let item = self.index.item(slot);
        let (handle, frame) = (item.handle(), item.frame());
        self.recency.remove(handle);
        self.recency.add(handle);
        self.stats.record_hit();

        Some(self.frames.value(frame))
    }

    /// Read the value for `key` without refreshing its recency
    pub fn peek(&self, key: i32) -> Option<i32> {
        self.index
            .get(key)
            .map(|slot| self.frames.value(self.index.item(slot).frame()))
    }

    /// Check whether `key` is cached without refreshing its recency
    pub fn contains(&self, key: i32) -> bool {
        self.index.get(key).is_some()
    }

    /// Entries from most to least recently used
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.recency.iter().map(move |slot| {
            let item = self.index.item(slot);
            (item.key(), self.frames.value(item.frame()))
        })
    }

    /// Get the current number of entries
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache capacity
    pub fn capacity(&self) -> u32 {
        self.frames.capacity()
    }

    /// Number of hash buckets chosen for this capacity
    pub fn bucket_count(&self) -> usize {
        self.index.bucket_count()
    }

    /// Key mixing chosen for this capacity
    pub fn hash_tier(&self) -> HashTier {
        self.index.tier()
    }

    /// Length of the longest hash chain
    pub fn longest_chain(&self) -> usize {
        self.index.longest_chain()
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Zero the statistics, leaving the cached entries alone
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Release the cache and everything it owns
    ///
    /// Same as dropping it.
    pub fn destroy(self) {
        debug!(
            capacity = self.capacity(),
            len = self.len(),
            "lru cache destroyed"
        );
    }

    /// Walk all three structures and panic on any broken cross-structure invariant
    ///
    /// O(capacity); meant for tests and debug builds.
    #[cfg(any(test, debug_assertions))]
    #[doc(hidden)]
    pub fn check_invariants(&self) {
        use std::collections::HashSet;

        let mapped = self.index.len();
        assert_eq!(mapped, self.recency.len(), "index and recency list sizes differ");
        assert!(mapped <= self.capacity() as usize, "more entries than frames");
        assert_eq!(
            self.index.allocated(),
            self.frames.reserved() as usize,
            "every reserved frame needs exactly one slot record"
        );
        assert_eq!(mapped, self.index.allocated(), "allocated slot record left unmapped");

        let mut keys = HashSet::new();
        let mut frames = HashSet::new();
        for slot in self.index.mapped() {
            let item = self.index.item(slot);
            assert!(item.is_mapped());
            assert!(keys.insert(item.key()), "duplicate key {}", item.key());
            assert!(frames.insert(item.frame()), "frame {:?} shared", item.frame());
            assert!(self.recency.is_linked(item.handle()), "mapped key {} not in recency list", item.key());
            assert_eq!(self.recency.slot(item.handle()), slot, "handle points at another record");
        }
        assert_eq!(keys.len(), mapped);

        let mut seen = 0;
        for slot in self.recency.iter() {
            let item = self.index.item(slot);
            assert_eq!(self.index.get(item.key()), Some(slot), "recency entry not reachable by key");
            seen += 1;
        }
        assert_eq!(seen, mapped);
    }
}

impl fmt::Debug for LruCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("buckets", &self.bucket_count())
            .field("tier", &self.hash_tier())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn keys(cache: &LruCache) -> Vec<i32> {
        cache.iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn test_cache_zero_capacity() {
        assert!(matches!(LruCache::try_new(0), Err(Error::ZeroCapacity)));
    }

    #[test]
    #[should_panic(expected = "Capacity must be greater than 0")]
    fn test_cache_new_zero_capacity_panics() {
        LruCache::new(0);
    }

    #[test]
    fn test_cache_basic() {
        let mut cache = LruCache::new(2);

        assert_eq!(cache.put(1, 10), PutOutcome::Inserted);
        assert_eq!(cache.put(2, 20), PutOutcome::Inserted);

        assert_eq!(cache.get(1), Some(10));
        assert_eq!(cache.get(2), Some(20));
        assert_eq!(cache.len(), 2);
        cache.check_invariants();
    }

    #[test]
    fn test_cache_eviction() {
        let mut cache = LruCache::new(2);

        cache.put(1, 1);
        cache.put(2, 2);
        assert_eq!(cache.put(3, 3), PutOutcome::Evicted { key: 1, value: 1 });

        assert_eq!(cache.get(1), None);
        assert_eq!(cache.get(2), Some(2));
        assert_eq!(cache.get(3), Some(3));
        cache.check_invariants();
    }

    #[test]
    fn test_cache_get_refreshes() {
        let mut cache = LruCache::new(2);

        cache.put(1, 1);
        cache.put(2, 2);
        cache.get(1); // Move 1 to front
        assert_eq!(cache.put(3, 3), PutOutcome::Evicted { key: 2, value: 2 });

        assert_eq!(cache.get(1), Some(1));
        assert_eq!(cache.get(2), None);
        assert_eq!(cache.get(3), Some(3));
    }

    #[test]
    fn test_cache_overwrite() {
        let mut cache = LruCache::new(2);

        cache.put(1, 1);
        assert_eq!(cache.put(1, 2), PutOutcome::Updated);

        assert_eq!(cache.get(1), Some(2));
        assert_eq!(cache.len(), 1);
        cache.check_invariants();
    }

    #[test]
    fn test_cache_overwrite_refreshes() {
        let mut cache = LruCache::new(2);

        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(1, 5);

        assert_eq!(cache.put(3, 3), PutOutcome::Evicted { key: 2, value: 2 });
        assert_eq!(keys(&cache), vec![3, 1]);
    }

    #[test]
    fn test_cache_negative_one_is_a_value() {
        let mut cache = LruCache::new(1);

        cache.put(7, -1);

        assert_eq!(cache.get(7), Some(-1));
        assert_eq!(cache.get(8), None);
    }

    #[test]
    fn test_cache_miss_does_not_touch_order() {
        let mut cache = LruCache::new(3);
        cache.put(1, 1);
        cache.put(2, 2);

        let before = keys(&cache);
        assert_eq!(cache.get(9), None);

        assert_eq!(keys(&cache), before);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().misses(), 1);
    }

    #[test]
    fn test_cache_peek_and_contains() {
        let mut cache = LruCache::new(2);
        cache.put(1, 1);
        cache.put(2, 2);

        assert_eq!(cache.peek(1), Some(1));
        assert!(cache.contains(1));
        assert!(!cache.contains(3));

        // peek did not refresh 1, so it is still the victim
        assert_eq!(cache.put(3, 3), PutOutcome::Evicted { key: 1, value: 1 });
        assert_eq!(cache.stats().hits(), 0);
    }

    #[test]
    fn test_cache_iter_order() {
        let mut cache = LruCache::new(3);
        cache.put(1, 10);
        cache.put(2, 20);
        cache.put(3, 30);
        cache.get(1);

        assert_eq!(cache.iter().collect::<Vec<_>>(), vec![(1, 10), (3, 30), (2, 20)]);
    }

    #[test]
    fn test_cache_stats() {
        let mut cache = LruCache::new(2);

        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(2, 3);
        cache.put(3, 3);
        cache.get(3);
        cache.get(1);

        let stats = cache.stats();
        assert_eq!(stats.inserts(), 3);
        assert_eq!(stats.updates(), 1);
        assert_eq!(stats.evictions(), 1);
        assert_eq!(stats.hits(), 1);
        assert_eq!(stats.misses(), 1);
        assert_eq!(stats.hit_ratio(), 0.5);

        cache.reset_stats();
        assert_eq!(cache.stats().inserts(), 0);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_frames_reused_after_eviction() {
        let mut cache = LruCache::new(3);
        for key in 0..100 {
            cache.put(key, key * 2);
            cache.check_invariants();
        }

        assert_eq!(cache.len(), 3);
        assert_eq!(keys(&cache), vec![99, 98, 97]);
        assert_eq!(cache.peek(98), Some(196));
        assert_eq!(cache.stats().evictions(), 97);
    }

    #[test]
    fn test_cache_capacity_one() {
        let mut cache = LruCache::new(1);

        cache.put(1, 10);
        assert_eq!(cache.put(2, 20), PutOutcome::Evicted { key: 1, value: 10 });

        assert_eq!(cache.get(1), None);
        assert_eq!(cache.get(2), Some(20));
        assert_eq!(cache.capacity(), 1);
    }

    #[test]
    fn test_cache_debug() {
        let cache = LruCache::new(4);
        let dbg = format!("{:?}", cache);

        assert!(dbg.contains("capacity: 4"));
        assert!(dbg.contains("FourLane"));
    }
}
