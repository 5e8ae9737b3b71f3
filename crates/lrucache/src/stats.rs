//! Cache statistics tracking

/// Counters for cache activity
///
/// Owned by a single cache, so the counters are plain integers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    hits: u64,
    misses: u64,
    inserts: u64,
    updates: u64,
    evictions: u64,
}

impl CacheStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_insert(&mut self) {
        self.inserts += 1;
    }

    pub(crate) fn record_update(&mut self) {
        self.updates += 1;
    }

    /// An eviction also counts as an insert of the new key
    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
        self.inserts += 1;
    }

    /// `get` calls that found their key
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// `get` calls that did not
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// `put` calls that mapped a new key
    pub fn inserts(&self) -> u64 {
        self.inserts
    }

    /// `put` calls that overwrote a cached key
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Keys dropped to make room
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
