//! Hash index
//!
//! Maps keys to slot records through a fixed array of bucket chains. The
//! bucket count is derived from the capacity once and never changes:
//!
//! ```text
//! buckets = 1 << min(bit_width(capacity), MAX_BUCKET_BITS)
//! ```
//!
//! Each chain is an intrusive circular list threaded through the slot record
//! arena, so a record whose bucket is known is unlinked without a scan. The
//! bucket is cached on the record when it is mapped.

use tracing::trace;

use crate::error::Result;
use crate::frames::{FrameIdx, FramePool};
use crate::lrul::HandleId;
use crate::ring::{Link, Linked, Ring};

/// Upper bound on the bucket bit-width (at most 4096 buckets)
pub const MAX_BUCKET_BITS: u32 = 12;

/// Position of a slot record in the index arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct SlotId(u32);

impl SlotId {
    #[cfg(test)]
    pub(crate) fn from_raw(raw: u32) -> Self {
        SlotId(raw)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Key mixing applied before the bucket fold
///
/// Fewer output bits need stronger mixing to keep chains short, so the tier
/// is picked from the bucket bit-width when the index is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashTier {
    /// XOR of all four byte lanes, for up to 16 buckets
    FourLane,
    /// XOR of the two 16-bit halves, for up to 256 buckets
    TwoLane,
    /// Raw key
    Fold,
}

impl HashTier {
    fn for_bits(bits: u32) -> Self {
        if bits <= 4 {
            HashTier::FourLane
        } else if bits <= 8 {
            HashTier::TwoLane
        } else {
            HashTier::Fold
        }
    }

    fn mix(self, key: u32) -> u32 {
        match self {
            HashTier::FourLane => key ^ (key >> 8) ^ (key >> 16) ^ (key >> 24),
            HashTier::TwoLane => key ^ (key >> 16),
            HashTier::Fold => key,
        }
    }
}

/// Bucket bit-width for a capacity
fn bucket_bits(capacity: u32) -> u32 {
    (u32::BITS - capacity.leading_zeros()).min(MAX_BUCKET_BITS)
}

/// Slot record: binds a key to a frame and a recency handle
#[derive(Debug)]
pub(crate) struct Item {
    link: Link,
    key: i32,
    frame: FrameIdx,
    handle: HandleId,
    /// Bucket computed from `key` when the record was mapped
    bucket: Option<u32>,
}

impl Item {
    pub(crate) fn key(&self) -> i32 {
        self.key
    }

    pub(crate) fn frame(&self) -> FrameIdx {
        self.frame
    }

    pub(crate) fn handle(&self) -> HandleId {
        self.handle
    }

    pub(crate) fn is_mapped(&self) -> bool {
        self.bucket.is_some()
    }
}

impl Linked for Item {
    fn link(&self) -> &Link {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }
}

/// Chained hash index over slot records
#[derive(Debug)]
pub(crate) struct HashIndex {
    items: Vec<Item>,
    buckets: Vec<Ring>,
    bits: u32,
    mask: u32,
    tier: HashTier,
    len: usize,
}

impl HashIndex {
    /// Build an index sized for `capacity` slot records
    pub(crate) fn allocate(capacity: u32) -> Result<Self> {
        debug_assert!(capacity > 0);

        let bits = bucket_bits(capacity);
        let mask = (1u32 << bits) - 1;

        let mut buckets = Vec::new();
        buckets.try_reserve_exact(mask as usize + 1)?;
        buckets.resize(mask as usize + 1, Ring::default());

        let mut items = Vec::new();
        items.try_reserve_exact(capacity as usize)?;

        Ok(Self {
            items,
            buckets,
            bits,
            mask,
            tier: HashTier::for_bits(bits),
            len: 0,
        })
    }

    pub(crate) fn bits(&self) -> u32 {
        self.bits
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn tier(&self) -> HashTier {
        self.tier
    }

    /// Number of mapped slot records
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Number of slot records ever allocated, mapped or not
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn allocated(&self) -> usize {
        self.items.len()
    }

    fn bucket_of(&self, key: i32) -> u32 {
        let h = self.tier.mix(key as u32);
        (h ^ (h >> self.bits)) & self.mask
    }

    /// Create an unmapped slot record bound to a fresh frame
    ///
    /// `handle_for` creates the recency handle that refers back to the new
    /// record. The pool must not be exhausted.
    pub(crate) fn allocate_item(
        &mut self,
        frames: &mut FramePool,
        handle_for: impl FnOnce(SlotId) -> HandleId,
    ) -> SlotId {
        debug_assert!(!frames.all_used());

        let slot = SlotId(self.items.len() as u32);
        let frame = frames.reserve();
        self.items.push(Item {
            link: Link::default(),
            key: 0,
            frame,
            handle: handle_for(slot),
            bucket: None,
        });
        slot
    }

    pub(crate) fn item(&self, slot: SlotId) -> &Item {
        &self.items[slot.index()]
    }

    /// Map an unmapped slot record under `key`
    ///
    /// This is the only place a record's key is written.
    pub(crate) fn add(&mut self, slot: SlotId, key: i32) {
        let bucket = self.bucket_of(key);
        let item = &mut self.items[slot.index()];
        debug_assert!(!item.is_mapped(), "slot {:?} already mapped", slot);

        item.key = key;
        item.bucket = Some(bucket);
        trace!(
            key,
            bucket,
            frame = item.frame.index(),
            "hmap: add"
        );

        self.buckets[bucket as usize].push_back(&mut self.items, slot.0);
        self.len += 1;
    }

    /// Unmap a slot record, leaving its frame and handle bound to it
    pub(crate) fn remove(&mut self, slot: SlotId) {
        let item = &self.items[slot.index()];
        debug_assert!(item.is_mapped(), "slot {:?} not mapped", slot);
        let Some(bucket) = item.bucket else {
            return;
        };
        debug_assert_eq!(
            bucket,
            self.bucket_of(item.key),
            "stale bucket for key {}",
            item.key
        );
        trace!(
            key = item.key,
            bucket,
            frame = item.frame.index(),
            "hmap: rm"
        );

        self.buckets[bucket as usize].remove(&mut self.items, slot.0);
        self.items[slot.index()].bucket = None;
        self.len -= 1;
    }

    /// Find the slot record mapped under `key`
    pub(crate) fn get(&self, key: i32) -> Option<SlotId> {
        let bucket = &self.buckets[self.bucket_of(key) as usize];
        bucket
            .iter(&self.items)
            .map(SlotId)
            .find(|&slot| self.items[slot.index()].key == key)
    }

    /// Every mapped slot record, bucket by bucket
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn mapped(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.buckets
            .iter()
            .flat_map(move |bucket| bucket.iter(&self.items).map(SlotId))
    }

    /// Length of the longest bucket chain
    pub(crate) fn longest_chain(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| bucket.iter(&self.items).count())
            .max()
            .unwrap_or(0)
    }
}
