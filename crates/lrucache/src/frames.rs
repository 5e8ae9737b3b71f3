//! Frame pool
//!
//! A fixed array of value cells reserved once at construction. Frames are
//! handed out in index order and never given back: eviction rebinds the slot
//! record that owns a frame instead of freeing the frame.

use crate::error::{Error, Result};

/// Index of a value cell in the frame pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct FrameIdx(u32);

impl FrameIdx {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Preallocated storage for cached values
#[derive(Debug)]
pub(crate) struct FramePool {
    values: Vec<i32>,
    reserved: u32,
}

impl FramePool {
    /// Allocate `capacity` frames up front
    pub(crate) fn allocate(capacity: u32) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        let mut values = Vec::new();
        values.try_reserve_exact(capacity as usize)?;
        values.resize(capacity as usize, 0);

        Ok(Self {
            values,
            reserved: 0,
        })
    }

    pub(crate) fn capacity(&self) -> u32 {
        self.values.len() as u32
    }

    /// Number of frames handed out so far
    pub(crate) fn reserved(&self) -> u32 {
        self.reserved
    }

    /// True once every frame has been handed out
    pub(crate) fn all_used(&self) -> bool {
        self.reserved == self.capacity()
    }

    /// Hand out the next unused frame
    ///
    /// Callers evict instead of reserving once `all_used()` is true.
    pub(crate) fn reserve(&mut self) -> FrameIdx {
        debug_assert!(!self.all_used(), "frame pool exhausted");

        let idx = FrameIdx(self.reserved);
        self.reserved += 1;
        idx
    }

    pub(crate) fn value(&self, idx: FrameIdx) -> i32 {
        debug_assert!(idx.0 < self.reserved, "frame {} not reserved", idx.0);
        self.values[idx.index()]
    }

    pub(crate) fn value_mut(&mut self, idx: FrameIdx) -> &mut i32 {
        debug_assert!(idx.0 < self.reserved, "frame {} not reserved", idx.0);
        &mut self.values[idx.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_zero_capacity() {
        assert!(matches!(FramePool::allocate(0), Err(Error::ZeroCapacity)));
    }

    #[test]
    fn test_frames_reserve_in_order() {
        let mut frames = FramePool::allocate(3).unwrap();

        assert_eq!(frames.reserve(), FrameIdx(0));
        assert_eq!(frames.reserve(), FrameIdx(1));
        assert!(!frames.all_used());
        assert_eq!(frames.reserve(), FrameIdx(2));
        assert!(frames.all_used());
        assert_eq!(frames.reserved(), 3);
    }

    #[test]
    fn test_frames_write_and_read() {
        let mut frames = FramePool::allocate(2).unwrap();
        let a = frames.reserve();
        let b = frames.reserve();

        *frames.value_mut(a) = -1;
        *frames.value_mut(b) = 42;

        assert_eq!(frames.value(a), -1);
        assert_eq!(frames.value(b), 42);

        *frames.value_mut(a) = 7;
        assert_eq!(frames.value(a), 7);
    }

    #[test]
    #[should_panic(expected = "frame pool exhausted")]
    #[cfg(debug_assertions)]
    fn test_frames_reserve_past_capacity() {
        let mut frames = FramePool::allocate(1).unwrap();
        frames.reserve();
        frames.reserve();
    }
}
