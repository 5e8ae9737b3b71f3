//! Recency list
//!
//! Orders slot records by time of last touch: most recently used at the head,
//! least recently used at the tail. Handles are addressed directly, there is
//! no lookup by key.

use crate::error::Result;
use crate::hmap::SlotId;
use crate::ring::{Link, Linked, Ring};

/// Position of a recency node in the list arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HandleId(u32);

impl HandleId {
    #[cfg(test)]
    pub(crate) fn from_raw(raw: u32) -> Self {
        HandleId(raw)
    }
}

#[derive(Debug)]
struct Node {
    link: Link,
    /// Slot record this handle orders
    slot: SlotId,
    linked: bool,
}

impl Linked for Node {
    fn link(&self) -> &Link {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }
}

/// Intrusive LRU list over recency handles
#[derive(Debug)]
pub(crate) struct RecencyList {
    nodes: Vec<Node>,
    ring: Ring,
    len: usize,
}

impl RecencyList {
    /// Create an empty list with room for `capacity` handles
    pub(crate) fn with_capacity(capacity: u32) -> Result<Self> {
        let mut nodes = Vec::new();
        nodes.try_reserve_exact(capacity as usize)?;

        Ok(Self {
            nodes,
            ring: Ring::default(),
            len: 0,
        })
    }

    /// Create a detached handle that refers back to `slot`
    pub(crate) fn allocate_handle(&mut self, slot: SlotId) -> HandleId {
        let handle = HandleId(self.nodes.len() as u32);
        self.nodes.push(Node {
            link: Link::default(),
            slot,
            linked: false,
        });
        handle
    }

    /// Slot record owning `handle`
    pub(crate) fn slot(&self, handle: HandleId) -> SlotId {
        self.nodes[handle.0 as usize].slot
    }

    /// Number of handles currently on the list
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_linked(&self, handle: HandleId) -> bool {
        self.nodes[handle.0 as usize].linked
    }

    /// Mark `handle` most recently used
    pub(crate) fn add(&mut self, handle: HandleId) {
        debug_assert!(!self.is_linked(handle), "handle {:?} already linked", handle);

        self.ring.push_front(&mut self.nodes, handle.0);
        self.nodes[handle.0 as usize].linked = true;
        self.len += 1;
    }

    /// Detach and return the least recently used handle
    pub(crate) fn remove_lru(&mut self) -> Option<HandleId> {
        let tail = HandleId(self.ring.last(&self.nodes)?);
        self.remove(tail);
        Some(tail)
    }

    /// Detach a specific handle
    pub(crate) fn remove(&mut self, handle: HandleId) {
        debug_assert!(self.is_linked(handle), "handle {:?} not linked", handle);

        self.ring.remove(&mut self.nodes, handle.0);
        self.nodes[handle.0 as usize].linked = false;
        self.len -= 1;
    }

    /// Slot records from most to least recently used
    pub(crate) fn iter(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.ring
            .iter(&self.nodes)
            .map(move |idx| self.nodes[idx as usize].slot)
    }
}
