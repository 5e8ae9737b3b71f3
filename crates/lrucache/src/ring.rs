//! Intrusive circular doubly-linked rings
//!
//! Nodes live in an arena (`&mut [T]`) and carry their own [`Link`]; a
//! [`Ring`] only remembers its head. With the arena in hand every
//! insertion and removal is O(1) and no node is ever moved.

/// Previous/next arena positions of a ring member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Link {
    prev: u32,
    next: u32,
}

/// Arena element that can be threaded onto a [`Ring`]
pub(crate) trait Linked {
    fn link(&self) -> &Link;
    fn link_mut(&mut self) -> &mut Link;
}

#[inline]
fn at(idx: u32) -> usize {
    idx as usize
}

/// Head of a circular list threaded through an arena
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Ring {
    head: Option<u32>,
}

impl Ring {
    pub(crate) fn last<T: Linked>(&self, nodes: &[T]) -> Option<u32> {
        self.head.map(|head| nodes[at(head)].link().prev)
    }

    /// Link `idx` in just before the head, i.e. at the tail
    pub(crate) fn push_back<T: Linked>(&mut self, nodes: &mut [T], idx: u32) {
        match self.head {
            None => {
                *nodes[at(idx)].link_mut() = Link {
                    prev: idx,
                    next: idx,
                };
                self.head = Some(idx);
            }
            Some(head) => {
                let tail = nodes[at(head)].link().prev;
                *nodes[at(idx)].link_mut() = Link {
                    prev: tail,
                    next: head,
                };
                nodes[at(tail)].link_mut().next = idx;
                nodes[at(head)].link_mut().prev = idx;
            }
        }
    }

    /// Link `idx` in as the new head
    pub(crate) fn push_front<T: Linked>(&mut self, nodes: &mut [T], idx: u32) {
        // On a circle the slot before the head is both the tail and the
        // position of a new head.
        self.push_back(nodes, idx);
        self.head = Some(idx);
    }

    /// Unlink `idx`, which must currently be a member of this ring
    pub(crate) fn remove<T: Linked>(&mut self, nodes: &mut [T], idx: u32) {
        let Link { prev, next } = *nodes[at(idx)].link();

        if next == idx {
            debug_assert_eq!(self.head, Some(idx), "node {} not in this ring", idx);
            self.head = None;
            return;
        }

        nodes[at(prev)].link_mut().next = next;
        nodes[at(next)].link_mut().prev = prev;
        if self.head == Some(idx) {
            self.head = Some(next);
        }
    }

    /// Walk the ring from head to tail
    pub(crate) fn iter<'a, T: Linked>(&self, nodes: &'a [T]) -> RingIter<'a, T> {
        RingIter {
            nodes,
            head: self.head,
            cursor: self.head,
        }
    }
}

pub(crate) struct RingIter<'a, T> {
    nodes: &'a [T],
    head: Option<u32>,
    cursor: Option<u32>,
}

impl<T: Linked> Iterator for RingIter<'_, T> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let idx = self.cursor?;
        let next = self.nodes[at(idx)].link().next;
        self.cursor = if Some(next) == self.head {
            None
        } else {
            Some(next)
        };
        Some(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Node {
        link: Link,
    }

    impl Linked for Node {
        fn link(&self) -> &Link {
            &self.link
        }

        fn link_mut(&mut self) -> &mut Link {
            &mut self.link
        }
    }

    fn arena(n: usize) -> Vec<Node> {
        (0..n).map(|_| Node::default()).collect()
    }

    #[test]
    fn test_ring_push_back_order() {
        let mut nodes = arena(3);
        let mut ring = Ring::default();

        ring.push_back(&mut nodes, 0);
        ring.push_back(&mut nodes, 1);
        ring.push_back(&mut nodes, 2);

        assert_eq!(ring.iter(&nodes).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(ring.iter(&nodes).next(), Some(0));
        assert_eq!(ring.last(&nodes), Some(2));
    }

    #[test]
    fn test_ring_push_front_order() {
        let mut nodes = arena(3);
        let mut ring = Ring::default();

        ring.push_front(&mut nodes, 0);
        ring.push_front(&mut nodes, 1);
        ring.push_front(&mut nodes, 2);

        assert_eq!(ring.iter(&nodes).collect::<Vec<_>>(), vec![2, 1, 0]);
        assert_eq!(ring.last(&nodes), Some(0));
    }

    #[test]
    fn test_ring_remove_head_middle_tail() {
        let mut nodes = arena(4);
        let mut ring = Ring::default();
        for i in 0..4 {
            ring.push_back(&mut nodes, i);
        }

        ring.remove(&mut nodes, 0);
        assert_eq!(ring.iter(&nodes).collect::<Vec<_>>(), vec![1, 2, 3]);

        ring.remove(&mut nodes, 2);
        assert_eq!(ring.iter(&nodes).collect::<Vec<_>>(), vec![1, 3]);

        ring.remove(&mut nodes, 3);
        assert_eq!(ring.iter(&nodes).collect::<Vec<_>>(), vec![1]);
        assert_eq!(ring.last(&nodes), Some(1));

        ring.remove(&mut nodes, 1);
        assert_eq!(ring.iter(&nodes).count(), 0);
        assert_eq!(ring.last(&nodes), None);
    }

    #[test]
    fn test_ring_relink_after_remove() {
        let mut nodes = arena(2);
        let mut ring = Ring::default();
        ring.push_back(&mut nodes, 0);
        ring.push_back(&mut nodes, 1);

        ring.remove(&mut nodes, 1);
        ring.push_front(&mut nodes, 1);

        assert_eq!(ring.iter(&nodes).collect::<Vec<_>>(), vec![1, 0]);
    }
}
