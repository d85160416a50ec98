use alloc::vec::Vec;
use core::mem;
use core::num::NonZero;

use super::node::Node;

// Test builds use a narrow index so the pool-limit paths stay reachable.
#[cfg(test)]
type RawIdx = u16;
#[cfg(not(test))]
type RawIdx = u32;

/// Position of a node slot in the pool.
///
/// The position is stored as its bitwise complement: the all-ones raw value
/// meaning "no node" complements to zero, which is the one value `NonZero`
/// rules out. `Option<NodeIdx>` therefore costs no more than the raw
/// integer, with `None` playing the null-child and end-of-free-list
/// sentinel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct NodeIdx(NonZero<RawIdx>);

impl NodeIdx {
    /// Highest addressable slot position; all-ones is reserved.
    pub(crate) const MAX: usize = (RawIdx::MAX as usize) - 1;

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn new(position: usize) -> Self {
        assert!(position <= Self::MAX, "node position exceeds the pool limit");
        // The bound keeps the complement away from zero.
        Self(NonZero::new(!(position as RawIdx)).expect("complement of a bounded position"))
    }

    #[inline]
    pub(crate) const fn position(self) -> usize {
        (!self.0.get()) as usize
    }
}

/// A slot in the node pool: either a live node or a link in the free list.
///
/// Threading the free list through the vacant slots themselves keeps the
/// allocator to a single `Vec` plus a head index.
#[derive(Clone)]
pub(crate) enum Slot<T> {
    Occupied(Node<T>),
    Vacant { next_free: Option<NodeIdx> },
}

impl<T> Slot<T> {
    #[inline]
    pub(crate) fn node(&self) -> &Node<T> {
        match self {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("`Slot::node()` - slot is vacant!"),
        }
    }

    #[inline]
    pub(crate) fn node_mut(&mut self) -> &mut Node<T> {
        match self {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("`Slot::node_mut()` - slot is vacant!"),
        }
    }
}

/// Fixed-width index-addressed storage for tree nodes.
///
/// Allocation pops the free list; when the list is empty a new slot is
/// pushed, growing the backing `Vec` geometrically. Deallocation threads the
/// slot back onto the free list. Indices are stable until the whole tree is
/// torn down.
#[derive(Clone)]
pub(crate) struct NodePool<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<NodeIdx>,
}

impl<T> NodePool<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Bytes of heap owned by the pool, excluding what elements point at.
    pub(crate) fn memory_size(&self) -> usize {
        self.slots.capacity() * mem::size_of::<Slot<T>>()
    }

    pub(crate) fn alloc(&mut self, node: Node<T>) -> NodeIdx {
        if let Some(idx) = self.free_head {
            // Reuse the most recently freed slot.
            let slot = &mut self.slots[idx.position()];
            let next = match slot {
                Slot::Vacant { next_free } => *next_free,
                Slot::Occupied(_) => panic!("`NodePool::alloc()` - free list points at a live slot!"),
            };
            *slot = Slot::Occupied(node);
            self.free_head = next;
            idx
        } else {
            // The new slot's position must stay addressable.
            assert!(
                self.slots.len() <= NodeIdx::MAX,
                "`NodePool::alloc()` - pool is at maximum capacity ({})",
                NodeIdx::MAX
            );
            self.slots.push(Slot::Occupied(node));
            NodeIdx::new(self.slots.len() - 1)
        }
    }

    /// Returns the slot to the free list, handing its node back to the
    /// caller. The index must not be used afterward.
    pub(crate) fn free(&mut self, idx: NodeIdx) -> Node<T> {
        let slot = &mut self.slots[idx.position()];
        let old = mem::replace(
            slot,
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        let Slot::Occupied(node) = old else {
            panic!("`NodePool::free()` - slot is already vacant!");
        };
        self.free_head = Some(idx);
        node
    }

    #[inline]
    pub(crate) fn node(&self, idx: NodeIdx) -> &Node<T> {
        self.slots[idx.position()].node()
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, idx: NodeIdx) -> &mut Node<T> {
        self.slots[idx.position()].node_mut()
    }

    /// Weight of the subtree rooted at `idx`; a null link weighs nothing.
    #[inline]
    pub(crate) fn weight_of(&self, idx: Option<NodeIdx>) -> u32 {
        idx.map_or(0, |idx| self.node(idx).weight)
    }

    /// Drops every node and empties the free list; keeps the allocation.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
    }

    /// Base pointer into the slot array, for iterators that hand out
    /// mutable borrows of distinct slots.
    pub(crate) fn base_ptr(&mut self) -> *mut Slot<T> {
        self.slots.as_mut_ptr()
    }

    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    pub(crate) fn is_occupied(&self, position: usize) -> bool {
        matches!(self.slots[position], Slot::Occupied(_))
    }

    /// Walks the free list, returning the raw slot positions on it.
    #[cfg(test)]
    pub(crate) fn free_list_positions(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cur = self.free_head;
        while let Some(idx) = cur {
            out.push(idx.position());
            cur = match &self.slots[idx.position()] {
                Slot::Vacant { next_free } => *next_free,
                Slot::Occupied(_) => panic!("free list points at a live slot"),
            };
        }
        out
    }
}
