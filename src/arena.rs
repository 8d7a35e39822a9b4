use std::alloc::Layout;
use std::ptr::NonNull;

use tracing::{debug, warn};

use crate::{PoolError, SlotAllocator};

/// Fixed-address slot storage.
///
/// Slots are allocated in blocks and never move, so a pointer handed out for a
/// slot stays valid for as long as the arena lives. The arena only tracks the
/// vacant slots; which of the other slots are free or lent is the pool's business.
pub(crate) struct Arena<T, A: SlotAllocator> {
    allocator: A,
    blocks: Vec<Block<T>>,
    /// Allocated slots that hold no value.
    vacant: Vec<NonNull<T>>,
    capacity: usize,
}

struct Block<T> {
    start: NonNull<T>,
    len: usize,
    layout: Layout,
}

// SAFETY: The arena exclusively owns its blocks; values of `T` only move between
// threads together with it.
unsafe impl<T: Send, A: SlotAllocator + Send> Send for Arena<T, A> {}

impl<T, A: SlotAllocator> Arena<T, A> {
    pub(crate) fn new(allocator: A) -> Self {
        Self {
            allocator,
            blocks: Vec::new(),
            vacant: Vec::new(),
            capacity: 0,
        }
    }

    pub(crate) fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Total number of slots, whatever they hold.
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn vacant(&self) -> usize {
        self.vacant.len()
    }

    /// Grow to `new_capacity` slots. Does nothing if the arena is already that large.
    ///
    /// On error the arena is left exactly as it was.
    pub(crate) fn grow(&mut self, new_capacity: usize) -> Result<(), PoolError> {
        let Some(additional) = new_capacity
            .checked_sub(self.capacity)
            .filter(|additional| *additional > 0)
        else {
            return Ok(());
        };

        self.blocks.try_reserve(1)?;
        self.vacant.try_reserve(new_capacity - self.vacant.len())?;
        let block = self.allocate_block(additional)?;

        // Hand out the lowest addresses first.
        self.vacant.extend(
            (0..additional)
                .rev()
                // SAFETY: `i` is within the block we just allocated.
                .map(|i| unsafe { block.start.add(i) }),
        );
        self.blocks.push(block);

        debug!(
            from = self.capacity,
            to = new_capacity,
            "grew object pool slot storage"
        );
        self.capacity = new_capacity;
        Ok(())
    }

    fn allocate_block(&self, len: usize) -> Result<Block<T>, PoolError> {
        let layout = Layout::array::<T>(len).map_err(|_| PoolError::CapacityOverflow)?;
        let start = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            self.allocator
                .allocate(layout)
                .map_err(|source| PoolError::Alloc { layout, source })?
                .cast()
        };
        Ok(Block { start, len, layout })
    }

    /// Take a vacant slot. The caller must initialize it before treating it as a value.
    pub(crate) fn take_vacant(&mut self) -> Option<NonNull<T>> {
        self.vacant.pop()
    }

    /// Give back a slot whose value has been moved out or dropped.
    ///
    /// # Safety
    ///
    /// `slot` must have been taken from this arena and must no longer hold a value.
    pub(crate) unsafe fn put_vacant(&mut self, slot: NonNull<T>) {
        debug_assert!(self.vacant.len() < self.capacity);
        // Never reallocates: `grow` reserved room for every slot.
        self.vacant.push(slot);
    }
}

impl<T, A: SlotAllocator> Drop for Arena<T, A> {
    fn drop(&mut self) {
        if size_of::<T>() == 0 {
            return;
        }

        // Any slot that is not vacant here belongs to an entry that outlived the
        // pool. The block holding it must stay allocated.
        let fully_vacant = self.vacant.len() == self.capacity;
        let mut vacant: Vec<usize> = Vec::new();
        if !fully_vacant {
            vacant = self.vacant.iter().map(|slot| slot.as_ptr().addr()).collect();
            vacant.sort_unstable();
        }

        let mut leaked = 0;
        for block in self.blocks.drain(..) {
            if !fully_vacant {
                let begin = block.start.as_ptr().addr();
                let end = begin + block.layout.size();
                let inside = vacant.partition_point(|addr| *addr < end)
                    - vacant.partition_point(|addr| *addr < begin);
                if inside != block.len {
                    leaked += block.len;
                    continue;
                }
            }

            // SAFETY: The block came from this allocator with this layout and none
            // of its slots is referenced any more.
            unsafe { self.allocator.deallocate(block.start.cast(), block.layout) };
        }

        if leaked > 0 {
            warn!(
                slots = leaked,
                "leaking object pool storage still referenced by lent entries"
            );
        }
    }
}
