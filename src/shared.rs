use std::ptr::{self, NonNull};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lock_api::{Mutex, RawMutex};
use tracing::{trace, warn};

use crate::arena::Arena;
use crate::sync::Signal;
use crate::{Entry, PoolError, SlotAllocator};

/// State shared by every [`ObjectPool`](crate::ObjectPool) handle of one pool.
pub(crate) struct Shared<T, A: SlotAllocator, R: RawMutex> {
    state: Mutex<R, State<T, A>>,
    /// Signalled whenever an object is put on the free list.
    available: Signal,
}

/// Everything guarded by the pool lock.
struct State<T, A: SlotAllocator> {
    arena: Arena<T, A>,
    /// Constructed objects that nobody borrows. Reserved up to the arena capacity.
    free: Vec<NonNull<T>>,
    /// Constructed objects, free or lent.
    managed: usize,
}

// SAFETY: Free objects are owned by the state and lent ones are only reachable
// through their entry.
unsafe impl<T: Send, A: SlotAllocator + Send> Send for State<T, A> {}

impl<T, A: SlotAllocator> State<T, A> {
    fn lent(&self) -> usize {
        self.managed - self.free.len()
    }

    fn reserve(&mut self, new_capacity: usize) -> Result<(), PoolError> {
        if new_capacity <= self.arena.capacity() {
            return Ok(());
        }
        self.free.try_reserve(new_capacity - self.free.len())?;
        self.arena.grow(new_capacity)
    }

    /// Take a vacant slot, doubling the arena when none is left.
    fn vacant_slot(&mut self) -> Result<NonNull<T>, PoolError> {
        if self.arena.vacant() == 0 {
            let doubled = self
                .arena
                .capacity()
                .checked_mul(2)
                .ok_or(PoolError::CapacityOverflow)?
                .max(1);
            self.reserve(doubled)?;
        }
        self.arena.take_vacant().ok_or(PoolError::CapacityOverflow)
    }

    /// Move `value` into a vacant slot without putting it on the free list.
    fn construct(&mut self, value: T) -> Result<NonNull<T>, PoolError> {
        let slot = self.vacant_slot()?;
        // SAFETY: A vacant slot is valid for writes and holds no value.
        unsafe { slot.as_ptr().write(value) };
        self.managed += 1;
        Ok(slot)
    }

    fn store(&mut self, value: T) -> Result<(), PoolError> {
        let slot = self.construct(value)?;
        self.free.push(slot);
        Ok(())
    }

    /// Remove the top free object and vacate its slot.
    fn evict(&mut self) -> Option<T> {
        let slot = self.free.pop()?;
        // SAFETY: Free slots hold an initialized value that nobody references. Once
        // the value is moved out the slot is vacant.
        let value = unsafe {
            let value = slot.as_ptr().read();
            self.arena.put_vacant(slot);
            value
        };
        self.managed -= 1;
        Some(value)
    }
}

impl<T, A: SlotAllocator> Drop for State<T, A> {
    fn drop(&mut self) {
        let lent = self.lent();
        while let Some(slot) = self.free.pop() {
            // SAFETY: Free slots hold an initialized value that nobody references.
            unsafe {
                ptr::drop_in_place(slot.as_ptr());
                self.arena.put_vacant(slot);
            }
        }
        if lent > 0 {
            warn!(lent, "object pool dropped while objects are still lent out");
        }
    }
}

impl<T, A: SlotAllocator, R: RawMutex> Shared<T, A, R> {
    /// Create a pool with `capacity` vacant slots.
    pub(crate) fn new(allocator: A, capacity: usize) -> Result<Self, PoolError> {
        let mut state = State {
            arena: Arena::new(allocator),
            free: Vec::new(),
            managed: 0,
        };
        state.reserve(capacity)?;
        Ok(Self {
            state: Mutex::new(state),
            available: Signal::new(),
        })
    }

    /// Create a pool holding `count` free objects made by `make`.
    pub(crate) fn with_objects<F>(
        allocator: A,
        capacity: usize,
        count: usize,
        mut make: F,
    ) -> Result<Self, PoolError>
    where
        F: FnMut() -> T,
    {
        let mut shared = Self::new(allocator, capacity.max(count))?;
        let state = shared.state.get_mut();
        for _ in 0..count {
            state.store(make())?;
        }
        Ok(shared)
    }

    fn lend(self: &Arc<Self>, slot: Option<NonNull<T>>) -> Entry<T, A, R> {
        match slot {
            Some(slot) => Entry::lent(slot, Arc::downgrade(self)),
            None => Entry::none(),
        }
    }

    pub(crate) fn acquire(self: &Arc<Self>) -> Entry<T, A, R> {
        let slot = self.state.lock().free.pop();
        self.lend(slot)
    }

    pub(crate) fn acquire_wait(self: &Arc<Self>, timeout: Duration) -> Entry<T, A, R> {
        let deadline = if timeout.is_zero() {
            None
        } else {
            // A deadline past the end of time is the same as none.
            Instant::now().checked_add(timeout)
        };

        let mut state = self.state.lock();
        let slot = loop {
            if let Some(slot) = state.free.pop() {
                break Some(slot);
            }
            match deadline {
                None => self.available.wait(&mut state),
                Some(deadline) => {
                    if self.available.wait_until(&mut state, deadline) {
                        break state.free.pop();
                    }
                }
            }
        };
        drop(state);

        // Pass the baton in case more objects became free while we were waking up.
        self.available.notify_one();
        self.lend(slot)
    }

    pub(crate) fn allocate<F>(self: &Arc<Self>, make: F) -> Result<Entry<T, A, R>, PoolError>
    where
        F: FnOnce() -> T,
    {
        let mut state = self.state.lock();
        let slot = match state.free.pop() {
            Some(slot) => slot,
            None => state.construct(make())?,
        };
        drop(state);
        Ok(Entry::lent(slot, Arc::downgrade(self)))
    }

    pub(crate) fn push(&self, value: T) -> Result<(), PoolError> {
        self.state.lock().store(value)?;
        self.available.notify_one();
        Ok(())
    }

    pub(crate) fn resize_with<F>(&self, count: usize, mut make: F) -> Result<(), PoolError>
    where
        F: FnMut() -> T,
    {
        let mut state = self.state.lock();
        let free = state.free.len();
        trace!(from = free, to = count, "resizing object pool");

        if count > free {
            let missing = count - free;
            let needed = state
                .managed
                .checked_add(missing)
                .ok_or(PoolError::CapacityOverflow)?;
            state.reserve(needed)?;
            for _ in 0..missing {
                state.store(make())?;
            }
            drop(state);
            self.available.notify_all();
        } else {
            let mut evicted = Vec::with_capacity(free - count);
            evicted.extend((count..free).filter_map(|_| state.evict()));
            drop(state);
            // Run destructors outside the lock.
            drop(evicted);
        }
        Ok(())
    }

    pub(crate) fn reserve(&self, new_capacity: usize) -> Result<(), PoolError> {
        self.state.lock().reserve(new_capacity)
    }

    /// Put a lent object back on the free list.
    pub(crate) fn recycle(&self, slot: NonNull<T>) {
        let mut state = self.state.lock();
        debug_assert!(state.free.len() < state.managed);
        // Never reallocates: the free list is reserved up to the arena capacity.
        state.free.push(slot);
        drop(state);
        self.available.notify_one();
    }

    pub(crate) fn size(&self) -> usize {
        self.state.lock().free.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.state.lock().arena.capacity()
    }

    pub(crate) fn managed_count(&self) -> usize {
        self.state.lock().managed
    }

    pub(crate) fn lent(&self) -> usize {
        self.state.lock().lent()
    }

    pub(crate) fn allocator(&self) -> A
    where
        A: Clone,
    {
        self.state.lock().arena.allocator().clone()
    }

    /// Free count, managed count and capacity, read under a single lock.
    pub(crate) fn counts(&self) -> (usize, usize, usize) {
        let state = self.state.lock();
        (state.free.len(), state.managed, state.arena.capacity())
    }
}
