use std::marker::PhantomData;

use lock_api::RawMutex;

use crate::pool::DEFAULT_CAPACITY;
use crate::shared::Shared;
use crate::{Global, ObjectPool, PoolError, SlotAllocator};

/// A builder for creating an [`ObjectPool`] with custom configuration.
///
/// # Example
///
/// ```rust
/// use reuse_pool::Builder;
///
/// let pool = Builder::<String>::new()
///     .capacity(16)
///     .build_filled(4, String::with_capacity(1024))
///     .unwrap();
/// assert_eq!(pool.capacity(), 16);
/// assert_eq!(pool.size(), 4);
/// ```
pub struct Builder<T, A: SlotAllocator = Global, R: RawMutex = parking_lot::RawMutex> {
    /// Allocator backing the slots.
    allocator: A,
    /// Requested number of slots, if any.
    capacity: Option<usize>,
    _marker: PhantomData<fn() -> (T, R)>,
}

impl<T> Builder<T> {
    /// Create a new builder with the global allocator and `parking_lot` locking.
    pub fn new() -> Self {
        Self::with_allocator(Global)
    }
}

impl<T> Default for Builder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: SlotAllocator> Builder<T, A> {
    /// Create a new builder whose pool takes slots from `allocator`.
    pub fn with_allocator(allocator: A) -> Self {
        Self {
            allocator,
            capacity: None,
            _marker: PhantomData,
        }
    }
}

impl<T, A: SlotAllocator, R: RawMutex> Builder<T, A, R> {
    /// Set the number of slots allocated up front.
    ///
    /// When the pool is built with initial objects, the capacity is raised to
    /// fit them if needed.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Guard the pool with a different raw mutex type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::Builder;
    ///
    /// let pool = Builder::<u32>::new()
    ///     .raw_mutex::<parking_lot::RawFairMutex>()
    ///     .build_default(2)
    ///     .unwrap();
    /// assert_eq!(pool.size(), 2);
    /// ```
    pub fn raw_mutex<M: RawMutex>(self) -> Builder<T, A, M> {
        Builder {
            allocator: self.allocator,
            capacity: self.capacity,
            _marker: PhantomData,
        }
    }

    /// Build an empty pool.
    ///
    /// Without an explicit [`capacity`](Self::capacity) the pool starts with
    /// [`DEFAULT_CAPACITY`] slots.
    pub fn build(self) -> Result<ObjectPool<T, A, R>, PoolError> {
        let capacity = self.capacity.unwrap_or(DEFAULT_CAPACITY);
        Shared::new(self.allocator, capacity).map(ObjectPool::from_shared)
    }

    /// Build a pool holding `count` free objects constructed by `make`.
    ///
    /// Without an explicit [`capacity`](Self::capacity) the pool has exactly
    /// `count` slots.
    pub fn build_with<F>(self, count: usize, make: F) -> Result<ObjectPool<T, A, R>, PoolError>
    where
        F: FnMut() -> T,
    {
        let capacity = self.capacity.unwrap_or(count);
        Shared::with_objects(self.allocator, capacity, count, make).map(ObjectPool::from_shared)
    }

    /// Build a pool holding `count` clones of `value`.
    pub fn build_filled(self, count: usize, value: T) -> Result<ObjectPool<T, A, R>, PoolError>
    where
        T: Clone,
    {
        self.build_with(count, || value.clone())
    }

    /// Build a pool holding `count` default-constructed objects.
    pub fn build_default(self, count: usize) -> Result<ObjectPool<T, A, R>, PoolError>
    where
        T: Default,
    {
        self.build_with(count, T::default)
    }
}
