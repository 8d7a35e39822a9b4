use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::Duration;

use lock_api::RawMutex;

use crate::shared::Shared;
use crate::{Builder, Entry, Global, PoolError, SlotAllocator};

/// Number of slots a pool starts with when nothing else is asked for.
pub const DEFAULT_CAPACITY: usize = 4;

/// A thread-safe pool of reusable objects.
///
/// `ObjectPool` is a cheap handle: cloning it shares the same pool. Objects are
/// borrowed through an [`Entry`] and return to the pool on their own when the
/// entry goes away. Storage grows on demand and is freed when the last handle
/// is dropped.
///
/// All operations take one pool-wide lock. Only
/// [`acquire_wait`](Self::acquire_wait) and
/// [`acquire_blocking`](Self::acquire_blocking) ever suspend the calling thread.
///
/// # Examples
///
/// ```rust
/// use reuse_pool::ObjectPool;
/// use std::time::Duration;
///
/// let pool: ObjectPool<String> = ObjectPool::new();
/// pool.push(String::from("connection")).unwrap();
///
/// let worker_pool = pool.clone();
/// let entry = pool.acquire();
/// let worker = std::thread::spawn(move || {
///     // Blocks until the main thread gives the object back.
///     let entry = worker_pool.acquire_blocking();
///     assert_eq!(*entry, "connection in use");
/// });
///
/// let mut entry = entry;
/// entry.push_str(" in use");
/// std::thread::sleep(Duration::from_millis(10));
/// drop(entry);
/// worker.join().unwrap();
/// assert_eq!(pool.size(), 1);
/// ```
pub struct ObjectPool<T, A: SlotAllocator = Global, R: RawMutex = parking_lot::RawMutex> {
    shared: Arc<Shared<T, A, R>>,
}

impl<T> ObjectPool<T> {
    /// Create an empty pool with room for [`DEFAULT_CAPACITY`] objects.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ObjectPool;
    ///
    /// let pool = ObjectPool::<u32>::new();
    /// assert_eq!(pool.size(), 0);
    /// assert_eq!(pool.capacity(), 4);
    /// assert!(pool.acquire().is_none());
    /// ```
    pub fn new() -> Self {
        Self::with_allocator(Global)
    }

    /// Create a pool holding `count` default-constructed objects.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ObjectPool;
    ///
    /// let pool = ObjectPool::<Vec<u8>>::with_count(8);
    /// assert_eq!(pool.size(), 8);
    /// assert_eq!(pool.capacity(), 8);
    /// ```
    pub fn with_count(count: usize) -> Self
    where
        T: Default,
    {
        Builder::new()
            .build_default(count)
            .unwrap_or_else(|err| err.abort())
    }

    /// Create a pool holding `count` clones of `value`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ObjectPool;
    ///
    /// let pool = ObjectPool::from_elem(3, String::from("buffer"));
    /// assert_eq!(pool.size(), 3);
    /// assert_eq!(*pool.acquire(), "buffer");
    /// ```
    pub fn from_elem(count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Builder::new()
            .build_filled(count, value)
            .unwrap_or_else(|err| err.abort())
    }

    /// Start configuring a pool.
    pub fn builder() -> Builder<T> {
        Builder::new()
    }
}

impl<T, A: SlotAllocator> ObjectPool<T, A> {
    /// Create an empty pool whose slots come from `allocator`.
    pub fn with_allocator(allocator: A) -> Self {
        Builder::with_allocator(allocator)
            .build()
            .unwrap_or_else(|err| err.abort())
    }
}

impl<T, A: SlotAllocator, R: RawMutex> ObjectPool<T, A, R> {
    pub(crate) fn from_shared(shared: Shared<T, A, R>) -> Self {
        Self {
            shared: Arc::new(shared),
        }
    }

    /// Borrow a free object without blocking. Returns [`Entry::none()`] if
    /// there is none.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ObjectPool;
    ///
    /// let pool = ObjectPool::from_elem(1, 0_u64);
    /// let entry = pool.acquire();
    /// assert_eq!(*entry, 0);
    /// assert!(pool.acquire().is_none());
    /// ```
    pub fn acquire(&self) -> Entry<T, A, R> {
        self.shared.acquire()
    }

    /// Borrow a free object, waiting up to `timeout` for one to be returned.
    ///
    /// A zero `timeout` waits without limit; use [`acquire`](Self::acquire) to
    /// try once without waiting. Returns [`Entry::none()`] if the timeout expires.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ObjectPool;
    /// use std::time::Duration;
    ///
    /// let pool = ObjectPool::<u8>::new();
    /// let entry = pool.acquire_wait(Duration::from_millis(5));
    /// assert!(entry.is_none());
    /// ```
    pub fn acquire_wait(&self, timeout: Duration) -> Entry<T, A, R> {
        self.shared.acquire_wait(timeout)
    }

    /// Borrow a free object, waiting for as long as it takes.
    pub fn acquire_blocking(&self) -> Entry<T, A, R> {
        self.shared.acquire_wait(Duration::ZERO)
    }

    /// Borrow a free object, or construct a new one with `make` if none is free.
    ///
    /// The new object is managed by the pool from then on and joins the free
    /// objects once the entry is dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ObjectPool;
    ///
    /// let pool = ObjectPool::<String>::new();
    /// let entry = pool.allocate(|| String::from("fresh")).unwrap();
    /// assert_eq!(*entry, "fresh");
    /// assert_eq!(pool.managed_count(), 1);
    /// drop(entry);
    /// assert_eq!(pool.size(), 1);
    /// ```
    pub fn allocate<F>(&self, make: F) -> Result<Entry<T, A, R>, PoolError>
    where
        F: FnOnce() -> T,
    {
        self.shared.allocate(make)
    }

    /// Add `value` to the free objects, doubling the capacity if the pool is full.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ObjectPool;
    ///
    /// let pool = ObjectPool::new();
    /// for i in 0..5 {
    ///     pool.push(i).unwrap();
    /// }
    /// assert_eq!(pool.size(), 5);
    /// assert_eq!(pool.capacity(), 8);
    /// ```
    pub fn push(&self, value: T) -> Result<(), PoolError> {
        self.shared.push(value)
    }

    /// Add an object constructed by `make` to the free objects.
    ///
    /// `make` runs before the pool lock is taken.
    pub fn emplace<F>(&self, make: F) -> Result<(), PoolError>
    where
        F: FnOnce() -> T,
    {
        self.shared.push(make())
    }

    /// Set the number of free objects to `count`, cloning `value` for any
    /// missing ones.
    ///
    /// Lent objects are not counted and are never touched. Surplus free objects
    /// are dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ObjectPool;
    ///
    /// let pool = ObjectPool::from_elem(5, 1_u32);
    /// let _lent = pool.acquire();
    /// pool.resize(2, 0).unwrap();
    /// assert_eq!(pool.size(), 2);
    /// assert_eq!(pool.managed_count(), 3);
    /// assert!(pool.in_use());
    /// ```
    pub fn resize(&self, count: usize, value: T) -> Result<(), PoolError>
    where
        T: Clone,
    {
        self.shared.resize_with(count, || value.clone())
    }

    /// Like [`resize`](Self::resize), constructing missing objects with `make`.
    pub fn resize_with<F>(&self, count: usize, make: F) -> Result<(), PoolError>
    where
        F: FnMut() -> T,
    {
        self.shared.resize_with(count, make)
    }

    /// Like [`resize`](Self::resize), default-constructing missing objects.
    pub fn resize_default(&self, count: usize) -> Result<(), PoolError>
    where
        T: Default,
    {
        self.shared.resize_with(count, T::default)
    }

    /// Make sure the pool has at least `new_capacity` slots.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ObjectPool;
    ///
    /// let pool = ObjectPool::<u64>::new();
    /// pool.reserve(100).unwrap();
    /// assert_eq!(pool.capacity(), 100);
    /// pool.reserve(10).unwrap();
    /// assert_eq!(pool.capacity(), 100);
    /// assert_eq!(pool.size(), 0);
    /// ```
    pub fn reserve(&self, new_capacity: usize) -> Result<(), PoolError> {
        self.shared.reserve(new_capacity)
    }

    /// Number of free objects.
    pub fn size(&self) -> usize {
        self.shared.size()
    }

    /// Number of slots, whether vacant, free or lent.
    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    /// Number of constructed objects, free or lent.
    pub fn managed_count(&self) -> usize {
        self.shared.managed_count()
    }

    /// Number of objects currently lent out.
    pub fn lent(&self) -> usize {
        self.shared.lent()
    }

    /// Whether no object is free right now.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Whether at least one object is lent out.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ObjectPool;
    ///
    /// let pool = ObjectPool::from_elem(2, 0_u8);
    /// assert!(!pool.in_use());
    /// let entry = pool.acquire();
    /// assert!(pool.in_use());
    /// drop(entry);
    /// assert!(!pool.in_use());
    /// ```
    pub fn in_use(&self) -> bool {
        self.lent() > 0
    }

    /// A copy of the allocator backing this pool.
    pub fn allocator(&self) -> A
    where
        A: Clone,
    {
        self.shared.allocator()
    }

    /// Whether both handles refer to the same pool.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.shared, &other.shared)
    }
}

impl<T, A: SlotAllocator, R: RawMutex> Clone for ObjectPool<T, A, R> {
    /// Makes another handle to the same pool.
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: SlotAllocator, R: RawMutex> Debug for ObjectPool<T, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (size, managed, capacity) = self.shared.counts();
        f.debug_struct("ObjectPool")
            .field("size", &size)
            .field("managed", &managed)
            .field("capacity", &capacity)
            .finish()
    }
}
