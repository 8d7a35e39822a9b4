use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::sync::Weak;

use lock_api::RawMutex;

use crate::shared::Shared;
use crate::{Global, SlotAllocator};

/// An object borrowed from an [`ObjectPool`](crate::ObjectPool), or none.
///
/// An `Entry` is the only way to reach the object it holds, so the object can be
/// used without any locking. When the entry is dropped, released or overwritten,
/// the object goes back to the pool it came from.
///
/// Operations that may find no free object return [`Entry::none()`]. Compare
/// against it, or use [`is_none`](Entry::is_none), before dereferencing:
/// dereferencing an empty entry panics.
///
/// The entry keeps only a weak reference to its pool. If every pool handle has
/// been dropped by the time the entry is released, the object is dropped in
/// place and its storage stays leaked.
///
/// # Example
///
/// ```rust
/// use reuse_pool::{Entry, ObjectPool};
///
/// let pool = ObjectPool::from_elem(1, String::from("hello"));
/// let mut entry = pool.acquire();
/// assert!(entry != Entry::none());
/// entry.push_str(" world");
/// assert!(pool.acquire().is_none());
///
/// entry = Entry::none();
/// assert_eq!(*pool.acquire(), "hello world");
/// ```
pub struct Entry<T, A: SlotAllocator = Global, R: RawMutex = parking_lot::RawMutex> {
    // `slot` is `Some` exactly when the entry owns an object.
    slot: Option<NonNull<T>>,
    pool: Weak<Shared<T, A, R>>,
}

// SAFETY: The entry is the only path to its object, so moving the entry moves
// exclusive access to `T`. Releasing it only touches the pool through its lock.
unsafe impl<T: Send, A: SlotAllocator + Send, R: RawMutex + Send + Sync> Send for Entry<T, A, R> {}

// SAFETY: A shared entry only hands out `&T`.
unsafe impl<T: Sync, A: SlotAllocator + Send, R: RawMutex + Send + Sync> Sync for Entry<T, A, R> {}

impl<T, A: SlotAllocator, R: RawMutex> Entry<T, A, R> {
    /// The empty entry.
    pub const fn none() -> Self {
        Self {
            slot: None,
            pool: Weak::new(),
        }
    }

    pub(crate) fn lent(slot: NonNull<T>, pool: Weak<Shared<T, A, R>>) -> Self {
        Self {
            slot: Some(slot),
            pool,
        }
    }

    /// Whether this entry holds no object.
    pub fn is_none(&self) -> bool {
        self.slot.is_none()
    }

    /// Whether this entry holds an object.
    pub fn is_some(&self) -> bool {
        self.slot.is_some()
    }

    /// Get a reference to the borrowed object, or `None` if the entry is empty.
    pub fn get(&self) -> Option<&T> {
        // SAFETY: The slot holds an initialized value that only this entry can reach.
        self.slot.as_ref().map(|slot| unsafe { slot.as_ref() })
    }

    /// Get a mutable reference to the borrowed object, or `None` if the entry is empty.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        // SAFETY: As in `get`, and `&mut self` guarantees exclusivity.
        self.slot.as_mut().map(|slot| unsafe { slot.as_mut() })
    }

    /// Move the object out into a new entry, leaving this one empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ObjectPool;
    ///
    /// let pool = ObjectPool::from_elem(1, 7_u32);
    /// let mut first = pool.acquire();
    /// let second = first.take();
    /// assert!(first.is_none());
    /// assert_eq!(*second, 7);
    /// assert_eq!(pool.size(), 0);
    /// ```
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Return the object to its pool now, leaving this entry empty.
    ///
    /// Does nothing if the entry is already empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ObjectPool;
    ///
    /// let pool = ObjectPool::from_elem(1, 7_u32);
    /// let mut entry = pool.acquire();
    /// assert_eq!(pool.size(), 0);
    /// entry.release();
    /// assert!(entry.is_none());
    /// assert_eq!(pool.size(), 1);
    /// ```
    pub fn release(&mut self) {
        let Some(slot) = self.slot.take() else {
            return;
        };
        match mem::take(&mut self.pool).upgrade() {
            Some(pool) => pool.recycle(slot),
            // SAFETY: The pool is gone and left the slot allocated. We still own
            // the value and nobody else can reach it.
            None => unsafe { ptr::drop_in_place(slot.as_ptr()) },
        }
    }
}

impl<T, A: SlotAllocator, R: RawMutex> Default for Entry<T, A, R> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T, A: SlotAllocator, R: RawMutex> Drop for Entry<T, A, R> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T, A: SlotAllocator, R: RawMutex> Deref for Entry<T, A, R> {
    type Target = T;

    /// # Panics
    ///
    /// Panics if the entry is empty.
    fn deref(&self) -> &Self::Target {
        match self.get() {
            Some(value) => value,
            None => panic!("attempted to access the object of an empty pool entry"),
        }
    }
}

impl<T, A: SlotAllocator, R: RawMutex> DerefMut for Entry<T, A, R> {
    /// # Panics
    ///
    /// Panics if the entry is empty.
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self.get_mut() {
            Some(value) => value,
            None => panic!("attempted to access the object of an empty pool entry"),
        }
    }
}

impl<T: Debug, A: SlotAllocator, R: RawMutex> Debug for Entry<T, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("Entry").field(value).finish(),
            None => f.write_str("Entry(none)"),
        }
    }
}

impl<T: PartialEq, A: SlotAllocator, R: RawMutex> PartialEq for Entry<T, A, R> {
    fn eq(&self, other: &Self) -> bool {
        self.get().eq(&other.get())
    }
}

impl<T: Eq, A: SlotAllocator, R: RawMutex> Eq for Entry<T, A, R> {}

impl<T: PartialOrd, A: SlotAllocator, R: RawMutex> PartialOrd for Entry<T, A, R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.get().partial_cmp(&other.get())
    }
}

impl<T: Ord, A: SlotAllocator, R: RawMutex> Ord for Entry<T, A, R> {
    /// Empty entries order before any object.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::{Entry, ObjectPool};
    ///
    /// let pool = ObjectPool::new();
    /// pool.push(1_usize).unwrap();
    /// pool.push(2_usize).unwrap();
    /// let two = pool.acquire();
    /// let one = pool.acquire();
    /// assert!(one < two);
    /// assert!(Entry::none() < one);
    /// ```
    fn cmp(&self, other: &Self) -> Ordering {
        self.get().cmp(&other.get())
    }
}

impl<T: Hash, A: SlotAllocator, R: RawMutex> Hash for Entry<T, A, R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.get().hash(state)
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize, A: SlotAllocator, R: RawMutex> serde::Serialize for Entry<T, A, R> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.get().serialize(serializer)
    }
}
