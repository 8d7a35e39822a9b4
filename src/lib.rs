//! A thread-safe pool of reusable objects.
//!
//! # Features
//!
//! - Borrowed objects come back to the pool on their own when their [`Entry`]
//!   is dropped.
//! - Non-blocking ([`ObjectPool::acquire`]) and blocking
//!   ([`ObjectPool::acquire_wait`]) acquisition, with an optional timeout.
//! - Slot storage grows on demand and never moves, so lent objects stay put.
//! - Pluggable slot allocator ([`SlotAllocator`]) and lock type (any
//!   [`lock_api::RawMutex`]).
//!
//! # Examples
//!
//! ## Local object pool
//!
//! ```rust
//! use reuse_pool::ObjectPool;
//!
//! let pool = ObjectPool::from_elem(3, String::from("Hello"));
//! assert_eq!(pool.size(), 3);
//! assert!(!pool.in_use());
//!
//! let item = pool.acquire();
//! assert_eq!(*item, "Hello");
//! assert_eq!(pool.size(), 2);
//! assert!(pool.in_use());
//!
//! drop(item);
//! assert_eq!(pool.size(), 3);
//! assert!(!pool.in_use());
//! ```
//!
//! ## Multiple threads sharing one pool
//!
//! ```rust
//! use reuse_pool::ObjectPool;
//! use std::time::Duration;
//!
//! let pool: ObjectPool<Vec<u8>> = ObjectPool::with_count(2);
//!
//! let workers: Vec<_> = (0..8_u8)
//!     .map(|id| {
//!         let pool = pool.clone();
//!         std::thread::spawn(move || {
//!             let mut buffer = pool.acquire_wait(Duration::ZERO);
//!             buffer.clear();
//!             buffer.push(id);
//!         })
//!     })
//!     .collect();
//!
//! for worker in workers {
//!     worker.join().unwrap();
//! }
//! assert_eq!(pool.size(), 2);
//! assert_eq!(pool.managed_count(), 2);
//! ```

mod alloc;
mod arena;
mod builder;
mod entry;
mod error;
mod pool;
mod shared;
mod sync;

pub use alloc::{Global, SlotAllocator};
pub use builder::Builder;
pub use entry::Entry;
pub use error::{AllocError, PoolError};
pub use lock_api::RawMutex;
pub use pool::{DEFAULT_CAPACITY, ObjectPool};
