use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::Arc;
use std::sync::atomic::Ordering::*;
use std::sync::atomic::{AtomicBool, AtomicUsize};

use reuse_pool::{AllocError, Builder, Global, ObjectPool, PoolError, SlotAllocator};

/// Tracks live blocks and can be told to fail.
#[derive(Default)]
struct Counting {
    live_blocks: AtomicUsize,
    total_blocks: AtomicUsize,
    fail: AtomicBool,
}

// SAFETY: Forwards to the global allocator.
unsafe impl SlotAllocator for Counting {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if self.fail.load(SeqCst) {
            return Err(AllocError);
        }
        let ptr = Global.allocate(layout)?;
        self.live_blocks.fetch_add(1, SeqCst);
        self.total_blocks.fetch_add(1, SeqCst);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.live_blocks.fetch_sub(1, SeqCst);
        unsafe { Global.deallocate(ptr, layout) }
    }
}

#[test]
fn dropping_pool_frees_every_block() {
    let alloc = Arc::new(Counting::default());
    let pool = ObjectPool::with_allocator(alloc.clone());
    for i in 0..20_u64 {
        pool.push(i).unwrap();
    }
    // 4 -> 8 -> 16 -> 32
    assert_eq!(pool.capacity(), 32);
    assert_eq!(alloc.total_blocks.load(SeqCst), 4);

    drop(pool.acquire());
    drop(pool);
    assert_eq!(alloc.live_blocks.load(SeqCst), 0);
}

#[test]
fn allocator_is_shared() {
    let alloc = Arc::new(Counting::default());
    let pool = ObjectPool::<u8, _>::with_allocator(alloc.clone());
    assert!(Arc::ptr_eq(&pool.allocator(), &alloc));
}

#[test]
fn failed_growth_leaves_pool_unchanged() {
    let alloc = Arc::new(Counting::default());
    let pool = Builder::with_allocator(alloc.clone())
        .capacity(2)
        .build()
        .unwrap();
    pool.push(String::from("a")).unwrap();

    alloc.fail.store(true, SeqCst);
    // A vacant slot is still there, so no allocation is needed.
    pool.push(String::from("b")).unwrap();

    let err = pool.push(String::from("c")).unwrap_err();
    assert!(matches!(err, PoolError::Alloc { .. }));
    assert_eq!(pool.capacity(), 2);
    assert_eq!(pool.size(), 2);
    assert_eq!(pool.managed_count(), 2);

    assert!(pool.reserve(10).is_err());
    assert!(pool.resize_default(3).is_err());
    let _a = pool.acquire();
    let _b = pool.acquire();
    assert!(pool.allocate(String::new).is_err());
    assert_eq!(pool.capacity(), 2);
    assert_eq!(pool.managed_count(), 2);
    assert_eq!(pool.lent(), 2);

    alloc.fail.store(false, SeqCst);
    pool.push(String::from("c")).unwrap();
    assert_eq!(pool.capacity(), 4);
    assert_eq!(pool.size(), 1);
}

#[test]
fn failed_build_reports_error() {
    let alloc = Counting::default();
    alloc.fail.store(true, SeqCst);
    let err = Builder::<u64, _>::with_allocator(&alloc)
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("failed to allocate {} bytes of slot storage", 4 * 8)
    );
}

#[test]
fn oversized_reserve_is_rejected() {
    let pool = ObjectPool::<u64>::new();
    assert!(pool.reserve(usize::MAX).is_err());
    assert_eq!(pool.capacity(), 4);
}

#[test]
fn lent_storage_is_leaked_not_freed() {
    let alloc = Arc::new(Counting::default());
    let pool = ObjectPool::with_allocator(alloc.clone());
    for i in 0..5_u32 {
        pool.push(i).unwrap();
    }
    assert_eq!(alloc.live_blocks.load(SeqCst), 2);

    // The last pushed object lives in the second block.
    let entry = pool.acquire();
    assert_eq!(*entry, 4);
    drop(pool);
    assert_eq!(alloc.live_blocks.load(SeqCst), 1);

    assert_eq!(*entry, 4);
    drop(entry);
    assert_eq!(alloc.live_blocks.load(SeqCst), 1);
}

#[test]
fn zero_sized_objects_need_no_storage() {
    let alloc = Arc::new(Counting::default());
    let pool = ObjectPool::<(), _>::with_allocator(alloc.clone());
    for _ in 0..10 {
        pool.push(()).unwrap();
    }
    let entry = pool.acquire();
    assert!(entry.is_some());
    assert_eq!(pool.size(), 9);
    assert_eq!(alloc.total_blocks.load(SeqCst), 0);
}

#[test]
fn error_messages() {
    assert_eq!(PoolError::CapacityOverflow.to_string(), "slot capacity overflow");
    assert_eq!(AllocError.to_string(), "memory allocation failed");
}
