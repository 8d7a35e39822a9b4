use std::alloc::{Layout, alloc, dealloc};
use std::ptr::NonNull;
use std::sync::Arc;

use crate::AllocError;

/// Provider of the raw memory that backs pool slots.
///
/// The pool asks for one block of slots at a time, sized with
/// [`Layout::array`], and hands the same layout back when the block is released.
/// Requested layouts never have a zero size.
///
/// # Safety
///
/// A successful `allocate` must return memory that is valid for reads and writes
/// of `layout.size()` bytes, aligned to `layout.align()`, not aliased by any
/// other allocation, and that stays valid until passed to `deallocate`.
pub unsafe trait SlotAllocator {
    /// Allocate a block of memory described by `layout`.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Release a block previously returned by [`allocate`](Self::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this allocator with the same `layout`
    /// and must not have been deallocated already.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The global Rust allocator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Global;

// SAFETY: Forwards to the global allocator, which upholds the contract.
unsafe impl SlotAllocator for Global {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() != 0);
        // SAFETY: Callers never pass a zero-sized layout.
        NonNull::new(unsafe { alloc(layout) }).ok_or(AllocError)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: Forwarded from our own caller.
        unsafe { dealloc(ptr.as_ptr(), layout) }
    }
}

// SAFETY: Forwards every call to the referenced allocator.
unsafe impl<A: SlotAllocator + ?Sized> SlotAllocator for &A {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: Forwarded from our own caller.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}

// SAFETY: Forwards every call to the shared allocator.
unsafe impl<A: SlotAllocator + ?Sized> SlotAllocator for Arc<A> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: Forwarded from our own caller.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}
