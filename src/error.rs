use std::alloc::{Layout, handle_alloc_error};
use std::collections::TryReserveError;

/// The backing allocator could not provide the requested memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, thiserror::Error)]
#[error("memory allocation failed")]
pub struct AllocError;

/// Errors returned by pool operations that may need to grow the slot storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The [`SlotAllocator`](crate::SlotAllocator) failed to provide a block of slots.
    #[error("failed to allocate {} bytes of slot storage", .layout.size())]
    Alloc {
        /// Layout of the block that was requested.
        layout: Layout,
        /// Error reported by the allocator.
        #[source]
        source: AllocError,
    },
    /// The requested number of slots does not fit in the address space.
    #[error("slot capacity overflow")]
    CapacityOverflow,
    /// Growing the internal free or vacant stacks failed.
    #[error("failed to reserve slot bookkeeping")]
    Bookkeeping(#[from] TryReserveError),
}

impl PoolError {
    /// Terminate the way infallible std constructors do on allocation failure.
    pub(crate) fn abort(self) -> ! {
        match self {
            PoolError::Alloc { layout, .. } => handle_alloc_error(layout),
            other => panic!("{other}"),
        }
    }
}
