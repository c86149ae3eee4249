//! Fixed-block pool resource
//!
//! This module provides a memory resource carved out of a caller-provided
//! region of fixed-size blocks. Pools are used for objects whose size is known
//! up front (thread control blocks, stacks of a fixed size, kernel objects)
//! and avoid fragmentation entirely.

use core::mem;
use core::ptr::{null_mut, NonNull};

use nos_api::error::{out_of_memory, Result};
use nos_api::memory::{checked_align_up, is_aligned, is_valid_alignment, MemoryResource, Size};
use nos_api::sync::Mutex;

/// Memory pool statistics.
///
/// Tracks usage and capacity information for a pool resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Total number of blocks in the pool.
    pub total_blocks: usize,
    /// Number of blocks currently in use.
    pub used_blocks: usize,
    /// Size of each block in bytes.
    pub block_size: usize,
    /// Total size of the pool in bytes.
    pub pool_size: usize,
}

/// Free list and counters, guarded by the pool's lock
struct PoolState {
    /// Number of used blocks
    used_blocks: usize,
    /// Free list of available blocks
    free_list: *mut u8,
}

// The free list only points into the region owned by the pool.
unsafe impl Send for PoolState {}

/// A memory resource handing out fixed-size blocks
pub struct PoolResource {
    /// Address of the first block
    base: *mut u8,
    /// Block size, a multiple of `block_align`
    block_size: usize,
    /// Alignment every block satisfies
    block_align: usize,
    /// Total number of blocks in the pool
    total_blocks: usize,
    state: Mutex<PoolState>,
}

// Blocks are handed out under `state`'s lock; the other fields are immutable.
unsafe impl Send for PoolResource {}
unsafe impl Sync for PoolResource {}

impl PoolResource {
    /// Create a new pool resource
    ///
    /// # Arguments
    ///
    /// * `base` - Start of the memory region
    /// * `size` - Size of the memory region in bytes
    /// * `block_size` - Size of each block in the pool
    /// * `alignment` - Alignment requirement for each block
    ///
    /// Returns `None` if `alignment` is not a power of two or no block fits.
    ///
    /// # Safety
    ///
    /// - `base` must point to valid, contiguous, writable memory of `size` bytes
    /// - no other code may access this region while the pool is alive
    /// - the region must outlive the pool
    pub unsafe fn new(base: *mut u8, size: usize, block_size: usize, alignment: usize) -> Option<Self> {
        if base.is_null() || !is_valid_alignment(alignment) {
            return None;
        }

        // Every free block stores the link to the next one.
        let block_align = alignment.max(mem::align_of::<*mut u8>());
        let block_size = checked_align_up(block_size.max(mem::size_of::<*mut u8>()), block_align)?;

        let start = checked_align_up(base as usize, block_align)?;
        let skipped = start - base as usize;
        let usable = size.checked_sub(skipped)?;
        let total_blocks = usable / block_size;
        if total_blocks == 0 {
            return None;
        }

        let base = unsafe { base.add(skipped) };

        // Chain all blocks together in the free list
        let mut free_list = null_mut();
        for i in (0..total_blocks).rev() {
            unsafe {
                let block = base.add(i * block_size);
                block.cast::<*mut u8>().write(free_list);
                free_list = block;
            }
        }

        Some(Self {
            base,
            block_size,
            block_align,
            total_blocks,
            state: Mutex::new(PoolState { used_blocks: 0, free_list }),
        })
    }

    /// Create a pool over a region that lives for the rest of the program
    pub fn from_static(region: &'static mut [u8], block_size: usize, alignment: usize) -> Option<Self> {
        // SAFETY: the exclusive 'static borrow hands the region over to the pool.
        unsafe { Self::new(region.as_mut_ptr(), region.len(), block_size, alignment) }
    }

    /// Get pool statistics
    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        PoolStats {
            total_blocks: self.total_blocks,
            used_blocks: state.used_blocks,
            block_size: self.block_size,
            pool_size: self.total_blocks * self.block_size,
        }
    }

    /// Get the block size used by this pool
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Get the alignment every block satisfies
    pub fn block_align(&self) -> usize {
        self.block_align
    }

    /// Check if no block is in use
    pub fn is_empty(&self) -> bool {
        self.state.lock().used_blocks == 0
    }

    /// Check if every block is in use
    pub fn is_full(&self) -> bool {
        self.state.lock().used_blocks == self.total_blocks
    }

    fn owns(&self, ptr: *mut u8) -> bool {
        let addr = ptr as usize;
        let base = self.base as usize;
        addr >= base
            && addr < base + self.total_blocks * self.block_size
            && (addr - base) % self.block_size == 0
    }
}

impl MemoryResource for PoolResource {
    fn do_allocate(&self, bytes: Size, align: Size) -> Result<NonNull<u8>> {
        if bytes > self.block_size || align > self.block_align {
            return Err(out_of_memory(bytes, align));
        }

        let mut state = self.state.lock();
        let Some(block) = NonNull::new(state.free_list) else {
            #[cfg(feature = "log")]
            log::trace!("pool resource {:p}: exhausted ({} blocks)", self, self.total_blocks);
            return Err(out_of_memory(bytes, align));
        };

        // SAFETY: free blocks hold the link to the next free block.
        state.free_list = unsafe { block.as_ptr().cast::<*mut u8>().read() };
        state.used_blocks += 1;
        debug_assert!(is_aligned(block.as_ptr() as usize, align));
        Ok(block)
    }

    unsafe fn do_deallocate(&self, ptr: NonNull<u8>, bytes: Size, align: Size) {
        debug_assert!(self.owns(ptr.as_ptr()), "pool resource: foreign block");
        debug_assert!(bytes <= self.block_size && align <= self.block_align);

        let mut state = self.state.lock();
        unsafe {
            // SAFETY: the block belongs to this pool and is no longer in use.
            ptr.as_ptr().cast::<*mut u8>().write(state.free_list);
        }
        state.free_list = ptr.as_ptr();
        state.used_blocks = state.used_blocks.saturating_sub(1);
    }

    fn do_is_equal(&self, other: &dyn MemoryResource) -> bool {
        // A resource embedding this one as its first field shares its address.
        other.downcast_ref::<Self>().is_some_and(|o| core::ptr::eq(self, o))
    }
}

impl core::fmt::Debug for PoolResource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PoolResource")
            .field("base", &self.base)
            .field("block_size", &self.block_size)
            .field("block_align", &self.block_align)
            .field("total_blocks", &self.total_blocks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn region(bytes: usize) -> &'static mut [u8] {
        vec![0u8; bytes].leak()
    }

    #[test]
    fn test_pool_resource() {
        let pool = PoolResource::from_static(region(1024), 64, 8).unwrap();
        let r: &dyn MemoryResource = &pool;

        // Allocate some blocks
        let ptr1 = r.allocate(64, 8).unwrap();
        let ptr2 = r.allocate(32, 8).unwrap();
        let ptr3 = r.allocate(1, 1).unwrap();
        assert_ne!(ptr1, ptr2);
        assert_ne!(ptr2, ptr3);

        // Check that pool stats are correct
        assert_eq!(pool.stats().used_blocks, 3);

        // Deallocate a block and get it back
        unsafe { r.deallocate(ptr2, 32, 8) };
        assert_eq!(pool.stats().used_blocks, 2);
        let ptr4 = r.allocate(16, 8).unwrap();
        assert_eq!(ptr4, ptr2);

        unsafe {
            r.deallocate(ptr1, 64, 8);
            r.deallocate(ptr3, 1, 1);
            r.deallocate(ptr4, 16, 8);
        }
        assert!(pool.is_empty());
    }

    #[test]
    fn test_pool_exhaustion() {
        let pool = PoolResource::from_static(region(256), 64, 64).unwrap();
        let r: &dyn MemoryResource = &pool;
        let total = pool.stats().total_blocks;
        assert!(total >= 3);

        let blocks: Vec<_> = (0..total).map(|_| r.allocate(64, 64).unwrap()).collect();
        assert!(pool.is_full());
        assert!(r.allocate(8, 8).unwrap_err().is_out_of_memory());

        for block in blocks {
            assert!(is_aligned(block.as_ptr() as usize, 64));
            unsafe { r.deallocate(block, 64, 64) };
        }
        assert!(pool.is_empty());
    }

    #[test]
    fn test_pool_rejects_unfit_requests() {
        let pool = PoolResource::from_static(region(512), 48, 16).unwrap();
        let r: &dyn MemoryResource = &pool;
        assert!(r.allocate(49, 8).unwrap_err().is_out_of_memory());
        assert!(r.allocate(16, 32).unwrap_err().is_out_of_memory());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_pool_geometry() {
        let pool = PoolResource::from_static(region(1024), 1, 1).unwrap();
        assert_eq!(pool.block_size(), mem::size_of::<*mut u8>());
        assert_eq!(pool.block_align(), mem::align_of::<*mut u8>());

        assert!(PoolResource::from_static(region(16), 64, 8).is_none());
        assert!(PoolResource::from_static(region(1024), 64, 3).is_none());
    }

    #[test]
    fn test_pool_equality_is_identity() {
        let a = PoolResource::from_static(region(256), 32, 8).unwrap();
        let b = PoolResource::from_static(region(256), 32, 8).unwrap();
        let (a, b): (&dyn MemoryResource, &dyn MemoryResource) = (&a, &b);
        assert!(*a == *a);
        assert!(*a != *b);
        assert!(*b != *a);
    }

    /// Shares the address of the pool it embeds
    #[repr(C)]
    struct Tagged {
        pool: PoolResource,
        tag: u32,
    }

    impl MemoryResource for Tagged {
        fn do_allocate(&self, bytes: Size, align: Size) -> Result<NonNull<u8>> {
            let pool: &dyn MemoryResource = &self.pool;
            pool.allocate(bytes, align)
        }

        unsafe fn do_deallocate(&self, ptr: NonNull<u8>, bytes: Size, align: Size) {
            let pool: &dyn MemoryResource = &self.pool;
            unsafe { pool.deallocate(ptr, bytes, align) }
        }

        fn do_is_equal(&self, other: &dyn MemoryResource) -> bool {
            other.is::<Tagged>() && core::ptr::addr_eq(self, other)
        }
    }

    #[test]
    fn test_pool_equality_ignores_embedding_wrapper() {
        let tagged = Tagged {
            pool: PoolResource::from_static(region(256), 32, 8).unwrap(),
            tag: 7,
        };
        let pool: &dyn MemoryResource = &tagged.pool;
        let wrapper: &dyn MemoryResource = &tagged;
        assert!(core::ptr::addr_eq(pool, wrapper));
        assert_eq!(tagged.tag, 7);

        assert!(!pool.is_equal(wrapper));
        assert_eq!(pool.is_equal(wrapper), wrapper.is_equal(pool));
        assert!(*pool != *wrapper);
        assert!(*wrapper != *pool);
        assert!(pool.is_equal(pool));
    }
}
