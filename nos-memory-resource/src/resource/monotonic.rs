//! Monotonic arena resource
//!
//! Bump allocation over a caller-provided region. Individual deallocations
//! are ignored; the whole arena is reclaimed at once with
//! [`MonotonicResource::release`].

use core::ptr::NonNull;

use nos_api::error::{out_of_memory, Result};
use nos_api::memory::{checked_align_up, MemoryResource, Size};
use nos_api::sync::{AtomicUsize, Mutex, Ordering};

/// A memory resource that only ever moves forward
pub struct MonotonicResource {
    /// Start of the region
    start: usize,
    /// One past the end of the region
    end: usize,
    /// Next free address
    next: Mutex<usize>,
    allocations: AtomicUsize,
}

impl MonotonicResource {
    /// Create a new arena over `size` bytes starting at `base`
    ///
    /// Returns `None` if the region wraps around the address space.
    ///
    /// # Safety
    ///
    /// - `base` must point to valid, contiguous, writable memory of `size` bytes
    /// - no other code may access this region while the arena is alive
    /// - the region must outlive the arena
    pub unsafe fn new(base: *mut u8, size: usize) -> Option<Self> {
        let start = base as usize;
        let end = start.checked_add(size)?;
        Some(Self {
            start,
            end,
            next: Mutex::new(start),
            allocations: AtomicUsize::new(0),
        })
    }

    /// Create an arena over a region that lives for the rest of the program
    pub fn from_static(region: &'static mut [u8]) -> Option<Self> {
        // SAFETY: the exclusive 'static borrow hands the region over to the arena.
        unsafe { Self::new(region.as_mut_ptr(), region.len()) }
    }

    /// Bytes consumed so far, alignment padding included
    pub fn used(&self) -> usize {
        *self.next.lock() - self.start
    }

    /// Size of the whole region
    pub fn capacity(&self) -> usize {
        self.end - self.start
    }

    /// Bytes still available before alignment padding
    pub fn remaining(&self) -> usize {
        self.end - *self.next.lock()
    }

    /// Number of successful allocations since creation or the last release
    pub fn allocation_count(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Reclaim every block handed out so far
    ///
    /// Taking `&mut self` guarantees no allocator still borrows the arena.
    pub fn release(&mut self) {
        *self.next.get_mut() = self.start;
        *self.allocations.get_mut() = 0;
    }
}

impl MemoryResource for MonotonicResource {
    fn do_allocate(&self, bytes: Size, align: Size) -> Result<NonNull<u8>> {
        let mut next = self.next.lock();

        let block = checked_align_up(*next, align)
            .and_then(|start| start.checked_add(bytes).map(|end| (start, end)))
            .filter(|&(_, end)| end <= self.end);
        let Some((start, end)) = block else {
            #[cfg(feature = "log")]
            log::trace!(
                "monotonic resource {:p}: {} bytes (align {}) do not fit, {} left",
                self,
                bytes,
                align,
                self.end - *next
            );
            return Err(out_of_memory(bytes, align));
        };

        *next = end;
        self.allocations.fetch_add(1, Ordering::Relaxed);
        // `start` lies inside a region whose base is non-null.
        NonNull::new(start as *mut u8).ok_or(out_of_memory(bytes, align))
    }

    unsafe fn do_deallocate(&self, _ptr: NonNull<u8>, _bytes: Size, _align: Size) {}

    fn do_is_equal(&self, other: &dyn MemoryResource) -> bool {
        // A resource embedding this one as its first field shares its address.
        other.downcast_ref::<Self>().is_some_and(|o| core::ptr::eq(self, o))
    }
}

impl core::fmt::Debug for MonotonicResource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MonotonicResource")
            .field("start", &(self.start as *const u8))
            .field("capacity", &self.capacity())
            .field("used", &self.used())
            .finish()
    }
}
