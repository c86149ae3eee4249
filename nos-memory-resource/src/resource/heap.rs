//! Heap-backed memory resource
//!
//! Forwards every request to the global allocator registered with
//! `#[global_allocator]`.

use core::alloc::Layout;
use core::ptr::NonNull;

use alloc::alloc::{alloc, dealloc};
use nos_api::error::{out_of_memory, Result};
use nos_api::memory::{MemoryResource, Size};

/// Resource that draws from the global allocator
///
/// Stateless: every `HeapResource` is interchangeable with every other one,
/// a block obtained from one may be released through another.
#[derive(Debug, Default)]
pub struct HeapResource {
    _private: (),
}

impl HeapResource {
    /// Create a new heap-backed resource
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

/// Zero-byte requests never reach the global allocator; they get a dangling
/// pointer carrying the requested alignment.
#[inline]
fn dangling(align: Size) -> NonNull<u8> {
    // `align` is a non-zero power of two, hence a valid non-null address.
    NonNull::new(core::ptr::without_provenance_mut(align)).unwrap_or(NonNull::dangling())
}

impl MemoryResource for HeapResource {
    fn do_allocate(&self, bytes: Size, align: Size) -> Result<NonNull<u8>> {
        let layout = Layout::from_size_align(bytes, align)
            .map_err(|_| out_of_memory(bytes, align))?;
        if layout.size() == 0 {
            return Ok(dangling(align));
        }

        // SAFETY: the layout has a non-zero size.
        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr).ok_or_else(|| {
            #[cfg(feature = "log")]
            log::trace!("heap resource: global allocator refused {} bytes (align {})", bytes, align);
            out_of_memory(bytes, align)
        })
    }

    unsafe fn do_deallocate(&self, ptr: NonNull<u8>, bytes: Size, align: Size) {
        if bytes == 0 {
            return;
        }
        debug_assert!(Layout::from_size_align(bytes, align).is_ok(), "heap resource: mismatched layout");
        unsafe {
            // SAFETY: the caller presents the layout used for the allocation,
            // which `do_allocate` already validated.
            let layout = Layout::from_size_align_unchecked(bytes, align);
            dealloc(ptr.as_ptr(), layout);
        }
    }

    fn do_is_equal(&self, other: &dyn MemoryResource) -> bool {
        other.is::<HeapResource>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nos_api::memory::{is_aligned, MAX_ALIGN};

    #[test]
    fn test_heap_alloc_dealloc() {
        let heap = HeapResource::new();
        let r: &dyn MemoryResource = &heap;

        for &align in &[1, 8, MAX_ALIGN, 4096] {
            let ptr = r.allocate(100, align).unwrap();
            assert!(is_aligned(ptr.as_ptr() as usize, align));
            unsafe {
                ptr.as_ptr().write_bytes(0xA5, 100);
                r.deallocate(ptr, 100, align);
            }
        }
    }

    #[test]
    fn test_zero_byte_request() {
        let r: &dyn MemoryResource = &HeapResource::new();
        let ptr = r.allocate(0, 64).unwrap();
        assert!(is_aligned(ptr.as_ptr() as usize, 64));
        unsafe { r.deallocate(ptr, 0, 64) };
    }

    #[test]
    fn test_oversized_request_is_rejected() {
        let r: &dyn MemoryResource = &HeapResource::new();
        let err = r.allocate(usize::MAX - 4, 8).unwrap_err();
        assert!(err.is_out_of_memory());
    }

    #[test]
    fn test_heap_instances_are_interchangeable() {
        let a = HeapResource::new();
        let b = HeapResource::new();
        let (a, b): (&dyn MemoryResource, &dyn MemoryResource) = (&a, &b);
        assert!(*a == *b);
        assert!(*b == *a);

        let ptr = a.allocate(32, 8).unwrap();
        unsafe { b.deallocate(ptr, 32, 8) };
    }
}
