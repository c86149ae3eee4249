//! Deny-all memory resource
//!
//! Installed where dynamic allocation must not happen: every request fails
//! with `OutOfMemory`, whatever its size.

use core::ptr::NonNull;

use nos_api::error::{out_of_memory, Result};
use nos_api::memory::{MemoryResource, Size};

/// Resource whose allocation hook always fails
#[derive(Debug, Default)]
pub struct DenyAllResource {
    _private: (),
}

impl DenyAllResource {
    /// Create a new deny-all resource
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl MemoryResource for DenyAllResource {
    fn do_allocate(&self, bytes: Size, align: Size) -> Result<NonNull<u8>> {
        #[cfg(feature = "log")]
        log::trace!("deny-all resource: refused {} bytes (align {})", bytes, align);
        Err(out_of_memory(bytes, align))
    }

    unsafe fn do_deallocate(&self, _ptr: NonNull<u8>, _bytes: Size, _align: Size) {
        // Nothing was ever handed out, so any block arriving here is foreign.
        #[cfg(feature = "log")]
        log::warn!("deny-all resource: deallocation of a block it never allocated");
        #[cfg(debug_assertions)]
        panic!("deny-all resource: deallocation of a block it never allocated");
    }

    fn do_is_equal(&self, other: &dyn MemoryResource) -> bool {
        other.is::<DenyAllResource>()
    }
}
