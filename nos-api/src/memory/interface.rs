//! Memory resource interface
//!
//! A memory resource is a polymorphic allocation backend. Backends implement
//! the three `do_*` hooks; callers go through the entry points on
//! `dyn MemoryResource`, which cannot be overridden by a backend.

use core::any::{Any, TypeId};
use core::ptr::NonNull;

use crate::error::{invalid_argument, Result};
use super::types::{is_valid_alignment, Size, MAX_ALIGN};

/// Trait for polymorphic memory resources
///
/// Implementations must be `Sync`: a resource may be shared by allocators
/// living on different execution contexts, and any bookkeeping it keeps has
/// to be serialized by the resource itself.
pub trait MemoryResource: Any + Sync + 'static {
    /// Allocates at least `bytes` bytes aligned to `align`
    ///
    /// `align` is always a non-zero power of two when called through
    /// [`allocate`](#method.allocate). Must return `Error::OutOfMemory` when
    /// the request cannot be satisfied.
    fn do_allocate(&self, bytes: Size, align: Size) -> Result<NonNull<u8>>;

    /// Releases a block obtained from [`do_allocate`](MemoryResource::do_allocate)
    ///
    /// # Safety
    ///
    /// - `ptr` must have been returned by `do_allocate` on this same resource
    /// - `bytes` and `align` must be identical to the values passed to that call
    /// - the block must not have been released already
    unsafe fn do_deallocate(&self, ptr: NonNull<u8>, bytes: Size, align: Size);

    /// Returns true if memory allocated from `self` can be released through
    /// `other` and vice versa
    ///
    /// Must be symmetric; the framework only adds the identity short-circuit.
    fn do_is_equal(&self, other: &dyn MemoryResource) -> bool;
}

impl dyn MemoryResource {
    /// Allocates `bytes` bytes aligned to `align`
    pub fn allocate(&self, bytes: Size, align: Size) -> Result<NonNull<u8>> {
        if !is_valid_alignment(align) {
            #[cfg(feature = "log")]
            log::trace!("memory resource: rejected {} bytes with alignment {}", bytes, align);
            return Err(invalid_argument("alignment must be a non-zero power of two"));
        }
        self.do_allocate(bytes, align)
    }

    /// Allocates `bytes` bytes aligned to [`MAX_ALIGN`]
    pub fn allocate_bytes(&self, bytes: Size) -> Result<NonNull<u8>> {
        self.allocate(bytes, MAX_ALIGN)
    }

    /// Releases a block obtained from [`allocate`](#method.allocate)
    ///
    /// # Safety
    ///
    /// - `ptr` must have been returned by `allocate` on this same resource
    /// - `bytes` and `align` must be identical to the values passed to that call
    /// - the block must not have been released already
    pub unsafe fn deallocate(&self, ptr: NonNull<u8>, bytes: Size, align: Size) {
        debug_assert!(is_valid_alignment(align), "deallocate with an invalid alignment");
        unsafe { self.do_deallocate(ptr, bytes, align) }
    }

    /// Releases a block obtained from [`allocate_bytes`](#method.allocate_bytes)
    ///
    /// # Safety
    ///
    /// Same contract as [`deallocate`](#method.deallocate) with `align` equal
    /// to [`MAX_ALIGN`].
    pub unsafe fn deallocate_bytes(&self, ptr: NonNull<u8>, bytes: Size) {
        unsafe { self.deallocate(ptr, bytes, MAX_ALIGN) }
    }

    /// Asks the backend whether `other` is interchangeable with `self`
    pub fn is_equal(&self, other: &dyn MemoryResource) -> bool {
        self.do_is_equal(other)
    }

    /// Returns true if `self` and `other` are the very same object
    ///
    /// Compares the address and the concrete type, so two distinct
    /// zero-sized resources placed at the same address do not alias.
    pub fn is_same_object(&self, other: &dyn MemoryResource) -> bool {
        core::ptr::addr_eq(self, other) && Any::type_id(self) == Any::type_id(other)
    }

    /// Returns true if the concrete type behind `self` is `R`
    pub fn is<R: MemoryResource>(&self) -> bool {
        Any::type_id(self) == TypeId::of::<R>()
    }

    /// Returns the concrete resource if it is of type `R`
    pub fn downcast_ref<R: MemoryResource>(&self) -> Option<&R> {
        if self.is::<R>() {
            // SAFETY: the concrete type behind the trait object is `R`.
            Some(unsafe { &*core::ptr::from_ref(self).cast::<R>() })
        } else {
            None
        }
    }
}

/// Resource equality: same object, or the backend reports them interchangeable
impl PartialEq for dyn MemoryResource {
    fn eq(&self, other: &Self) -> bool {
        self.is_same_object(other) || self.is_equal(other)
    }
}

impl core::fmt::Debug for dyn MemoryResource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "MemoryResource@{:p}", core::ptr::from_ref(self).cast::<u8>())
    }
}
