//! Polymorphic allocator
//!
//! An element-typed adapter that binds a consumer to a memory resource. The
//! allocator is a small `Copy` value holding a borrowed resource; the
//! resource must outlive every allocator bound to it, which the `'r`
//! lifetime enforces.
//!
//! The allocator also implements [`allocator_api2::alloc::Allocator`], so
//! `allocator_api2` and `hashbrown` containers can run on any resource.

use core::alloc::Layout;
use core::fmt;
use core::marker::PhantomData;
use core::mem::{align_of, size_of};
use core::ptr::NonNull;

use allocator_api2::alloc::{AllocError, Allocator};
use nos_api::error::{invalid_argument, Result};
use nos_api::memory::MemoryResource;
use static_assertions::assert_impl_all;

use crate::registry::get_default_resource;

/// Allocator for `T` values drawing from a [`MemoryResource`]
pub struct PolymorphicAllocator<'r, T> {
    resource: &'r dyn MemoryResource,
    _marker: PhantomData<fn() -> T>,
}

assert_impl_all!(PolymorphicAllocator<'static, u8>: Copy, Send, Sync, Allocator);

impl<'r, T> PolymorphicAllocator<'r, T> {
    /// Create an allocator bound to `resource`
    pub const fn new(resource: &'r dyn MemoryResource) -> Self {
        Self {
            resource,
            _marker: PhantomData,
        }
    }

    /// Create an allocator for `T` sharing the resource of `other`
    pub const fn from_rebound<U>(other: &PolymorphicAllocator<'r, U>) -> Self {
        Self::new(other.resource)
    }

    /// Create an allocator for `U` sharing this allocator's resource
    pub const fn rebind<U>(&self) -> PolymorphicAllocator<'r, U> {
        PolymorphicAllocator::new(self.resource)
    }

    /// The resource this allocator is bound to
    pub fn resource(&self) -> &'r dyn MemoryResource {
        self.resource
    }

    /// Largest element count whose byte size fits in `usize`
    pub const fn max_size(&self) -> usize {
        match size_of::<T>() {
            0 => usize::MAX,
            size => usize::MAX / size,
        }
    }

    /// Allocates uninitialized storage for `n` values of `T`
    ///
    /// Fails with `InvalidArgument` when `n` exceeds [`max_size`](Self::max_size),
    /// without touching the resource.
    pub fn allocate(&self, n: usize) -> Result<NonNull<T>> {
        if n > self.max_size() {
            return Err(invalid_argument("element count exceeds max_size"));
        }
        let ptr = self.resource.allocate(n * size_of::<T>(), align_of::<T>())?;
        Ok(ptr.cast())
    }

    /// Releases storage obtained from [`allocate`](Self::allocate)
    ///
    /// # Safety
    ///
    /// - `ptr` must come from `allocate` on an allocator bound to an equal resource
    /// - `n` must be the element count passed to that call
    /// - the storage must not have been released already
    pub unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        debug_assert!(n <= self.max_size(), "deallocate with an impossible element count");
        unsafe { self.resource.deallocate(ptr.cast(), n * size_of::<T>(), align_of::<T>()) }
    }

    /// Allocates storage for one `T` and moves `value` into it
    pub fn new_object(&self, value: T) -> Result<NonNull<T>> {
        let ptr = self.allocate(1)?;
        // SAFETY: freshly allocated, properly aligned storage for one `T`.
        unsafe { ptr.as_ptr().write(value) };
        Ok(ptr)
    }

    /// Drops the object at `ptr` and releases its storage
    ///
    /// # Safety
    ///
    /// `ptr` must come from [`new_object`](Self::new_object) on an allocator
    /// bound to an equal resource, and must not be used afterwards.
    pub unsafe fn delete_object(&self, ptr: NonNull<T>) {
        unsafe {
            ptr.as_ptr().drop_in_place();
            self.deallocate(ptr, 1);
        }
    }

    /// The allocator a copied container should use
    ///
    /// Always a default-constructed allocator: the copy is bound to the
    /// current default resource, not to this allocator's resource.
    pub fn select_on_container_copy_construction(&self) -> Self {
        Self::default()
    }
}

/// Binds to the default resource current at construction time
impl<T> Default for PolymorphicAllocator<'_, T> {
    fn default() -> Self {
        Self::new(get_default_resource())
    }
}

impl<T> Clone for PolymorphicAllocator<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PolymorphicAllocator<'_, T> {}

/// Allocators are equal when their resources are, whatever the element types
impl<'a, 'b, T, U> PartialEq<PolymorphicAllocator<'b, U>> for PolymorphicAllocator<'a, T> {
    fn eq(&self, other: &PolymorphicAllocator<'b, U>) -> bool {
        *self.resource == *other.resource
    }
}

/// Raw byte allocation for containers; the element type plays no part
unsafe impl<T> Allocator for PolymorphicAllocator<'_, T> {
    fn allocate(&self, layout: Layout) -> core::result::Result<NonNull<[u8]>, AllocError> {
        let ptr = self.resource.allocate(layout.size(), layout.align()).map_err(|_| AllocError)?;
        Ok(NonNull::slice_from_raw_parts(ptr, layout.size()))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { self.resource.deallocate(ptr, layout.size(), layout.align()) }
    }
}

impl<T> fmt::Debug for PolymorphicAllocator<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolymorphicAllocator")
            .field("element", &core::any::type_name::<T>())
            .field("resource", &self.resource)
            .finish()
    }
}
