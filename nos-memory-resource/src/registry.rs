//! Process-wide resource registry
//!
//! Owns the built-in singleton resources and the default-resource slot used
//! by every allocator constructed without an explicit resource.
//!
//! The slot starts out pointing at the heap-backed singleton and can never be
//! empty. It sits behind a spin `RwLock`, so concurrent reads and writes are
//! free of data races; replacing the default is still meant for setup phases.
//! A reader running in an interrupt handler that preempts a writer on the same
//! core would spin forever.

use nos_api::memory::MemoryResource;
use nos_api::sync::RwLock;

use crate::resource::{DenyAllResource, HeapResource};

static HEAP_RESOURCE: HeapResource = HeapResource::new();
static DENY_ALL_RESOURCE: DenyAllResource = DenyAllResource::new();

static DEFAULT_RESOURCE: RwLock<&'static dyn MemoryResource> = RwLock::new(&HEAP_RESOURCE);

/// Returns the resource forwarding to the global allocator
///
/// Every call returns the same object.
pub fn heap_backed_resource() -> &'static dyn MemoryResource {
    &HEAP_RESOURCE
}

/// Returns the resource whose allocations always fail
///
/// Every call returns the same object.
pub fn deny_all_resource() -> &'static dyn MemoryResource {
    &DENY_ALL_RESOURCE
}

/// Returns the current default resource
pub fn get_default_resource() -> &'static dyn MemoryResource {
    *DEFAULT_RESOURCE.read()
}

/// Installs a new default resource and returns the previous one
///
/// `None` installs [`heap_backed_resource`].
pub fn set_default_resource(resource: Option<&'static dyn MemoryResource>) -> &'static dyn MemoryResource {
    let resource = resource.unwrap_or_else(heap_backed_resource);
    let previous = core::mem::replace(&mut *DEFAULT_RESOURCE.write(), resource);

    #[cfg(feature = "log")]
    log::debug!("default memory resource: {:?} -> {:?}", previous, resource);

    previous
}

/// Restores the previous default resource when dropped
///
/// Returned by [`scoped_default_resource`].
#[must_use = "the previous default is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct DefaultResourceGuard {
    previous: &'static dyn MemoryResource,
}

impl DefaultResourceGuard {
    /// The default that will be restored
    pub fn previous(&self) -> &'static dyn MemoryResource {
        self.previous
    }
}

impl Drop for DefaultResourceGuard {
    fn drop(&mut self) {
        set_default_resource(Some(self.previous));
    }
}

/// Installs `resource` as the default until the returned guard is dropped
pub fn scoped_default_resource(resource: &'static dyn MemoryResource) -> DefaultResourceGuard {
    DefaultResourceGuard {
        previous: set_default_resource(Some(resource)),
    }
}

/// Serializes unit tests that touch the default slot
#[cfg(test)]
pub(crate) static TEST_DEFAULT_LOCK: nos_api::sync::Mutex<()> = nos_api::sync::Mutex::new(());
