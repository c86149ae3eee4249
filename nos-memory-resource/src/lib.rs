//! NOS Memory Resource
//!
//! This crate lets subsystems (thread control blocks, stacks, kernel objects)
//! request memory from a swappable allocation backend. It includes the
//! built-in backends, the process-wide resource registry and the polymorphic
//! allocator that binds an element type to a backend.
//!
//! ```rust
//! use nos_memory_resource::{deny_all_resource, scoped_default_resource, PolymorphicAllocator};
//!
//! let alloc = PolymorphicAllocator::<u32>::default();
//! let block = alloc.allocate(8).unwrap();
//! unsafe { alloc.deallocate(block, 8) };
//!
//! {
//!     let _no_alloc = scoped_default_resource(deny_all_resource());
//!     assert!(PolymorphicAllocator::<u32>::default().allocate(1).is_err());
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// Re-export API types
pub use nos_api::error::{Error, Result};
pub use nos_api::memory::{MemoryResource, MAX_ALIGN};

pub mod polymorphic;
pub mod registry;
pub mod resource;

// Re-export commonly used types and functions
pub use polymorphic::PolymorphicAllocator;
pub use registry::{
    deny_all_resource, get_default_resource, heap_backed_resource, scoped_default_resource, set_default_resource,
    DefaultResourceGuard,
};
pub use resource::{DenyAllResource, HeapResource, MonotonicResource, PoolResource, PoolStats};
