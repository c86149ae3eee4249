//! NOS API - Core interfaces and types for NOS memory resources
//!
//! This crate provides the interfaces and types shared by every allocation
//! backend and by the subsystems that consume them (thread control blocks,
//! stacks, kernel objects).
//!
//! # Architecture
//!
//! - **Error**: the error taxonomy and `Result` alias
//! - **Memory**: the `MemoryResource` capability and alignment arithmetic
//! - **Sync**: lock primitives usable without an operating system
//!
//! # Usage
//!
//! ```rust
//! use core::ptr::NonNull;
//! use nos_api::error::{out_of_memory, Result};
//! use nos_api::memory::MemoryResource;
//!
//! struct Nothing;
//!
//! impl MemoryResource for Nothing {
//!     fn do_allocate(&self, bytes: usize, align: usize) -> Result<NonNull<u8>> {
//!         Err(out_of_memory(bytes, align))
//!     }
//!
//!     unsafe fn do_deallocate(&self, _ptr: NonNull<u8>, _bytes: usize, _align: usize) {}
//!
//!     fn do_is_equal(&self, other: &dyn MemoryResource) -> bool {
//!         other.is::<Nothing>()
//!     }
//! }
//!
//! let resource: &dyn MemoryResource = &Nothing;
//! assert!(resource.allocate(16, 8).is_err());
//! assert!(*resource == *resource);
//! ```

#![no_std]
#![warn(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod memory;
pub mod sync;

// Re-export commonly used types
pub use crate::error::{Error, Result};
pub use crate::memory::interface::MemoryResource;
