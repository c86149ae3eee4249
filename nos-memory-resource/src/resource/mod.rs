//! Memory resource backends
//!
//! This module contains the built-in implementations of
//! [`MemoryResource`](nos_api::memory::MemoryResource).

pub mod deny;
pub mod heap;
pub mod monotonic;
pub mod pool;

pub use deny::DenyAllResource;
pub use heap::HeapResource;
pub use monotonic::MonotonicResource;
pub use pool::{PoolResource, PoolStats};
