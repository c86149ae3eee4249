//! Synchronization primitives for NOS memory resources
//!
//! Backends serialize their own bookkeeping with these spin-based locks so
//! they stay usable without an operating system underneath.

pub use spin::Mutex;
pub use spin::MutexGuard;
pub use spin::RwLock;
pub use core::sync::atomic::{AtomicUsize, Ordering};
