//! Memory resource module

pub mod interface;
pub mod types;

// Re-export commonly used items
pub use interface::MemoryResource;
pub use types::{alignment, checked_align_up, is_aligned, is_valid_alignment, Size, MAX_ALIGN};
