//! Memory management types

use static_assertions::const_assert;

/// Size type
pub type Size = usize;

/// Largest natural alignment of any scalar type on this platform
///
/// Used when a resource is asked for memory without an explicit alignment.
pub const MAX_ALIGN: Size = 2 * core::mem::size_of::<usize>();

const_assert!(MAX_ALIGN.is_power_of_two());
const_assert!(MAX_ALIGN >= core::mem::align_of::<u64>());

/// Memory alignment constants
pub mod alignment {
    use super::Size;
    /// 8-byte alignment
    pub const B8: Size = 8;
    /// 64-byte alignment
    pub const B64: Size = 64;
    /// 4KB alignment
    pub const KB4: Size = 4096;
}

/// Returns true if `align` is a usable alignment (non-zero power of two)
#[inline]
pub const fn is_valid_alignment(align: Size) -> bool {
    align.is_power_of_two()
}

/// Rounds `addr` up to `align`, or `None` if the result does not fit in `usize`
///
/// `align` must be a valid alignment.
#[inline]
pub const fn checked_align_up(addr: usize, align: Size) -> Option<usize> {
    debug_assert!(is_valid_alignment(align));
    match addr.checked_add(align - 1) {
        Some(bumped) => Some(bumped & !(align - 1)),
        None => None,
    }
}

/// Returns true if `addr` is a multiple of `align`
#[inline]
pub const fn is_aligned(addr: usize, align: Size) -> bool {
    addr & (align - 1) == 0
}
