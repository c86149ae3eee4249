//! Error handling module for NOS memory resources
//!
//! Two error classes are reported: an invalid argument detected before any
//! backend is touched, and an out-of-memory condition raised by a backend.
//! Misuse of the deallocation contract is not an error, it is undefined
//! behaviour and is only checked with debug assertions.

use core::fmt;

/// Common error type used by memory resources and allocators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Invalid argument, rejected before any resource is touched
    InvalidArgument(&'static str),
    /// The resource cannot satisfy the request
    OutOfMemory {
        /// Requested size in bytes
        bytes: usize,
        /// Requested alignment in bytes
        align: usize,
    },
}

impl Error {
    /// Returns true for the out-of-memory class
    pub const fn is_out_of_memory(&self) -> bool {
        matches!(self, Error::OutOfMemory { .. })
    }

    /// Returns true for the invalid-argument class
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::OutOfMemory { bytes, align } => {
                write!(f, "Out of memory: {} bytes aligned to {}", bytes, align)
            }
        }
    }
}

impl core::error::Error for Error {}

/// Result type for operations that can fail
pub type Result<T> = core::result::Result<T, Error>;

/// Creates a new invalid argument error
pub const fn invalid_argument(msg: &'static str) -> Error {
    Error::InvalidArgument(msg)
}

/// Creates a new out of memory error for the given request
pub const fn out_of_memory(bytes: usize, align: usize) -> Error {
    Error::OutOfMemory { bytes, align }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn test_error_classes() {
        let oom = out_of_memory(64, 8);
        assert!(oom.is_out_of_memory());
        assert!(!oom.is_invalid_argument());

        let bad = invalid_argument("element count overflows");
        assert!(bad.is_invalid_argument());
        assert!(!bad.is_out_of_memory());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(out_of_memory(64, 8).to_string(), "Out of memory: 64 bytes aligned to 8");
        assert_eq!(
            invalid_argument("bad alignment").to_string(),
            "Invalid argument: bad alignment"
        );
    }
}
