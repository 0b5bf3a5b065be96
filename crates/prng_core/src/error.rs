//! Error types for aligned storage.
//!
//! This module provides:
//! - `AlignedArrayError`: Errors from array construction and checked access

use thiserror::Error;

/// Errors raised by [`AlignedArray`](crate::AlignedArray) and
/// [`BlockLayout`](crate::BlockLayout).
///
/// # Variants
/// - `InvalidAlignment`: Alignment is not a power of two or is too small
/// - `IndexOutOfRange`: Checked access past the live elements
/// - `CapacityOverflow`: Requested buffer size is not addressable
///
/// # Examples
/// ```
/// use prng_core::AlignedArrayError;
///
/// let err = AlignedArrayError::IndexOutOfRange { index: 3, len: 2 };
/// assert_eq!(
///     format!("{}", err),
///     "Index 3 out of range for aligned array of length 2"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AlignedArrayError {
    /// Alignment is not a power of two, or is smaller than the element's
    /// natural alignment or the size of a pointer.
    #[error("Invalid alignment {alignment}: must be a power of two and at least {required}")]
    InvalidAlignment {
        /// Requested alignment in bytes
        alignment: usize,
        /// Smallest alignment accepted for the element type
        required: usize,
    },

    /// Checked access to a slot at or beyond the current length.
    #[error("Index {index} out of range for aligned array of length {len}")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of live elements
        len: usize,
    },

    /// `capacity * stride` overflows or exceeds `isize::MAX`.
    #[error("Capacity {capacity} with block stride {stride} exceeds the addressable size")]
    CapacityOverflow {
        /// Requested capacity
        capacity: usize,
        /// Bytes per slot
        stride: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AlignedArrayError::InvalidAlignment {
            alignment: 48,
            required: 8,
        };
        assert!(err.to_string().contains("Invalid alignment 48"));
        assert!(err.to_string().contains("at least 8"));

        let err = AlignedArrayError::CapacityOverflow {
            capacity: usize::MAX,
            stride: 64,
        };
        assert!(err.to_string().contains("block stride 64"));
    }
}
