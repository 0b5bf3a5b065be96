//! Slot layout for cache-aligned element storage.
//!
//! A [`BlockLayout`] is the pure part of an aligned array: given a
//! power-of-two alignment and an element type, it fixes the byte stride
//! between consecutive slots and the layout of the backing buffer.
//!
//! # Memory Layout
//!
//! ```text
//! base                base + stride       base + 2 * stride
//! |  T  | padding     |  T  | padding     |  T  | padding     |
//! ```
//!
//! The stride is the element size rounded up to a whole number of alignment
//! blocks (at least one block, so zero-sized elements still get distinct,
//! non-sharing slots). The slot for index `i` starts at `base + i * stride`.

use std::alloc::Layout;
use std::mem;

use crate::error::AlignedArrayError;

/// Alignment and stride of the slots of an aligned array.
///
/// # Examples
///
/// ```rust
/// use prng_core::BlockLayout;
///
/// // A 24-byte element padded to 64-byte cache lines
/// let layout = BlockLayout::new::<[u64; 3]>(64).unwrap();
/// assert_eq!(layout.alignment(), 64);
/// assert_eq!(layout.block_stride(), 64);
///
/// // A 65-byte element needs two cache lines per slot
/// let layout = BlockLayout::new::<[u8; 65]>(64).unwrap();
/// assert_eq!(layout.block_stride(), 128);
///
/// // Alignments must be powers of two
/// assert!(BlockLayout::new::<u8>(48).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockLayout {
    /// log2 of the alignment.
    align_bits: u32,
    /// Bytes between consecutive slots.
    block_stride: usize,
}

impl BlockLayout {
    /// Computes the slot layout of `T` for the requested alignment.
    ///
    /// # Errors
    ///
    /// Returns [`AlignedArrayError::InvalidAlignment`] if `alignment` is not a
    /// power of two or is smaller than [`required_alignment`](Self::required_alignment).
    pub fn new<T>(alignment: usize) -> Result<Self, AlignedArrayError> {
        let required = Self::required_alignment::<T>();
        if !alignment.is_power_of_two() || alignment < required {
            return Err(AlignedArrayError::InvalidAlignment {
                alignment,
                required,
            });
        }

        let align_bits = alignment.trailing_zeros();
        let blocks = mem::size_of::<T>().div_ceil(alignment).max(1);

        Ok(Self {
            align_bits,
            block_stride: blocks << align_bits,
        })
    }

    /// Smallest alignment accepted for `T`: the larger of its natural
    /// alignment and the size of a pointer.
    #[inline]
    pub const fn required_alignment<T>() -> usize {
        let natural = mem::align_of::<T>();
        let pointer = mem::size_of::<*const ()>();
        if natural > pointer {
            natural
        } else {
            pointer
        }
    }

    /// Returns the slot alignment in bytes.
    #[inline]
    pub fn alignment(&self) -> usize {
        1usize << self.align_bits
    }

    /// Returns log2 of the slot alignment.
    #[inline]
    pub fn align_bits(&self) -> u32 {
        self.align_bits
    }

    /// Returns the number of bytes between consecutive slots.
    #[inline]
    pub fn block_stride(&self) -> usize {
        self.block_stride
    }

    /// Byte offset of slot `index` from the start of the buffer.
    #[inline]
    pub fn offset_of(&self, index: usize) -> usize {
        index * self.block_stride
    }

    /// Layout of a buffer holding `capacity` slots.
    ///
    /// # Errors
    ///
    /// Returns [`AlignedArrayError::CapacityOverflow`] if the total size
    /// overflows or exceeds `isize::MAX`.
    pub fn buffer_layout(&self, capacity: usize) -> Result<Layout, AlignedArrayError> {
        let overflow = AlignedArrayError::CapacityOverflow {
            capacity,
            stride: self.block_stride,
        };
        let size = capacity.checked_mul(self.block_stride).ok_or(overflow)?;
        Layout::from_size_align(size, self.alignment()).map_err(|_| overflow)
    }
}
