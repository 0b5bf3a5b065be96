//! # prng_core: Cache-Aligned Storage for Per-Thread State
//!
//! ## Layer 1 (Memory) Role
//!
//! prng_core is the bottom layer of the parallel RNG workspace, providing:
//! - Slot layout computation from a power-of-two alignment (`layout`)
//! - Hardware cache line size discovery (`cache_line`)
//! - [`AlignedArray`], a fixed-capacity container whose elements never share
//!   a cache line (`array`)
//! - Error types: [`AlignedArrayError`] (`error`)
//!
//! ## False Sharing
//!
//! When two threads write to different objects that live on the same cache
//! line, every write invalidates the line in the other core's cache. Padding
//! each element of an [`AlignedArray`] to a multiple of the cache line size
//! removes that traffic, so one array can hold one mutable slot per worker
//! thread.
//!
//! ## Usage Examples
//!
//! ```rust
//! use prng_core::AlignedArray;
//!
//! let mut counters: AlignedArray<u64> = AlignedArray::new(4, 64).unwrap();
//! counters.fill(0);
//!
//! for counter in counters.iter_mut() {
//!     *counter += 1;
//! }
//!
//! assert_eq!(counters.len(), 4);
//! assert_eq!(counters.block_stride(), 64);
//! assert_eq!(&counters[1] as *const u64 as usize % 64, 0);
//! ```
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other prng_* crates, with minimal external
//! dependencies:
//! - thiserror: Error derivation
//! - tracing: Diagnostics when cache line discovery falls back to defaults

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod array;
pub mod cache_line;
pub mod error;
pub mod layout;

pub use array::{AlignedArray, IntoIter, Iter, IterMut};
pub use cache_line::{cache_alignment, DEFAULT_CACHE_ALIGNMENT, MINIMUM_CACHE_ALIGNMENT};
pub use error::AlignedArrayError;
pub use layout::BlockLayout;
