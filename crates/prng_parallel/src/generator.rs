//! Splittable 64-bit linear congruential generators.
//!
//! This module provides the [`SplittableRng`] capability trait and two
//! implementations over the same recurrence
//!
//! ```text
//! x(k+1) = a * x(k) + b   (mod 2^64)
//! ```
//!
//! - [`Lcg64`]: returns the state directly
//! - [`Lcg64Shift`]: scrambles the state with an xorshift before returning
//!   it, which hides the poor randomness of the low-order bits of a
//!   power-of-two modulus LCG
//!
//! # Leapfrog Splitting
//!
//! `split(streams, index)` turns one sequence into `streams` interleaved
//! sub-sequences: after the call, the generator yields elements
//! `index, index + streams, index + 2 * streams, ...` of the original
//! sequence. Jumping and splitting are O(log n) through square-and-multiply
//! composition of the affine step.
//!
//! # Examples
//!
//! ```rust
//! use prng_parallel::generator::{Lcg64Shift, SplittableRng};
//! use rand::RngCore;
//!
//! let mut whole = Lcg64Shift::from_seed_u64(7);
//! let sequence: Vec<u64> = (0..6).map(|_| whole.next_u64()).collect();
//!
//! let mut odd = Lcg64Shift::from_seed_u64(7);
//! odd.split(2, 1).unwrap();
//! assert_eq!(odd.next_u64(), sequence[1]);
//! assert_eq!(odd.next_u64(), sequence[3]);
//! assert_eq!(odd.next_u64(), sequence[5]);
//! ```

use rand::rngs::OsRng;
use rand::{Error, RngCore, SeedableRng};

use crate::error::SplitError;

/// Multiplier of the default parameter set.
pub const LCG64_MULTIPLIER: u64 = 18_145_460_002_477_866_997;

/// Increment of the default parameter set.
pub const LCG64_INCREMENT: u64 = 1;

/// A random number engine that can be partitioned into independent streams.
///
/// Implementors must be cheap to clone and safe to move between threads so
/// that one instance can live in every slot of a pool.
pub trait SplittableRng: RngCore + Clone + Send {
    /// Smallest value returned by `next_u64`.
    const MIN: u64;

    /// Largest value returned by `next_u64`.
    const MAX: u64;

    /// Creates an unsplit generator from a 64-bit seed.
    fn from_seed_u64(seed: u64) -> Self;

    /// Restores the unsplit parameters and seeds the state.
    fn reseed(&mut self, seed: u64);

    /// Restricts the generator to stream `index` of `streams` leapfrogged
    /// streams.
    ///
    /// # Errors
    ///
    /// - [`SplitError::InvalidStreamCount`] if `streams == 0`
    /// - [`SplitError::StreamIndexOutOfRange`] if `index >= streams`
    fn split(&mut self, streams: usize, index: usize) -> Result<(), SplitError>;
}

/// Draws a seed from the operating system entropy source.
pub fn generate_seed() -> u64 {
    OsRng.next_u64()
}

/// Affine map `x -> a * x + b` over `Z / 2^64`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Affine {
    a: u64,
    b: u64,
}

impl Affine {
    const IDENTITY: Affine = Affine { a: 1, b: 0 };

    #[inline]
    fn apply(self, x: u64) -> u64 {
        self.a.wrapping_mul(x).wrapping_add(self.b)
    }

    /// `self` after `first`.
    #[inline]
    fn after(self, first: Affine) -> Affine {
        Affine {
            a: self.a.wrapping_mul(first.a),
            b: self.a.wrapping_mul(first.b).wrapping_add(self.b),
        }
    }

    /// The map applied `n` times.
    fn pow(self, mut n: u64) -> Affine {
        let mut result = Affine::IDENTITY;
        let mut base = self;
        while n > 0 {
            if n & 1 == 1 {
                result = base.after(result);
            }
            base = base.after(base);
            n >>= 1;
        }
        result
    }

    /// Inverse of the step, defined because `a` is odd.
    fn inverse_apply(self, y: u64) -> u64 {
        y.wrapping_sub(self.b).wrapping_mul(mod_inverse(self.a))
    }
}

/// Multiplicative inverse of an odd `a` modulo 2^64 by Newton iteration.
///
/// `a * a == 1 (mod 8)` for odd `a`, so the seed is correct to three bits
/// and each step doubles the number of correct bits.
fn mod_inverse(a: u64) -> u64 {
    debug_assert!(a & 1 == 1);
    let mut inv = a;
    for _ in 0..5 {
        inv = inv.wrapping_mul(2u64.wrapping_sub(a.wrapping_mul(inv)));
    }
    inv
}

/// Shared state and split logic of both generators.
#[derive(Clone, Debug, PartialEq, Eq)]
struct LcgCore {
    step: Affine,
    state: u64,
}

impl LcgCore {
    const UNSPLIT: Affine = Affine {
        a: LCG64_MULTIPLIER,
        b: LCG64_INCREMENT,
    };

    fn new(seed: u64) -> Self {
        Self {
            step: Self::UNSPLIT,
            state: seed,
        }
    }

    #[inline]
    fn advance(&mut self) -> u64 {
        self.state = self.step.apply(self.state);
        self.state
    }

    fn jump(&mut self, steps: u64) {
        self.state = self.step.pow(steps).apply(self.state);
    }

    fn split(&mut self, streams: usize, index: usize) -> Result<(), SplitError> {
        if streams == 0 {
            return Err(SplitError::InvalidStreamCount(streams));
        }
        if index >= streams {
            return Err(SplitError::StreamIndexOutOfRange { index, streams });
        }
        if streams > 1 {
            // Land on the state that produces element `index`, switch to a
            // stride of `streams`, then step back so the next draw is it.
            self.jump(index as u64 + 1);
            self.step = self.step.pow(streams as u64);
            self.state = self.step.inverse_apply(self.state);
        }
        Ok(())
    }
}

/// Fills `dest` with little-endian words from `next`.
fn fill_bytes_with(dest: &mut [u8], mut next: impl FnMut() -> u64) {
    let mut chunks = dest.chunks_exact_mut(8);
    for chunk in &mut chunks {
        chunk.copy_from_slice(&next().to_le_bytes());
    }
    let tail = chunks.into_remainder();
    if !tail.is_empty() {
        let bytes = next().to_le_bytes();
        tail.copy_from_slice(&bytes[..tail.len()]);
    }
}

macro_rules! lcg_engine {
    ($name:ident, $output:expr) => {
        impl $name {
            /// Creates a generator in the unsplit configuration.
            #[inline]
            pub fn new(seed: u64) -> Self {
                Self {
                    core: LcgCore::new(seed),
                }
            }

            /// Advances the state by `steps` draws without producing output.
            #[inline]
            pub fn discard(&mut self, steps: u64) {
                self.core.jump(steps);
            }

            /// Current multiplier, `LCG64_MULTIPLIER^streams` after a split.
            #[inline]
            pub fn multiplier(&self) -> u64 {
                self.core.step.a
            }

            /// Current increment.
            #[inline]
            pub fn increment(&self) -> u64 {
                self.core.step.b
            }
        }

        impl RngCore for $name {
            #[inline]
            fn next_u32(&mut self) -> u32 {
                (self.next_u64() >> 32) as u32
            }

            #[inline]
            fn next_u64(&mut self) -> u64 {
                let state = self.core.advance();
                $output(state)
            }

            fn fill_bytes(&mut self, dest: &mut [u8]) {
                fill_bytes_with(dest, || self.next_u64());
            }

            fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
                self.fill_bytes(dest);
                Ok(())
            }
        }

        impl SeedableRng for $name {
            type Seed = [u8; 8];

            fn from_seed(seed: Self::Seed) -> Self {
                Self::new(u64::from_le_bytes(seed))
            }

            fn seed_from_u64(state: u64) -> Self {
                Self::new(state)
            }
        }

        impl SplittableRng for $name {
            const MIN: u64 = 0;
            const MAX: u64 = u64::MAX;

            #[inline]
            fn from_seed_u64(seed: u64) -> Self {
                Self::new(seed)
            }

            fn reseed(&mut self, seed: u64) {
                self.core = LcgCore::new(seed);
            }

            fn split(&mut self, streams: usize, index: usize) -> Result<(), SplitError> {
                self.core.split(streams, index)
            }
        }
    };
}

/// 64-bit LCG returning its raw state.
///
/// Low-order bits have short periods (bit `k` repeats every `2^(k+1)`
/// draws); prefer [`Lcg64Shift`] unless raw speed matters more.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lcg64 {
    core: LcgCore,
}

/// 64-bit LCG with an xorshift output scramble. The default pool engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lcg64Shift {
    core: LcgCore,
}

#[inline]
fn identity(state: u64) -> u64 {
    state
}

#[inline]
fn xorshift(mut t: u64) -> u64 {
    t ^= t >> 17;
    t ^= t << 31;
    t ^= t >> 8;
    t
}

lcg_engine!(Lcg64, identity);
lcg_engine!(Lcg64Shift, xorshift);

impl Default for Lcg64Shift {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Default for Lcg64 {
    fn default() -> Self {
        Self::new(0)
    }
}
