//! Type-erased view over a borrowed generator.

use std::fmt;

use rand::{Error, RngCore};

use crate::generator::SplittableRng;

/// Uniform call/min/max surface over any concrete generator.
///
/// The wrapper borrows the generator mutably rather than copying it, so
/// draws through it advance the original, and the borrow checker ensures
/// the generator outlives the wrapper. It is single-consumer:
/// `dyn RngCore` is neither `Send` nor `Sync`.
///
/// # Examples
///
/// ```rust
/// use prng_parallel::{ErasedGenerator, Lcg64Shift, SplittableRng};
/// use rand::Rng;
///
/// let mut engine = Lcg64Shift::from_seed_u64(42);
/// let mut erased = ErasedGenerator::new(&mut engine);
/// assert_eq!(erased.min(), 0);
/// assert_eq!(erased.max(), u64::MAX);
///
/// let _raw = erased.generate();
/// let unit: f64 = erased.gen();
/// assert!((0.0..1.0).contains(&unit));
/// ```
pub struct ErasedGenerator<'a> {
    inner: &'a mut dyn RngCore,
    min: u64,
    max: u64,
}

impl<'a> ErasedGenerator<'a> {
    /// Wraps `rng`, recording its declared output bounds.
    pub fn new<R: SplittableRng>(rng: &'a mut R) -> Self {
        Self {
            inner: rng,
            min: R::MIN,
            max: R::MAX,
        }
    }

    /// Wraps any engine with explicitly supplied bounds.
    pub fn with_bounds(rng: &'a mut dyn RngCore, min: u64, max: u64) -> Self {
        Self {
            inner: rng,
            min,
            max,
        }
    }

    /// Next raw value of the wrapped generator.
    #[inline]
    pub fn generate(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Smallest value [`generate`](Self::generate) can return.
    #[inline]
    pub fn min(&self) -> u64 {
        self.min
    }

    /// Largest value [`generate`](Self::generate) can return.
    #[inline]
    pub fn max(&self) -> u64 {
        self.max
    }
}

impl RngCore for ErasedGenerator<'_> {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.inner.try_fill_bytes(dest)
    }
}

impl fmt::Debug for ErasedGenerator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedGenerator")
            .field("min", &self.min)
            .field("max", &self.max)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{Lcg64, Lcg64Shift};
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_draws_advance_the_borrowed_generator() {
        let mut reference = Lcg64Shift::new(9);
        let expected: Vec<u64> = (0..4).map(|_| reference.next_u64()).collect();

        let mut engine = Lcg64Shift::new(9);
        {
            let mut erased = ErasedGenerator::new(&mut engine);
            assert_eq!(erased.generate(), expected[0]);
            assert_eq!(erased.next_u64(), expected[1]);
        }
        assert_eq!(engine.next_u64(), expected[2]);
    }

    #[test]
    fn test_bounds_follow_engine_type() {
        let mut engine = Lcg64::new(0);
        let erased = ErasedGenerator::new(&mut engine);
        assert_eq!((erased.min(), erased.max()), (Lcg64::MIN, Lcg64::MAX));
    }

    #[test]
    fn test_with_bounds() {
        let mut step = StepRng::new(10, 5);
        let mut erased = ErasedGenerator::with_bounds(&mut step, 10, 100);
        assert_eq!(erased.min(), 10);
        assert_eq!(erased.max(), 100);
        assert_eq!(erased.generate(), 10);
        assert_eq!(erased.generate(), 15);
    }

    #[test]
    fn test_debug_hides_engine() {
        let mut engine = Lcg64Shift::new(1);
        let erased = ErasedGenerator::new(&mut engine);
        let text = format!("{:?}", erased);
        assert!(text.starts_with("ErasedGenerator"));
        assert!(text.contains("max"));
    }
}
