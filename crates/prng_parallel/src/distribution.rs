//! Per-thread reusable samplers.
//!
//! One [`UniformSampler`] and one [`NormalSampler`] live in every pool slot,
//! next to that slot's generator. Both are reset whenever the generator is
//! reseeded, so a draw after reseeding depends only on the new stream.

use std::fmt;
use std::marker::PhantomData;

use num_traits::Float;
use rand::RngCore;
use rand_distr::{Distribution, Standard, StandardNormal};

/// Floating-point types the pool can sample.
///
/// Implemented for `f32` and `f64`.
pub trait SampleFloat: Float + Send + Sync + fmt::Debug + 'static {
    /// Draws a value uniformly from `[0, 1)`.
    fn standard_uniform<R: RngCore + ?Sized>(rng: &mut R) -> Self;

    /// Draws a standard normal value.
    fn standard_normal<R: RngCore + ?Sized>(rng: &mut R) -> Self;

    /// Lossless-or-nearest conversion to `f64`.
    fn as_f64(self) -> f64;
}

impl SampleFloat for f64 {
    #[inline]
    fn standard_uniform<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        Standard.sample(rng)
    }

    #[inline]
    fn standard_normal<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        StandardNormal.sample(rng)
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }
}

impl SampleFloat for f32 {
    #[inline]
    fn standard_uniform<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        Standard.sample(rng)
    }

    #[inline]
    fn standard_normal<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        StandardNormal.sample(rng)
    }

    #[inline]
    fn as_f64(self) -> f64 {
        f64::from(self)
    }
}

/// Uniform variates on `[0, 1)`.
///
/// Stateless, but kept per thread so every slot owns its complete sampling
/// kit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UniformSampler<F> {
    _marker: PhantomData<F>,
}

impl<F: SampleFloat> UniformSampler<F> {
    /// Creates a sampler.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Draws one value in `[0, 1)`.
    #[inline]
    pub fn sample<R: RngCore + ?Sized>(&mut self, rng: &mut R) -> F {
        F::standard_uniform(rng)
    }

    /// No-op; present so both samplers reset uniformly.
    #[inline]
    pub fn reset(&mut self) {}
}

/// Standard normal variates via `rand_distr::StandardNormal`.
///
/// Holds no cached variates, so every draw is a function of the generator
/// state alone; [`reset`](Self::reset) exists for symmetry with the pool's
/// reseed paths.
///
/// # Examples
///
/// ```rust
/// use prng_parallel::{Lcg64Shift, NormalSampler, SplittableRng};
///
/// let mut rng = Lcg64Shift::from_seed_u64(1);
/// let mut normal: NormalSampler<f64> = NormalSampler::new();
///
/// let z = normal.sample(&mut rng);
/// assert!(z.is_finite());
/// normal.reset();
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalSampler<F> {
    _marker: PhantomData<F>,
}

impl<F: SampleFloat> NormalSampler<F> {
    /// Creates a sampler.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Draws one standard normal variate.
    #[inline]
    pub fn sample<R: RngCore + ?Sized>(&mut self, rng: &mut R) -> F {
        F::standard_normal(rng)
    }

    /// No-op; the sampler carries no state between draws.
    #[inline]
    pub fn reset(&mut self) {}
}
