//! Exclusive handle to one thread's generator and samplers.

use num_traits::ToPrimitive;
use rand::distributions::{WeightedError, WeightedIndex};
use rand_distr::Distribution;

use crate::distribution::{NormalSampler, SampleFloat, UniformSampler};
use crate::erased::ErasedGenerator;
use crate::error::PoolError;
use crate::generator::SplittableRng;
use crate::matrix::DenseMatrix;

/// Mutable view of slot `id` of a [`ParallelRngPool`](super::ParallelRngPool).
///
/// Handles of different slots borrow disjoint, cache-line separated
/// memory, so they can be moved to different threads and used without any
/// synchronisation. A handle cannot outlive the pool borrow that produced
/// it, which rules out using a slot across a reseed.
///
/// # Examples
///
/// ```rust
/// use prng_parallel::ParallelRngPool;
///
/// let mut pool: ParallelRngPool = ParallelRngPool::with_seed_and_threads(42, 2).unwrap();
/// let mut slot = pool.slot(1);
///
/// assert_eq!(slot.id(), 1);
/// let u = slot.uniform();
/// assert!((0.0..1.0).contains(&u));
/// let path = slot.normal_vec(16);
/// assert_eq!(path.len(), 16);
/// ```
#[derive(Debug)]
pub struct RngSlot<'a, R, F> {
    id: usize,
    generator: &'a mut R,
    uniform: &'a mut UniformSampler<F>,
    normal: &'a mut NormalSampler<F>,
}

impl<'a, R, F> RngSlot<'a, R, F>
where
    R: SplittableRng,
    F: SampleFloat,
{
    pub(super) fn new(
        id: usize,
        generator: &'a mut R,
        uniform: &'a mut UniformSampler<F>,
        normal: &'a mut NormalSampler<F>,
    ) -> Self {
        Self {
            id,
            generator,
            uniform,
            normal,
        }
    }

    /// Slot index within the pool.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// The slot's generator.
    #[inline]
    pub fn generator(&mut self) -> &mut R {
        self.generator
    }

    /// Type-erased view of the slot's generator.
    #[inline]
    pub fn generic_generator(&mut self) -> ErasedGenerator<'_> {
        ErasedGenerator::new(&mut *self.generator)
    }

    /// One raw 64-bit value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.generator.next_u64()
    }

    /// One value uniform on `[0, 1)`.
    #[inline]
    pub fn uniform(&mut self) -> F {
        self.uniform.sample(self.generator)
    }

    /// One standard normal variate.
    #[inline]
    pub fn normal(&mut self) -> F {
        self.normal.sample(self.generator)
    }

    /// Fills `out` with uniform values on `[0, 1)`.
    pub fn fill_uniform(&mut self, out: &mut [F]) {
        for value in out.iter_mut() {
            *value = self.uniform.sample(self.generator);
        }
    }

    /// Fills `out` with standard normal variates.
    pub fn fill_normal(&mut self, out: &mut [F]) {
        for value in out.iter_mut() {
            *value = self.normal.sample(self.generator);
        }
    }

    /// `n` uniform values on `[0, 1)`.
    pub fn uniform_vec(&mut self, n: usize) -> Vec<F> {
        (0..n).map(|_| self.uniform()).collect()
    }

    /// `n` standard normal variates.
    pub fn normal_vec(&mut self, n: usize) -> Vec<F> {
        (0..n).map(|_| self.normal()).collect()
    }

    /// `rows x cols` uniform values, drawn row by row.
    pub fn uniform_matrix(&mut self, rows: usize, cols: usize) -> DenseMatrix<F> {
        DenseMatrix::from_fn(rows, cols, |_, _| self.uniform())
    }

    /// `rows x cols` standard normal variates, drawn row by row.
    pub fn normal_matrix(&mut self, rows: usize, cols: usize) -> DenseMatrix<F> {
        DenseMatrix::from_fn(rows, cols, |_, _| self.normal())
    }

    /// Draws one index with probability proportional to `weights[i]`.
    ///
    /// Negative and NaN weights count as zero, so their indices are never
    /// returned.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidWeights`] if `weights` is empty, has no positive
    /// entry, or the positive entries sum to `+inf`.
    pub fn resample<W: ToPrimitive>(&mut self, weights: &[W]) -> Result<usize, PoolError> {
        let dist = categorical(weights)?;
        Ok(dist.sample(self.generator))
    }

    /// Draws `n` indices from the same categorical distribution.
    ///
    /// # Errors
    ///
    /// As [`resample`](Self::resample), checked even when `n == 0`.
    pub fn resample_n<W: ToPrimitive>(
        &mut self,
        weights: &[W],
        n: usize,
    ) -> Result<Vec<usize>, PoolError> {
        let dist = categorical(weights)?;
        Ok((0..n).map(|_| dist.sample(self.generator)).collect())
    }
}

/// Builds the categorical distribution, clamping unusable weights to zero.
///
/// The total must stay finite, so weights that are individually finite but
/// overflow when summed are rejected as well.
fn categorical<W: ToPrimitive>(weights: &[W]) -> Result<WeightedIndex<f64>, PoolError> {
    let mut sanitised = Vec::with_capacity(weights.len());
    let mut total = 0.0f64;
    for weight in weights {
        let w = weight.to_f64().unwrap_or(0.0);
        let w = if w > 0.0 { w } else { 0.0 };
        total += w;
        if !total.is_finite() {
            return Err(WeightedError::InvalidWeight.into());
        }
        sanitised.push(w);
    }
    Ok(WeightedIndex::new(sanitised)?)
}
