//! Thread-partitioned random number generation.
//!
//! [`ParallelRngPool`] keeps one generator, one uniform sampler and one
//! normal sampler per logical thread, each in its own
//! [`AlignedArray`](prng_core::AlignedArray) so that no two threads' state
//! shares a cache line. Generators are leapfrog-split from a single seed,
//! so slot `i` of a `T`-slot pool produces elements `i, i + T, i + 2T, ...`
//! of the sequence a lone generator with that seed would produce.
//!
//! # Access Patterns
//!
//! 1. **Implicit slot**: `pool.uniform()` and friends use the slot of the
//!    calling thread as reported by the pool's [`ThreadContext`]; outside
//!    a parallel region that is slot 0.
//!
//! 2. **Explicit handles**: [`ParallelRngPool::slots_mut`] and
//!    [`ParallelRngPool::par_for_each_slot`] hand out one [`RngSlot`] per
//!    thread, which is how parallel regions sample without sharing the
//!    pool.
//!
//! # Example
//!
//! ```rust
//! use prng_parallel::ParallelRngPool;
//!
//! let mut pool: ParallelRngPool = ParallelRngPool::with_seed_and_threads(42, 4).unwrap();
//!
//! let first = pool.uniform();
//! pool.reset().unwrap();
//! assert_eq!(pool.uniform(), first);
//!
//! let means: Vec<f64> = pool.par_map_slots(|_, mut slot| {
//!     let draws = slot.uniform_vec(1000);
//!     draws.iter().sum::<f64>() / 1000.0
//! });
//! assert_eq!(means.len(), 4);
//! ```

mod slot;

use std::fmt;

use num_traits::ToPrimitive;
use prng_core::{AlignedArray, AlignedArrayError};
use rayon::prelude::*;
use tracing::debug;

use crate::config::PoolConfig;
use crate::context::{RayonContext, ThreadContext};
use crate::distribution::{NormalSampler, SampleFloat, UniformSampler};
use crate::erased::ErasedGenerator;
use crate::error::{PoolError, SplitError};
use crate::generator::{generate_seed, Lcg64Shift, SplittableRng};
use crate::matrix::DenseMatrix;

pub use slot::RngSlot;

/// Per-thread generators and samplers on cache-line separated slots.
///
/// # Type Parameters
///
/// * `R` - Splittable engine (default [`Lcg64Shift`])
/// * `F` - Floating-point sample type (default `f64`)
/// * `C` - Source of thread identity (default [`RayonContext`])
///
/// # Invariants
///
/// - The generator, uniform and normal arrays are full and have the same
///   length, the thread count
/// - Generators were seeded with `init_seed` and split exactly once
/// - Samplers hold no state carried over from a previous seed
///
/// # Thread Safety
///
/// Sampling takes `&mut self` or an [`RngSlot`]; the borrow checker keeps
/// two threads from ever using the same slot, and reseeding cannot overlap
/// sampling.
#[derive(Clone)]
pub struct ParallelRngPool<R = Lcg64Shift, F = f64, C = RayonContext> {
    init_seed: u64,
    alignment: Option<usize>,
    generators: AlignedArray<R>,
    uniform: AlignedArray<UniformSampler<F>>,
    normal: AlignedArray<NormalSampler<F>>,
    context: C,
}

impl<R, F, C> ParallelRngPool<R, F, C>
where
    R: SplittableRng,
    F: SampleFloat,
    C: ThreadContext + Default,
{
    /// Creates a pool with an entropy seed and one slot per estimated
    /// thread.
    ///
    /// # Errors
    ///
    /// [`PoolError::Storage`] if `R` is aligned beyond the cache line size
    /// and cannot be laid out.
    pub fn new() -> Result<Self, PoolError> {
        Self::with_seed(generate_seed())
    }

    /// Creates a pool with an explicit seed and one slot per estimated
    /// thread.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new).
    pub fn with_seed(seed: u64) -> Result<Self, PoolError> {
        let context = C::default();
        let threads = context.estimate_max_threads();
        Self::with_context(seed, threads, None, context)
    }

    /// Creates a pool with an explicit seed and thread count.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidThreadCount`] if `thread_count == 0`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prng_parallel::ParallelRngPool;
    ///
    /// let pool: ParallelRngPool = ParallelRngPool::with_seed_and_threads(7, 3).unwrap();
    /// assert_eq!(pool.init_seed(), 7);
    /// assert_eq!(pool.thread_count(), 3);
    ///
    /// let empty: Result<ParallelRngPool, _> = ParallelRngPool::with_seed_and_threads(7, 0);
    /// assert!(empty.is_err());
    /// ```
    pub fn with_seed_and_threads(seed: u64, thread_count: usize) -> Result<Self, PoolError> {
        Self::with_context(seed, thread_count, None, C::default())
    }

    /// Creates a pool from a validated configuration; unset fields take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// [`PoolError::Config`] if the configuration is invalid, or a storage
    /// error if the alignment is too small for the slot types.
    pub fn from_config(config: &PoolConfig) -> Result<Self, PoolError> {
        Self::from_config_with_context(config, C::default())
    }
}

impl<R, F, C> ParallelRngPool<R, F, C>
where
    R: SplittableRng,
    F: SampleFloat,
    C: ThreadContext,
{
    /// Creates a pool with an explicit thread context.
    ///
    /// `alignment` of `None` aligns slots to the host cache line.
    ///
    /// # Errors
    ///
    /// - [`PoolError::InvalidThreadCount`] if `thread_count == 0`
    /// - [`PoolError::Storage`] for an unusable alignment
    pub fn with_context(
        seed: u64,
        thread_count: usize,
        alignment: Option<usize>,
        context: C,
    ) -> Result<Self, PoolError> {
        if thread_count == 0 {
            return Err(PoolError::InvalidThreadCount(thread_count));
        }
        let mut pool = Self {
            init_seed: seed,
            alignment,
            generators: allocate(thread_count, alignment)?,
            uniform: allocate(thread_count, alignment)?,
            normal: allocate(thread_count, alignment)?,
            context,
        };
        pool.populate(seed)?;
        Ok(pool)
    }

    /// As [`from_config`](Self::from_config) with an explicit context.
    ///
    /// # Errors
    ///
    /// As [`from_config`](Self::from_config).
    pub fn from_config_with_context(config: &PoolConfig, context: C) -> Result<Self, PoolError> {
        config.validate()?;
        let seed = config.seed().unwrap_or_else(generate_seed);
        let threads = config
            .threads()
            .unwrap_or_else(|| context.estimate_max_threads());
        Self::with_context(seed, threads, config.alignment(), context)
    }

    // ------------------------------------------------------------------------
    // Seeding
    // ------------------------------------------------------------------------

    /// Reseeds every slot from `seed` and clears all sampler state.
    ///
    /// A split generator cannot be reseeded in place, so each generator is
    /// rebuilt unsplit from `seed` and split again.
    ///
    /// # Errors
    ///
    /// Only if splitting fails, which the pool's own indices never cause.
    pub fn seed(&mut self, seed: u64) -> Result<(), PoolError> {
        self.populate(seed)
    }

    /// Restores the state right after construction (or the last reseed).
    ///
    /// # Errors
    ///
    /// As [`seed`](Self::seed).
    pub fn reset(&mut self) -> Result<(), PoolError> {
        self.populate(self.init_seed)
    }

    /// Same as [`seed`](Self::seed).
    ///
    /// # Errors
    ///
    /// As [`seed`](Self::seed).
    pub fn reset_with_seed(&mut self, seed: u64) -> Result<(), PoolError> {
        self.populate(seed)
    }

    /// Reseeds with a new number of slots, reallocating the slot arrays if
    /// the count changes. On error the pool is left unchanged.
    ///
    /// # Errors
    ///
    /// - [`PoolError::InvalidThreadCount`] if `thread_count == 0`
    /// - [`PoolError::Storage`] if the new arrays cannot be laid out
    pub fn reset_with_threads(&mut self, seed: u64, thread_count: usize) -> Result<(), PoolError> {
        if thread_count == 0 {
            return Err(PoolError::InvalidThreadCount(thread_count));
        }
        if thread_count != self.thread_count() {
            let generators = allocate(thread_count, self.alignment)?;
            let uniform = allocate(thread_count, self.alignment)?;
            let normal = allocate(thread_count, self.alignment)?;
            self.generators = generators;
            self.uniform = uniform;
            self.normal = normal;
        }
        self.populate(seed)
    }

    /// Rebuilds all three arrays at their current capacity.
    fn populate(&mut self, seed: u64) -> Result<(), PoolError> {
        self.generators.clear();
        self.uniform.clear();
        self.normal.clear();

        self.generators.fill_with(|| R::from_seed_u64(seed));
        self.uniform.fill_with(UniformSampler::new);
        self.normal.fill_with(NormalSampler::new);
        self.split_streams()?;
        self.init_seed = seed;

        debug!(
            seed,
            thread_count = self.thread_count(),
            alignment = self.alignment(),
            "rng pool seeded"
        );
        Ok(())
    }

    fn split_streams(&mut self) -> Result<(), SplitError> {
        let streams = self.generators.len();
        for (index, generator) in self.generators.iter_mut().enumerate() {
            generator.split(streams, index)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------------

    /// Seed of the current streams.
    #[inline]
    pub fn init_seed(&self) -> u64 {
        self.init_seed
    }

    /// Number of slots.
    #[inline]
    pub fn thread_count(&self) -> usize {
        self.generators.len()
    }

    /// Byte alignment of the generator slots.
    #[inline]
    pub fn alignment(&self) -> usize {
        self.generators.alignment()
    }

    /// The thread context used for implicit slot selection.
    #[inline]
    pub fn context(&self) -> &C {
        &self.context
    }

    // ------------------------------------------------------------------------
    // Slot handles
    // ------------------------------------------------------------------------

    /// Handle to slot `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id >= thread_count()`.
    pub fn slot(&mut self, id: usize) -> RngSlot<'_, R, F> {
        RngSlot::new(
            id,
            &mut self.generators[id],
            &mut self.uniform[id],
            &mut self.normal[id],
        )
    }

    /// Handle to slot `id`, or `None` if out of range.
    pub fn try_slot(&mut self, id: usize) -> Option<RngSlot<'_, R, F>> {
        let generator = self.generators.get_mut(id)?;
        let uniform = self.uniform.get_mut(id)?;
        let normal = self.normal.get_mut(id)?;
        Some(RngSlot::new(id, generator, uniform, normal))
    }

    /// Handle to the calling thread's slot.
    ///
    /// # Panics
    ///
    /// Panics if the context reports an id outside the pool, e.g. when
    /// called from a rayon pool with more threads than slots.
    pub fn current_slot(&mut self) -> RngSlot<'_, R, F> {
        let id = self.context.current_thread_id();
        self.slot(id)
    }

    /// Disjoint handles to every slot, in slot order.
    pub fn slots_mut(&mut self) -> impl ExactSizeIterator<Item = RngSlot<'_, R, F>> + '_ {
        self.generators
            .iter_mut()
            .zip(self.uniform.iter_mut())
            .zip(self.normal.iter_mut())
            .enumerate()
            .map(|(id, ((generator, uniform), normal))| RngSlot::new(id, generator, uniform, normal))
    }

    /// Runs `op(id, slot)` for every slot in parallel on the rayon pool.
    pub fn par_for_each_slot<OP>(&mut self, op: OP)
    where
        OP: Fn(usize, RngSlot<'_, R, F>) + Sync + Send,
    {
        let slots: Vec<_> = self.slots_mut().collect();
        slots
            .into_par_iter()
            .for_each(|slot| op(slot.id(), slot));
    }

    /// Runs `op(id, slot)` for every slot in parallel and collects the
    /// results in slot order.
    pub fn par_map_slots<T, OP>(&mut self, op: OP) -> Vec<T>
    where
        T: Send,
        OP: Fn(usize, RngSlot<'_, R, F>) -> T + Sync + Send,
    {
        let slots: Vec<_> = self.slots_mut().collect();
        slots
            .into_par_iter()
            .map(|slot| op(slot.id(), slot))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Sampling from the calling thread's slot
    // ------------------------------------------------------------------------

    /// The calling thread's generator.
    ///
    /// # Panics
    ///
    /// As [`current_slot`](Self::current_slot).
    pub fn generator(&mut self) -> &mut R {
        let id = self.context.current_thread_id();
        &mut self.generators[id]
    }

    /// Generator of slot `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id >= thread_count()`.
    pub fn generator_at(&mut self, id: usize) -> &mut R {
        &mut self.generators[id]
    }

    /// Type-erased view of the calling thread's generator.
    pub fn generic_generator(&mut self) -> ErasedGenerator<'_> {
        ErasedGenerator::new(self.generator())
    }

    /// One raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.generator().next_u64()
    }

    /// One value uniform on `[0, 1)`.
    pub fn uniform(&mut self) -> F {
        self.current_slot().uniform()
    }

    /// One standard normal variate.
    pub fn normal(&mut self) -> F {
        self.current_slot().normal()
    }

    /// `n` uniform values on `[0, 1)`.
    pub fn uniform_vec(&mut self, n: usize) -> Vec<F> {
        self.current_slot().uniform_vec(n)
    }

    /// `n` standard normal variates.
    pub fn normal_vec(&mut self, n: usize) -> Vec<F> {
        self.current_slot().normal_vec(n)
    }

    /// `rows x cols` uniform values, drawn row by row.
    pub fn uniform_matrix(&mut self, rows: usize, cols: usize) -> DenseMatrix<F> {
        self.current_slot().uniform_matrix(rows, cols)
    }

    /// `rows x cols` standard normal variates, drawn row by row.
    pub fn normal_matrix(&mut self, rows: usize, cols: usize) -> DenseMatrix<F> {
        self.current_slot().normal_matrix(rows, cols)
    }

    /// One index drawn with probability proportional to `weights`.
    ///
    /// # Errors
    ///
    /// See [`RngSlot::resample`].
    pub fn resample<W: ToPrimitive>(&mut self, weights: &[W]) -> Result<usize, PoolError> {
        self.current_slot().resample(weights)
    }

    /// `n` indices drawn with probability proportional to `weights`.
    ///
    /// # Errors
    ///
    /// See [`RngSlot::resample`].
    pub fn resample_n<W: ToPrimitive>(
        &mut self,
        weights: &[W],
        n: usize,
    ) -> Result<Vec<usize>, PoolError> {
        self.current_slot().resample_n(weights, n)
    }
}

fn allocate<T>(capacity: usize, alignment: Option<usize>) -> Result<AlignedArray<T>, AlignedArrayError> {
    match alignment {
        Some(alignment) => AlignedArray::new(capacity, alignment),
        None => AlignedArray::with_cache_alignment(capacity),
    }
}

impl<R, F, C: fmt::Debug> fmt::Debug for ParallelRngPool<R, F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelRngPool")
            .field("init_seed", &self.init_seed)
            .field("thread_count", &self.generators.len())
            .field("alignment", &self.generators.alignment())
            .field("context", &self.context)
            .finish()
    }
}
