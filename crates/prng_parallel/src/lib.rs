//! # prng_parallel: Thread-Partitioned Random Number Generation
//!
//! ## Layer 2 (Sampling) Role
//!
//! prng_parallel gives every worker thread of a data-parallel computation
//! its own statistically independent generator and sampler state:
//! - Splittable LCG engines with O(log n) leapfrog splitting (`generator`)
//! - Type-erased generator view (`erased`)
//! - Per-thread uniform and normal samplers (`distribution`)
//! - Dense row-major output matrices (`matrix`)
//! - Thread identity from rayon (`context`)
//! - Pool configuration from code, environment or TOML (`config`)
//! - [`ParallelRngPool`], the per-thread slot pool (`pool`)
//!
//! ## Reproducibility
//!
//! A pool built from seed `S` with `T` slots always produces the same
//! per-slot sequences, whatever the thread scheduling: slot `i` yields
//! elements `i, i + T, i + 2T, ...` of the single-stream sequence for `S`.
//!
//! ## Usage Examples
//!
//! ```rust
//! use prng_parallel::ParallelRngPool;
//!
//! let mut pool: ParallelRngPool = ParallelRngPool::with_seed_and_threads(42, 4).unwrap();
//!
//! // Serial code samples from slot 0
//! let u = pool.uniform();
//! assert!((0.0..1.0).contains(&u));
//!
//! // Parallel regions receive one exclusive slot per task
//! pool.par_for_each_slot(|id, mut slot| {
//!     let z = slot.normal_vec(100);
//!     assert_eq!(z.len(), 100);
//!     assert!(id < 4);
//! });
//! ```
//!
//! ## Dependencies
//!
//! - prng_core: Cache-aligned slot storage
//! - rand / rand_distr: `RngCore`, distributions, entropy seeding
//! - rayon / num_cpus: Parallel execution and thread-count estimation
//! - serde / toml: Configuration files
//! - tracing: Diagnostics on pool construction and reseeding

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod context;
pub mod distribution;
pub mod erased;
pub mod error;
pub mod generator;
pub mod matrix;
pub mod pool;

pub use config::{PoolConfig, PoolConfigBuilder};
pub use context::{estimate_max_threads, FixedContext, RayonContext, ThreadContext};
pub use distribution::{NormalSampler, SampleFloat, UniformSampler};
pub use erased::ErasedGenerator;
pub use error::{ConfigError, PoolError, SplitError};
pub use generator::{generate_seed, Lcg64, Lcg64Shift, SplittableRng};
pub use matrix::DenseMatrix;
pub use pool::{ParallelRngPool, RngSlot};
