//! Sample command implementation
//!
//! Draws uniform or standard normal variates from a seeded pool, either
//! from the calling thread's slot or from every slot in parallel.

use std::io::Write;

use clap::ValueEnum;
use prng_parallel::{DenseMatrix, ParallelRngPool, PoolConfig};
use tracing::{debug, info};

use super::OutputFormat;
use crate::Result;

/// Distribution to sample from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Distribution {
    /// Uniform on [0, 1)
    Uniform,
    /// Standard normal
    Normal,
}

/// Shape of the requested sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `count` values from the calling thread's slot
    Single,
    /// `rows x count` matrix from the calling thread's slot
    Matrix { rows: usize },
    /// `count` values from every slot, one row per slot
    PerThread,
}

/// Run the sample command
pub fn run<W: Write>(
    config: &PoolConfig,
    distribution: Distribution,
    count: usize,
    layout: Layout,
    format: &str,
    out: &mut W,
) -> Result<()> {
    let format = OutputFormat::parse(format)?;
    let mut pool: ParallelRngPool = ParallelRngPool::from_config(config)?;
    info!(
        ?distribution,
        count,
        seed = pool.init_seed(),
        threads = pool.thread_count(),
        "Sampling"
    );

    match layout {
        Layout::Single => {
            let values = match distribution {
                Distribution::Uniform => pool.uniform_vec(count),
                Distribution::Normal => pool.normal_vec(count),
            };
            format.write_row(out, &values)?;
        }
        Layout::Matrix { rows } => {
            let matrix: DenseMatrix<f64> = match distribution {
                Distribution::Uniform => pool.uniform_matrix(rows, count),
                Distribution::Normal => pool.normal_matrix(rows, count),
            };
            for i in 0..matrix.rows() {
                format.write_row(out, matrix.row(i))?;
            }
        }
        Layout::PerThread => {
            let rows = pool.par_map_slots(|id, mut slot| {
                debug!(slot = id, "drawing slot sample");
                match distribution {
                    Distribution::Uniform => slot.uniform_vec(count),
                    Distribution::Normal => slot.normal_vec(count),
                }
            });
            for row in &rows {
                format.write_row(out, row)?;
            }
        }
    }

    info!("Sampling complete");
    Ok(())
}
