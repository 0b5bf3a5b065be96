//! Resample command implementation
//!
//! Draws category indices with probability proportional to the given
//! weights.

use std::io::Write;

use prng_parallel::{ParallelRngPool, PoolConfig};
use tracing::info;

use super::OutputFormat;
use crate::{CliError, Result};

/// Run the resample command
pub fn run<W: Write>(
    config: &PoolConfig,
    weights: &[f64],
    count: usize,
    format: &str,
    out: &mut W,
) -> Result<()> {
    if weights.is_empty() {
        return Err(CliError::InvalidArgument(
            "At least one weight is required".to_string(),
        ));
    }
    let format = OutputFormat::parse(format)?;
    let mut pool: ParallelRngPool = ParallelRngPool::from_config(config)?;
    info!(categories = weights.len(), count, seed = pool.init_seed(), "Resampling");

    let indices = pool.resample_n(weights, count)?;
    format.write_row(out, &indices)?;
    Ok(())
}
