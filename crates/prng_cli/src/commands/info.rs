//! Info command implementation
//!
//! Reports the resolved pool settings and host parallelism.

use std::io::Write;

use prng_parallel::{estimate_max_threads, ParallelRngPool, PoolConfig};
use tracing::info;

use crate::Result;

/// Run the info command
pub fn run<W: Write>(config: &PoolConfig, out: &mut W) -> Result<()> {
    info!("Resolving pool configuration...");
    let pool: ParallelRngPool = ParallelRngPool::from_config(config)?;

    let seed_source = if config.seed().is_some() {
        "configured"
    } else {
        "entropy"
    };

    writeln!(out, "generator:        lcg64-shift")?;
    writeln!(out, "seed:             {} ({})", pool.init_seed(), seed_source)?;
    writeln!(out, "threads:          {}", pool.thread_count())?;
    writeln!(out, "slot alignment:   {} bytes", pool.alignment())?;
    writeln!(out, "cache line:       {} bytes", prng_core::cache_alignment())?;
    writeln!(out, "estimated cores:  {}", estimate_max_threads())?;
    writeln!(out, "rayon workers:    {}", rayon::current_num_threads())?;
    Ok(())
}
