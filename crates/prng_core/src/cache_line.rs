//! Hardware cache line size discovery.
//!
//! The default alignment of an [`AlignedArray`](crate::AlignedArray) is the
//! cache coherency line size of the host. On Linux it is read once from
//! sysfs; everywhere else (or when the query fails or reports something
//! implausible) [`DEFAULT_CACHE_ALIGNMENT`] is used.

use std::sync::OnceLock;

#[cfg(target_os = "linux")]
use tracing::{debug, warn};

/// Cache line size assumed when discovery is unavailable.
pub const DEFAULT_CACHE_ALIGNMENT: usize = 64;

/// Smallest discovered line size that is trusted.
pub const MINIMUM_CACHE_ALIGNMENT: usize = 16;

#[cfg(target_os = "linux")]
const COHERENCY_LINE_SIZE_PATH: &str =
    "/sys/devices/system/cpu/cpu0/cache/index0/coherency_line_size";

/// Returns the cache line size of the host, querying the OS on first use.
///
/// The result is memoised for the lifetime of the process.
///
/// # Examples
///
/// ```rust
/// use prng_core::cache_line::{cache_alignment, MINIMUM_CACHE_ALIGNMENT};
///
/// let line = cache_alignment();
/// assert!(line.is_power_of_two());
/// assert!(line >= MINIMUM_CACHE_ALIGNMENT);
/// ```
pub fn cache_alignment() -> usize {
    static CACHE_ALIGNMENT: OnceLock<usize> = OnceLock::new();
    *CACHE_ALIGNMENT.get_or_init(estimate_cache_alignment)
}

/// Queries the OS for the cache line size without memoisation.
pub fn estimate_cache_alignment() -> usize {
    #[cfg(target_os = "linux")]
    {
        match std::fs::read_to_string(COHERENCY_LINE_SIZE_PATH) {
            Ok(raw) => parse_line_size(&raw),
            Err(err) => {
                debug!(
                    path = COHERENCY_LINE_SIZE_PATH,
                    error = %err,
                    "cache line size unavailable, using default"
                );
                DEFAULT_CACHE_ALIGNMENT
            }
        }
    }

    #[cfg(not(target_os = "linux"))]
    {
        DEFAULT_CACHE_ALIGNMENT
    }
}

/// Parses a reported line size, falling back to the default when it is
/// malformed, below [`MINIMUM_CACHE_ALIGNMENT`] or not a power of two.
#[cfg(target_os = "linux")]
fn parse_line_size(raw: &str) -> usize {
    match raw.trim().parse::<usize>() {
        Ok(size) if size >= MINIMUM_CACHE_ALIGNMENT && size.is_power_of_two() => size,
        _ => {
            warn!(
                reported = raw.trim(),
                fallback = DEFAULT_CACHE_ALIGNMENT,
                "implausible cache line size reported"
            );
            DEFAULT_CACHE_ALIGNMENT
        }
    }
}
