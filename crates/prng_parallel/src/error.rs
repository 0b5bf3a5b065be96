//! Error types for the sampling layer.
//!
//! This module provides:
//! - `SplitError`: Invalid leapfrog split parameters
//! - `PoolError`: Pool construction, reseeding and resampling failures
//! - `ConfigError`: Invalid or unreadable pool configuration

use prng_core::AlignedArrayError;
use rand::distributions::WeightedError;
use thiserror::Error;

/// Errors from [`SplittableRng::split`](crate::SplittableRng::split).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SplitError {
    /// A split into zero streams.
    #[error("Invalid stream count {0}: must be at least 1")]
    InvalidStreamCount(usize),

    /// The selected stream does not exist.
    #[error("Stream index {index} out of range for {streams} streams")]
    StreamIndexOutOfRange {
        /// Requested stream
        index: usize,
        /// Number of streams
        streams: usize,
    },
}

/// Errors raised by [`ParallelRngPool`](crate::ParallelRngPool).
///
/// # Examples
/// ```
/// use prng_parallel::PoolError;
///
/// let err = PoolError::InvalidThreadCount(0);
/// assert_eq!(format!("{}", err), "Invalid thread count 0: must be at least 1");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoolError {
    /// Slot storage could not be laid out.
    #[error("Slot storage error: {0}")]
    Storage(#[from] AlignedArrayError),

    /// Stream splitting failed.
    #[error("Stream split error: {0}")]
    Split(#[from] SplitError),

    /// A pool needs at least one slot.
    #[error("Invalid thread count {0}: must be at least 1")]
    InvalidThreadCount(usize),

    /// The categorical distribution has no positive, finite weight.
    #[error("Invalid resampling weights: {0}")]
    InvalidWeights(#[from] WeightedError),

    /// Configuration rejected while building the pool.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Thread count of zero.
    #[error("Invalid thread count: {0}. Must be at least 1")]
    InvalidThreadCount(usize),

    /// Alignment that is not a power of two.
    #[error("Invalid alignment: {0}. Must be a power of two")]
    InvalidAlignment(usize),

    /// Unparseable value for a named setting.
    #[error("Invalid value for {name}: {value}")]
    InvalidValue {
        /// Setting name (environment variable or file key)
        name: &'static str,
        /// Offending value
        value: String,
    },

    /// Unreadable or malformed configuration file.
    #[error("Configuration file error: {0}")]
    FileError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_error_display() {
        let err = SplitError::StreamIndexOutOfRange {
            index: 4,
            streams: 4,
        };
        assert_eq!(err.to_string(), "Stream index 4 out of range for 4 streams");
        assert!(SplitError::InvalidStreamCount(0)
            .to_string()
            .contains("at least 1"));
    }

    #[test]
    fn test_pool_error_from_conversions() {
        let err: PoolError = AlignedArrayError::IndexOutOfRange { index: 1, len: 0 }.into();
        assert!(matches!(err, PoolError::Storage(_)));

        let err: PoolError = SplitError::InvalidStreamCount(0).into();
        assert!(matches!(err, PoolError::Split(_)));

        let err: PoolError = WeightedError::AllWeightsZero.into();
        assert!(err.to_string().starts_with("Invalid resampling weights"));

        let err: PoolError = ConfigError::InvalidAlignment(3).into();
        assert_eq!(err.to_string(), "Invalid alignment: 3. Must be a power of two");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            name: "PRNG_SEED",
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for PRNG_SEED: abc");
    }
}
