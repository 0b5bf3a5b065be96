//! Pool configuration.
//!
//! A [`PoolConfig`] can be assembled three ways:
//! - programmatically with [`PoolConfig::builder`]
//! - from `PRNG_*` environment variables with [`PoolConfig::from_env`]
//! - from a TOML file with [`PoolConfig::from_file`]
//!
//! Every field is optional; an unset field falls back to the pool default
//! (entropy seed, estimated thread count, detected cache line size).

use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// Environment variable holding the seed.
pub const ENV_SEED: &str = "PRNG_SEED";

/// Environment variable holding the thread count.
pub const ENV_THREADS: &str = "PRNG_THREADS";

/// Environment variable holding the slot alignment in bytes.
pub const ENV_ALIGNMENT: &str = "PRNG_ALIGNMENT";

/// Seed, thread count and slot alignment for a
/// [`ParallelRngPool`](crate::ParallelRngPool).
///
/// # Examples
///
/// ```rust
/// use prng_parallel::PoolConfig;
///
/// let config = PoolConfig::builder()
///     .seed(42)
///     .threads(4)
///     .alignment(128)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.seed(), Some(42));
/// assert_eq!(config.threads(), Some(4));
/// assert_eq!(config.alignment(), Some(128));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    #[serde(deserialize_with = "deserialize_seed")]
    seed: Option<u64>,
    threads: Option<usize>,
    alignment: Option<usize>,
}

impl PoolConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::default()
    }

    /// Returns the seed, if fixed.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns the thread count, if fixed.
    #[inline]
    pub fn threads(&self) -> Option<usize> {
        self.threads
    }

    /// Returns the slot alignment, if fixed.
    #[inline]
    pub fn alignment(&self) -> Option<usize> {
        self.alignment
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `threads` is 0
    /// - `alignment` is not a power of two
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(0) = self.threads {
            return Err(ConfigError::InvalidThreadCount(0));
        }
        if let Some(alignment) = self.alignment {
            if !alignment.is_power_of_two() {
                return Err(ConfigError::InvalidAlignment(alignment));
            }
        }
        Ok(())
    }

    /// Loads configuration from `PRNG_SEED`, `PRNG_THREADS` and
    /// `PRNG_ALIGNMENT`. Unset variables leave the field unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for unparseable values, or a
    /// validation error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration from an arbitrary variable lookup.
    ///
    /// [`from_env`](Self::from_env) uses the process environment.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let config = Self {
            seed: parse_var(&lookup, ENV_SEED)?,
            threads: parse_var(&lookup, ENV_THREADS)?,
            alignment: parse_var(&lookup, ENV_ALIGNMENT)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file with optional `seed`,
    /// `threads` and `alignment` keys.
    ///
    /// TOML integers are signed 64-bit, so a seed above `i64::MAX` must be
    /// written as a decimal string, e.g. `seed = "18446744073709551615"`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::FileError` if the file cannot be read or
    /// parsed, or a validation error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// As [`from_file`](Self::from_file).
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PoolConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Overlays every field set in `other` onto `self`.
    pub fn merge(&mut self, other: &PoolConfig) {
        if other.seed.is_some() {
            self.seed = other.seed;
        }
        if other.threads.is_some() {
            self.threads = other.threads;
        }
        if other.alignment.is_some() {
            self.alignment = other.alignment;
        }
    }
}

fn parse_var<L, T>(lookup: &L, name: &'static str) -> Result<Option<T>, ConfigError>
where
    L: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
    }
}

/// Builder for [`PoolConfig`].
///
/// Provides a fluent API with validation at build time.
#[derive(Clone, Debug, Default)]
pub struct PoolConfigBuilder {
    seed: Option<u64>,
    threads: Option<usize>,
    alignment: Option<usize>,
}

impl PoolConfigBuilder {
    /// Fixes the seed.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fixes the number of slots.
    #[inline]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Fixes the slot alignment in bytes.
    #[inline]
    pub fn alignment(mut self, alignment: usize) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// As [`PoolConfig::validate`].
    pub fn build(self) -> Result<PoolConfig, ConfigError> {
        let config = PoolConfig {
            seed: self.seed,
            threads: self.threads,
            alignment: self.alignment,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeedValue {
    Int(u64),
    Text(String),
}

fn deserialize_seed<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match SeedValue::deserialize(deserializer)? {
        SeedValue::Int(seed) => Ok(Some(seed)),
        SeedValue::Text(text) => text.trim().parse().map(Some).map_err(|_| {
            serde::de::Error::custom(format!(
                "seed must be an unsigned 64-bit integer, got {:?}",
                text
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_builder_defaults_unset() {
        let config = PoolConfig::builder().build().unwrap();
        assert_eq!(config, PoolConfig::default());
        assert_eq!(config.seed(), None);
        assert_eq!(config.threads(), None);
        assert_eq!(config.alignment(), None);
    }

    #[test]
    fn test_builder_rejects_zero_threads() {
        let result = PoolConfig::builder().threads(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidThreadCount(0))));
    }

    #[test]
    fn test_builder_rejects_bad_alignment() {
        let result = PoolConfig::builder().alignment(48).build();
        assert!(matches!(result, Err(ConfigError::InvalidAlignment(48))));
    }

    #[test]
    fn test_from_lookup() {
        let config = PoolConfig::from_lookup(lookup_from(&[
            (ENV_SEED, "42"),
            (ENV_THREADS, " 8 "),
        ]))
        .unwrap();
        assert_eq!(config.seed(), Some(42));
        assert_eq!(config.threads(), Some(8));
        assert_eq!(config.alignment(), None);
    }

    #[test]
    fn test_from_lookup_invalid_value() {
        let result = PoolConfig::from_lookup(lookup_from(&[(ENV_ALIGNMENT, "wide")]));
        assert_eq!(
            result,
            Err(ConfigError::InvalidValue {
                name: ENV_ALIGNMENT,
                value: "wide".to_string()
            })
        );
    }

    #[test]
    fn test_toml_deserialization() {
        let config = PoolConfig::from_toml_str(
            r#"
            seed = 7
            threads = 2
            alignment = 256
        "#,
        )
        .unwrap();
        assert_eq!(config.seed(), Some(7));
        assert_eq!(config.threads(), Some(2));
        assert_eq!(config.alignment(), Some(256));
    }

    #[test]
    fn test_partial_toml_deserialization() {
        let config = PoolConfig::from_toml_str("threads = 3").unwrap();
        assert_eq!(config.threads(), Some(3));
        assert_eq!(config.seed(), None);
    }

    #[test]
    fn test_toml_rejects_unknown_keys_and_bad_values() {
        assert!(matches!(
            PoolConfig::from_toml_str("workers = 3"),
            Err(ConfigError::FileError(_))
        ));
        assert!(matches!(
            PoolConfig::from_toml_str("alignment = 100"),
            Err(ConfigError::InvalidAlignment(100))
        ));
    }

    #[test]
    fn test_toml_seed_as_string_covers_full_u64_range() {
        let config = PoolConfig::from_toml_str("seed = \"18446744073709551615\"").unwrap();
        assert_eq!(config.seed(), Some(u64::MAX));

        assert!(matches!(
            PoolConfig::from_toml_str("seed = 18446744073709551615"),
            Err(ConfigError::FileError(_))
        ));
        assert!(matches!(
            PoolConfig::from_toml_str("seed = -1"),
            Err(ConfigError::FileError(_))
        ));
        assert!(matches!(
            PoolConfig::from_toml_str("seed = \"abc\""),
            Err(ConfigError::FileError(_))
        ));
        assert_eq!(PoolConfig::from_toml_str("seed = 42").unwrap().seed(), Some(42));
    }

    #[test]
    fn test_from_file_missing() {
        let result = PoolConfig::from_file("/nonexistent/prng.toml");
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }

    #[test]
    fn test_merge_overlays_set_fields() {
        let mut base = PoolConfig::builder().seed(1).threads(2).build().unwrap();
        let overlay = PoolConfig::builder().threads(6).alignment(64).build().unwrap();
        base.merge(&overlay);
        assert_eq!(base.seed(), Some(1));
        assert_eq!(base.threads(), Some(6));
        assert_eq!(base.alignment(), Some(64));
    }
}
