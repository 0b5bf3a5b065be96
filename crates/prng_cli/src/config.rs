//! CLI configuration management
//!
//! Resolves the pool configuration and log level from a TOML file,
//! `PRNG_*` environment variables and command line flags.

use std::path::PathBuf;
use std::str::FromStr;

use prng_parallel::{ConfigError, PoolConfig};

use crate::{CliError, Result};

/// Environment variable holding the log level.
pub const ENV_LOG_LEVEL: &str = "PRNG_LOG_LEVEL";

/// Log levels accepted by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = CliError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(CliError::InvalidArgument(format!(
                "Unknown log level: {}. Supported: trace, debug, info, warn, error",
                s
            ))),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Configuration-related command line arguments
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Seed override
    pub seed: Option<u64>,
    /// Thread count override
    pub threads: Option<usize>,
    /// Slot alignment override
    pub alignment: Option<usize>,
    /// Log level override
    pub log_level: Option<String>,
}

/// Fully resolved CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Pool settings; unset fields fall back to pool defaults
    pub pool: PoolConfig,
    /// Log level for the tracing subscriber
    pub log_level: LogLevel,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<CliConfig> {
    build_config_with_lookup(cli, |name| std::env::var(name).ok())
}

fn build_config_with_lookup<L>(cli: &CliArgs, lookup: L) -> Result<CliConfig>
where
    L: Fn(&str) -> Option<String>,
{
    let mut config = CliConfig::default();

    if let Some(path) = &cli.config_file {
        config.pool.merge(&PoolConfig::from_file(path)?);
    }

    config.pool.merge(&PoolConfig::from_lookup(&lookup)?);
    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        config.log_level = level.parse()?;
    }

    config.pool.merge(&flag_overrides(cli)?);
    if let Some(level) = &cli.log_level {
        config.log_level = level.parse()?;
    }

    Ok(config)
}

fn flag_overrides(cli: &CliArgs) -> std::result::Result<PoolConfig, ConfigError> {
    let mut builder = PoolConfig::builder();
    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }
    if let Some(threads) = cli.threads {
        builder = builder.threads(threads);
    }
    if let Some(alignment) = cli.alignment {
        builder = builder.alignment(alignment);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn write_config(name: &str, content: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("prng_cli_{}_{}.toml", name, std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!(" warn ".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("verbose".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = build_config_with_lookup(&CliArgs::default(), lookup_from(&[])).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_env_overrides_file() {
        let path = write_config("env_over_file", "seed = 1\nthreads = 2\nalignment = 128\n");
        let cli = CliArgs {
            config_file: Some(path.clone()),
            ..CliArgs::default()
        };
        let config = build_config_with_lookup(
            &cli,
            lookup_from(&[("PRNG_THREADS", "6"), (ENV_LOG_LEVEL, "debug")]),
        )
        .unwrap();
        std::fs::remove_file(path).ok();

        assert_eq!(config.pool.seed(), Some(1));
        assert_eq!(config.pool.threads(), Some(6));
        assert_eq!(config.pool.alignment(), Some(128));
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_flags_override_env() {
        let cli = CliArgs {
            seed: Some(99),
            threads: Some(3),
            log_level: Some("error".to_string()),
            ..CliArgs::default()
        };
        let config = build_config_with_lookup(
            &cli,
            lookup_from(&[
                ("PRNG_SEED", "5"),
                ("PRNG_THREADS", "8"),
                (ENV_LOG_LEVEL, "trace"),
            ]),
        )
        .unwrap();
        assert_eq!(config.pool.seed(), Some(99));
        assert_eq!(config.pool.threads(), Some(3));
        assert_eq!(config.log_level, LogLevel::Error);
    }

    #[test]
    fn test_invalid_sources_are_rejected() {
        let zero_threads = CliArgs {
            threads: Some(0),
            ..CliArgs::default()
        };
        assert!(matches!(
            build_config_with_lookup(&zero_threads, lookup_from(&[])),
            Err(CliError::Config(ConfigError::InvalidThreadCount(0)))
        ));

        assert!(matches!(
            build_config_with_lookup(&CliArgs::default(), lookup_from(&[("PRNG_SEED", "abc")])),
            Err(CliError::Config(ConfigError::InvalidValue { .. }))
        ));

        let missing = CliArgs {
            config_file: Some(PathBuf::from("/nonexistent/prng.toml")),
            ..CliArgs::default()
        };
        assert!(matches!(
            build_config_with_lookup(&missing, lookup_from(&[])),
            Err(CliError::Config(ConfigError::FileError(_)))
        ));
    }
}
