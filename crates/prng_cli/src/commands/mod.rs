//! CLI command implementations
//!
//! Each submodule implements a specific CLI command. Commands write their
//! results to the supplied writer; diagnostics go through `tracing`.

pub mod info;
pub mod resample;
pub mod sample;

use std::io::Write;

use crate::{CliError, Result};

/// Output layout shared by the sampling commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One value per line
    Lines,
    /// One comma-separated row per slot
    Csv,
}

impl OutputFormat {
    /// Parse the `--format` argument
    pub fn parse(format: &str) -> Result<Self> {
        match format {
            "lines" => Ok(OutputFormat::Lines),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(CliError::InvalidArgument(format!(
                "Unknown format: {}. Supported: lines, csv",
                other
            ))),
        }
    }

    /// Write one row of values
    pub fn write_row<T, W>(&self, out: &mut W, row: &[T]) -> Result<()>
    where
        T: std::fmt::Display,
        W: Write,
    {
        match self {
            OutputFormat::Lines => {
                for value in row {
                    writeln!(out, "{}", value)?;
                }
            }
            OutputFormat::Csv => {
                let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                writeln!(out, "{}", cells.join(","))?;
            }
        }
        Ok(())
    }
}
