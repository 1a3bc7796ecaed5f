//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// mortality-report - exploratory report on childbirth mortality
///
/// Reads a monthly births/deaths table and a yearly per-clinic table,
/// prints summary statistics and writes chart documents.
///
/// Examples:
///   mortality-report --monthly monthly_deaths.csv --yearly annual_deaths_by_clinic.csv
///   mortality-report --format markdown --output report.md
///   mortality-report --format json --no-charts
///   mortality-report --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Monthly CSV with columns date, births, deaths
    #[arg(short, long, value_name = "FILE", env = "MORTALITY_MONTHLY")]
    pub monthly: Option<PathBuf>,

    /// Yearly CSV with columns year, births, deaths, clinic
    #[arg(short, long, value_name = "FILE", env = "MORTALITY_YEARLY")]
    pub yearly: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .mortality-report.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report format (text, markdown, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the report to this file instead of standard output
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory for chart documents
    #[arg(long, value_name = "DIR")]
    pub charts_dir: Option<PathBuf>,

    /// Do not write chart documents
    #[arg(long)]
    pub no_charts: bool,

    /// Scale the highest yearly death rates by 100 again
    ///
    /// Reproduces the figures printed by earlier versions of this report,
    /// which applied the percentage conversion twice.
    #[arg(long)]
    pub legacy_pct_scaling: bool,

    /// Exit with code 2 when nulls, duplicates or impossible rows are found
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .mortality-report.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain console text (default)
    #[default]
    Text,
    /// Markdown format
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.no_charts && self.charts_dir.is_some() {
            return Err("Cannot use both --no-charts and --charts-dir".to_string());
        }

        for (flag, path) in [("--monthly", &self.monthly), ("--yearly", &self.yearly)] {
            if let Some(path) = path {
                if path.is_dir() {
                    return Err(format!("{} expects a file, got directory: {}", flag, path.display()));
                }
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
