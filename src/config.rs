//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.mortality-report.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".mortality-report.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input file settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Chart settings.
    #[serde(default)]
    pub charts: ChartConfig,
}

/// Input table locations and parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Monthly births and deaths table.
    #[serde(default = "default_monthly_path")]
    pub monthly_path: PathBuf,

    /// Yearly births and deaths per clinic.
    #[serde(default = "default_yearly_path")]
    pub yearly_path: PathBuf,

    /// `chrono` formats tried in order for the monthly `date` column.
    #[serde(default = "crate::analysis::default_date_formats")]
    pub date_formats: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            monthly_path: default_monthly_path(),
            yearly_path: default_yearly_path(),
            date_formats: crate::analysis::default_date_formats(),
        }
    }
}

fn default_monthly_path() -> PathBuf {
    PathBuf::from("monthly_deaths.csv")
}

fn default_yearly_path() -> PathBuf {
    PathBuf::from("annual_deaths_by_clinic.csv")
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Multiply the highest yearly death percentage by 100 again when
    /// printing, as older versions of this report did.
    #[serde(default)]
    pub legacy_pct_scaling: bool,

    /// Treat data quality findings as a failure (exit code 2).
    #[serde(default)]
    pub strict: bool,

    /// Label of the benchmark rate printed next to the overall rate.
    #[serde(default = "default_reference_label")]
    pub reference_label: String,

    /// Benchmark mortality in percent.
    #[serde(default = "default_reference_percent")]
    pub reference_percent: f64,

    /// Print the benchmark next to the overall rate.
    #[serde(default = "default_true")]
    pub show_reference: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            legacy_pct_scaling: false,
            strict: false,
            reference_label: default_reference_label(),
            reference_percent: default_reference_percent(),
            show_reference: true,
        }
    }
}

fn default_reference_label() -> String {
    "US 2013".to_string()
}

fn default_reference_percent() -> f64 {
    0.018
}

/// Chart output and styling, passed explicitly to every chart builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Write chart documents at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory chart documents are written into.
    #[serde(default = "default_chart_dir")]
    pub output_dir: PathBuf,

    /// Chart width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Chart height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Title font size in points.
    #[serde(default = "default_title_font_size")]
    pub title_font_size: u32,

    /// Draw dashed grid lines.
    #[serde(default = "default_true")]
    pub grid: bool,

    /// Colour of the births series.
    #[serde(default = "default_births_color")]
    pub births_color: String,

    /// Colour of the deaths series.
    #[serde(default = "default_deaths_color")]
    pub deaths_color: String,

    /// Colour scheme used for per-clinic lines.
    #[serde(default = "default_clinic_scheme")]
    pub clinic_scheme: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: default_chart_dir(),
            width: default_width(),
            height: default_height(),
            title_font_size: default_title_font_size(),
            grid: true,
            births_color: default_births_color(),
            deaths_color: default_deaths_color(),
            clinic_scheme: default_clinic_scheme(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_chart_dir() -> PathBuf {
    PathBuf::from("charts")
}

fn default_width() -> u32 {
    1400
}

fn default_height() -> u32 {
    800
}

fn default_title_font_size() -> u32 {
    18
}

fn default_births_color() -> String {
    "skyblue".to_string()
}

fn default_deaths_color() -> String {
    "crimson".to_string()
}

fn default_clinic_scheme() -> String {
    "category10".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values given on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref monthly) = args.monthly {
            self.input.monthly_path = monthly.clone();
        }
        if let Some(ref yearly) = args.yearly {
            self.input.yearly_path = yearly.clone();
        }

        if let Some(ref dir) = args.charts_dir {
            self.charts.output_dir = dir.clone();
        }
        if args.no_charts {
            self.charts.enabled = false;
        }

        // Flags only ever switch behaviour on
        if args.legacy_pct_scaling {
            self.report.legacy_pct_scaling = true;
        }
        if args.strict {
            self.report.strict = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
