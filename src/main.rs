//! mortality-report - exploratory analysis of childbirth mortality
//!
//! Reads monthly and per-clinic yearly birth/death tables, prints the
//! summary statistics and writes chart documents.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing file, bad schema, empty data, etc.)
//!   2 - Data quality issues found with --strict

mod analysis;
mod charts;
mod cli;
mod config;
mod error;
mod loader;
mod models;
mod report;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use models::ReferenceRate;
use report::ReportOptions;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("mortality-report v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_report(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {:#}", e);
            eprintln!("\nError: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .mortality-report.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("{} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load, analyse and report. Returns the exit code (0 or 2).
fn run_report(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let monthly_path = config.input.monthly_path.clone();
    let yearly_path = config.input.yearly_path.clone();

    info!("Loading monthly data from {}", monthly_path.display());
    let monthly_raw = loader::load_monthly_csv(&monthly_path)?;
    info!("Loading yearly data from {}", yearly_path.display());
    let yearly_raw = loader::load_yearly_csv(&yearly_path)?;

    let dataset = analysis::load(monthly_raw, yearly_raw, &config.input.date_formats)
        .context("Failed to validate input data")?;

    // Quality findings are reported, never fatal here
    let mut quality_issues = 0usize;
    for issue in dataset.quality_issues().filter(|e| !e.is_fatal()) {
        warn!("{}", issue);
        quality_issues += 1;
    }

    let options = ReportOptions {
        monthly_source: monthly_path.display().to_string(),
        yearly_source: yearly_path.display().to_string(),
        legacy_pct_scaling: config.report.legacy_pct_scaling,
        reference: config.report.show_reference.then(|| ReferenceRate {
            label: config.report.reference_label.clone(),
            percent: config.report.reference_percent,
        }),
    };

    let report = report::build_report(&dataset, &options).context("Failed to compute statistics")?;

    let output = match args.format {
        OutputFormat::Text => report::generate_text_report(&report),
        OutputFormat::Markdown => report::generate_markdown_report(&report),
        OutputFormat::Json => report::generate_json_report(&report)?,
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report saved to {}", path.display());
        }
        None => print!("{}", output),
    }

    if config.charts.enabled {
        let documents = charts::build_charts(
            dataset.monthly(),
            dataset.yearly(),
            &report.pct_deaths,
            &config.charts,
        );
        charts::write_charts(&documents, &config.charts.output_dir)?;
    } else {
        debug!("Chart output disabled");
    }

    if config.report.strict && report.has_quality_issues() {
        eprintln!(
            "\n{} data quality issue(s) found with --strict. Failing (exit code 2).",
            quality_issues
        );
        return Ok(2);
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
