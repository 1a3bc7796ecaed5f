//! Report assembly and rendering.
//!
//! `build_report` collects every figure from the engine into a `Report`;
//! `generator` turns that report into text, Markdown or JSON.

pub mod generator;

pub use generator::{generate_json_report, generate_markdown_report, generate_text_report};

use crate::analysis::{self, ValidatedDataset};
use crate::error::Result;
use crate::models::{MonthlyField, ReferenceRate, Report, ReportMetadata};
use chrono::Utc;
use tracing::debug;

/// Presentation choices that do not affect the engine.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub monthly_source: String,
    pub yearly_source: String,
    /// Multiply each clinic's highest death percentage by 100.
    pub legacy_pct_scaling: bool,
    pub reference: Option<ReferenceRate>,
}

/// Compute every statistic of the report.
pub fn build_report(dataset: &ValidatedDataset, options: &ReportOptions) -> Result<Report> {
    let yearly = dataset.yearly();
    let monthly = dataset.monthly();

    let mut clinics = analysis::distinct_clinics(yearly)
        .iter()
        .map(|clinic| analysis::summarize_clinic(yearly, clinic))
        .collect::<Result<Vec<_>>>()?;

    if options.legacy_pct_scaling {
        debug!("Applying legacy scaling to highest death percentages");
        for summary in &mut clinics {
            summary.max_pct_deaths *= 100.0;
        }
    }

    Ok(Report {
        metadata: ReportMetadata {
            monthly_source: options.monthly_source.clone(),
            yearly_source: options.yearly_source.clone(),
            generated_at: Utc::now(),
            legacy_pct_scaling: options.legacy_pct_scaling,
        },
        shape: analysis::describe_shape(dataset),
        monthly_quality: dataset.monthly_quality().flags(),
        yearly_quality: dataset.yearly_quality().flags(),
        mean_monthly_births: analysis::mean_of(monthly, MonthlyField::Births)?,
        mean_monthly_deaths: analysis::mean_of(monthly, MonthlyField::Deaths)?,
        overall_mortality_rate: analysis::overall_mortality_rate(yearly)?,
        reference: options.reference.clone(),
        clinics,
        pct_deaths: analysis::compute_pct_deaths_series(yearly)?,
    })
}
