//! Report rendering.
//!
//! This module turns a computed `Report` into console text, Markdown or
//! JSON. Only formatting happens here; every number comes from the engine.

use crate::models::{ClinicSummary, QualityFlags, Report, TableShape};
use anyhow::Result;

/// Generate the console report.
pub fn generate_text_report(report: &Report) -> String {
    let mut output = String::new();
    let shape = &report.shape;

    output.push_str(&format!("Monthly data shape: {}\n", shape_tuple(&shape.monthly)));
    output.push_str(&format!("Yearly data shape: {}\n", shape_tuple(&shape.yearly)));
    output.push_str(&format!("\nMonthly columns: {:?}\n", shape.monthly.columns));
    output.push_str(&format!("Yearly columns: {:?}\n", shape.yearly.columns));
    output.push_str(&format!("\nYears in yearly dataset: {:?}\n", shape.unique_years));

    output.push_str(&format!("\nMonthly NaNs: {}\n", report.monthly_quality.has_nulls));
    output.push_str(&format!("Yearly NaNs: {}\n", report.yearly_quality.has_nulls));
    output.push_str(&format!("Monthly duplicates: {}\n", report.monthly_quality.has_duplicates));
    output.push_str(&format!("Yearly duplicates: {}\n", report.yearly_quality.has_duplicates));

    output.push_str(&format!(
        "\nAverage births per month: {}\n",
        report.mean_monthly_births
    ));
    output.push_str(&format!(
        "Average deaths per month: {}\n",
        report.mean_monthly_deaths
    ));

    output.push_str(&format!(
        "\nPercentage of women dying in childbirth: {:.3}%\n",
        report.overall_mortality_rate
    ));
    if let Some(ref reference) = report.reference {
        output.push_str(&format!("Compare to {}: {}%\n", reference.label, reference.percent));
    }

    output.push('\n');
    for clinic in &report.clinics {
        output.push_str(&format!("Total births {}: {}\n", clinic.clinic, clinic.total_births));
    }
    for clinic in &report.clinics {
        output.push_str(&format!("Highest deaths {}: {}\n", clinic.clinic, clinic.max_deaths));
    }

    output.push('\n');
    for clinic in &report.clinics {
        output.push_str(&format!(
            "Average death rate in {}: {:.2}%\n",
            clinic.clinic, clinic.mortality_rate
        ));
    }
    let legacy = legacy_suffix(report);
    for clinic in &report.clinics {
        output.push_str(&format!(
            "Highest yearly death rate {}: {:.2}%{}\n",
            clinic.clinic, clinic.max_pct_deaths, legacy
        ));
    }

    output.push_str(&generate_observations(report));

    output
}

/// Closing summary restating the per-clinic figures.
fn generate_observations(report: &Report) -> String {
    let clinics = &report.clinics;
    let mut section = String::new();
    if clinics.is_empty() {
        return section;
    }

    section.push_str("\nObservations:\n");

    if let (Some(births), Some(deaths)) = (
        clinics.iter().max_by_key(|c| c.total_births),
        clinics.iter().max_by_key(|c| c.total_deaths),
    ) {
        section.push_str(&format!(
            "- Most births: {} ({}). Most deaths: {} ({}).\n",
            births.clinic, births.total_births, deaths.clinic, deaths.total_deaths
        ));
    }

    let averages: Vec<String> = clinics
        .iter()
        .map(|c| format!("{} {:.2}%", c.clinic, c.mortality_rate))
        .collect();
    section.push_str(&format!("- Average death rate: {}.\n", averages.join(", ")));

    let highest: Vec<String> = clinics
        .iter()
        .map(|c| format!("{} {:.2}%", c.clinic, c.max_pct_deaths))
        .collect();
    section.push_str(&format!(
        "- Highest mortality year: {}.{}\n",
        highest.join(", "),
        legacy_suffix(report)
    ));

    if let Some(lowest) = clinics
        .iter()
        .min_by(|a, b| a.mortality_rate.total_cmp(&b.mortality_rate))
    {
        section.push_str(&format!("- Lowest average death rate: {}.\n", lowest.clinic));
    }

    section
}

fn legacy_suffix(report: &Report) -> &'static str {
    if report.metadata.legacy_pct_scaling {
        " (x100 legacy scaling)"
    } else {
        ""
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Childbirth Mortality Report\n\n");
    output.push_str(&generate_metadata_section(report));
    output.push_str(&generate_data_section(report));
    output.push_str(&generate_overview_section(report));
    output.push_str(&generate_clinics_section(&report.clinics, report.metadata.legacy_pct_scaling));
    output.push_str(&generate_series_section(report));

    output
}

fn generate_metadata_section(report: &Report) -> String {
    let metadata = &report.metadata;
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Monthly Data:** `{}`\n", metadata.monthly_source));
    section.push_str(&format!("- **Yearly Data:** `{}`\n", metadata.yearly_source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if metadata.legacy_pct_scaling {
        section.push_str("- **Legacy Scaling:** highest yearly death rates are multiplied by 100\n");
    }
    section.push('\n');

    section
}

fn generate_data_section(report: &Report) -> String {
    let shape = &report.shape;
    let mut section = String::new();

    section.push_str("## Data\n\n");
    section.push_str("| Table | Rows | Columns | Nulls | Duplicates | Deaths > Births |\n");
    section.push_str("|:---|:---:|:---|:---:|:---:|:---:|\n");
    section.push_str(&table_row("Monthly", &shape.monthly, &report.monthly_quality));
    section.push_str(&table_row("Yearly", &shape.yearly, &report.yearly_quality));
    section.push('\n');

    let years: Vec<String> = shape.unique_years.iter().map(|y| y.to_string()).collect();
    section.push_str(&format!("**Years:** {}\n\n", years.join(", ")));

    section
}

fn table_row(name: &str, shape: &TableShape, quality: &QualityFlags) -> String {
    format!(
        "| {} | {} | {} | {} | {} | {} |\n",
        name,
        shape.rows,
        shape.columns.join(", "),
        quality.null_rows,
        quality.duplicate_rows,
        quality.deaths_exceed_births
    )
}

fn generate_overview_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str(&format!(
        "- **Average births per month:** {:.2}\n",
        report.mean_monthly_births
    ));
    section.push_str(&format!(
        "- **Average deaths per month:** {:.2}\n",
        report.mean_monthly_deaths
    ));
    section.push_str(&format!(
        "- **Overall mortality:** {:.3}%\n",
        report.overall_mortality_rate
    ));
    if let Some(ref reference) = report.reference {
        section.push_str(&format!(
            "- **{}:** {}%\n",
            reference.label, reference.percent
        ));
    }
    section.push('\n');

    section
}

fn generate_clinics_section(clinics: &[ClinicSummary], legacy: bool) -> String {
    let mut section = String::new();

    section.push_str("## Clinics\n\n");
    if clinics.is_empty() {
        section.push_str("No clinic rows were loaded.\n\n");
        return section;
    }

    let max_header = if legacy {
        "Highest Yearly Rate (x100)"
    } else {
        "Highest Yearly Rate"
    };
    section.push_str(&format!(
        "| Clinic | Births | Deaths | Highest Deaths | Death Rate | {} |\n",
        max_header
    ));
    section.push_str("|:---|---:|---:|---:|---:|---:|\n");
    for clinic in clinics {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {:.2}% | {:.2}% |\n",
            clinic.clinic,
            clinic.total_births,
            clinic.total_deaths,
            clinic.max_deaths,
            clinic.mortality_rate,
            clinic.max_pct_deaths
        ));
    }
    section.push('\n');

    section
}

fn generate_series_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Yearly Death Percentage\n\n");
    section.push_str("| Year | Clinic | Deaths % |\n");
    section.push_str("|:---:|:---|---:|\n");
    for stat in &report.pct_deaths {
        section.push_str(&format!(
            "| {} | {} | {:.2} |\n",
            stat.year, stat.clinic, stat.pct_deaths
        ));
    }
    section.push('\n');

    section
}

fn shape_tuple(shape: &TableShape) -> String {
    format!("({}, {})", shape.rows, shape.columns.len())
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
