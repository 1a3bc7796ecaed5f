//! Aggregate statistics over the monthly and yearly records.
//!
//! Mortality rates come in two flavours that must not be confused:
//! `clinic_mortality_rate` and `overall_mortality_rate` divide summed deaths
//! by summed births, while `compute_pct_deaths_series` forms one ratio per
//! row.

use crate::error::{EngineError, Result};
use crate::models::{ClinicSummary, ClinicYearlyStat, MonthlyField, MonthlyRecord, YearlyClinicRecord};
use std::collections::HashSet;

/// Deaths as a percentage of births over every yearly row, all clinics together.
pub fn overall_mortality_rate(rows: &[YearlyClinicRecord]) -> Result<f64> {
    ratio_of_sums(rows, "overall mortality rate")
}

/// Arithmetic mean of one monthly column.
pub fn mean_of(rows: &[MonthlyRecord], field: MonthlyField) -> Result<f64> {
    if rows.is_empty() {
        return Err(EngineError::empty(format!("mean of monthly {}", field)));
    }
    let sum = checked_sum(rows.iter().map(|r| field.value(r)), || format!("sum of monthly {}", field))?;
    Ok(sum as f64 / rows.len() as f64)
}

/// Rows belonging to one clinic, in input order.
pub fn filter_by_clinic(rows: &[YearlyClinicRecord], clinic: &str) -> Vec<YearlyClinicRecord> {
    rows.iter().filter(|r| r.clinic == clinic).cloned().collect()
}

pub fn total_births(rows: &[YearlyClinicRecord]) -> Result<u64> {
    checked_sum(rows.iter().map(|r| r.births), || "total births".to_string())
}

pub fn total_deaths(rows: &[YearlyClinicRecord]) -> Result<u64> {
    checked_sum(rows.iter().map(|r| r.deaths), || "total deaths".to_string())
}

/// Largest yearly death count in the subset.
pub fn max_deaths(rows: &[YearlyClinicRecord]) -> Result<u64> {
    rows.iter()
        .map(|r| r.deaths)
        .max()
        .ok_or_else(|| EngineError::empty("maximum deaths"))
}

/// Deaths as a percentage of births within a single clinic's rows.
pub fn clinic_mortality_rate(rows: &[YearlyClinicRecord]) -> Result<f64> {
    ratio_of_sums(rows, "clinic mortality rate")
}

/// Per-row `deaths / births * 100`, one entry per input row.
///
/// A row with zero births fails the whole series.
pub fn compute_pct_deaths_series(rows: &[YearlyClinicRecord]) -> Result<Vec<ClinicYearlyStat>> {
    rows.iter()
        .map(|r| {
            if r.births == 0 {
                return Err(EngineError::div_zero(format!(
                    "{} in {} has zero births",
                    r.clinic, r.year
                )));
            }
            Ok(ClinicYearlyStat {
                year: r.year,
                clinic: r.clinic.clone(),
                pct_deaths: r.deaths as f64 / r.births as f64 * 100.0,
            })
        })
        .collect()
}

/// Highest `pct_deaths` in the series.
///
/// The value is already a percentage and is returned as is.
pub fn max_pct_deaths(series: &[ClinicYearlyStat]) -> Result<f64> {
    series
        .iter()
        .map(|s| s.pct_deaths)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
        .ok_or_else(|| EngineError::empty("maximum death percentage"))
}

/// Clinic ids in order of first appearance.
pub fn distinct_clinics(rows: &[YearlyClinicRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|r| seen.insert(r.clinic.as_str()))
        .map(|r| r.clinic.clone())
        .collect()
}

/// Totals, maxima and both kinds of rate for one clinic.
pub fn summarize_clinic(rows: &[YearlyClinicRecord], clinic: &str) -> Result<ClinicSummary> {
    let subset = filter_by_clinic(rows, clinic);
    let series = compute_pct_deaths_series(&subset)?;

    Ok(ClinicSummary {
        clinic: clinic.to_string(),
        total_births: total_births(&subset)?,
        total_deaths: total_deaths(&subset)?,
        max_deaths: max_deaths(&subset)?,
        mortality_rate: clinic_mortality_rate(&subset)?,
        max_pct_deaths: max_pct_deaths(&series)?,
    })
}

fn ratio_of_sums(rows: &[YearlyClinicRecord], context: &str) -> Result<f64> {
    if rows.is_empty() {
        return Err(EngineError::empty(context));
    }
    let births = total_births(rows)?;
    if births == 0 {
        return Err(EngineError::div_zero(format!("{}: total births is zero", context)));
    }
    Ok(total_deaths(rows)? as f64 / births as f64 * 100.0)
}

fn checked_sum<I, F>(values: I, context: F) -> Result<u64>
where
    I: IntoIterator<Item = u64>,
    F: FnOnce() -> String,
{
    values
        .into_iter()
        .try_fold(0u64, |acc, v| acc.checked_add(v))
        .ok_or_else(|| EngineError::overflow(context()))
}
