//! Data models for the mortality report.
//!
//! This module contains the typed records loaded from the input tables,
//! the derived per-clinic statistics, and the report structure handed to
//! the presentation layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One month of births and deaths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub date: NaiveDate,
    pub births: u64,
    pub deaths: u64,
}

/// One clinic's births and deaths for a year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearlyClinicRecord {
    pub year: i32,
    pub clinic: String,
    pub births: u64,
    pub deaths: u64,
}

/// Per-row death percentage for a clinic and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicYearlyStat {
    pub year: i32,
    pub clinic: String,
    pub pct_deaths: f64,
}

/// Numeric column of the monthly table that can be averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthlyField {
    Births,
    Deaths,
}

impl MonthlyField {
    pub fn value(&self, record: &MonthlyRecord) -> u64 {
        match self {
            MonthlyField::Births => record.births,
            MonthlyField::Deaths => record.deaths,
        }
    }
}

impl fmt::Display for MonthlyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthlyField::Births => write!(f, "births"),
            MonthlyField::Deaths => write!(f, "deaths"),
        }
    }
}

/// Row count and column names of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableShape {
    pub rows: usize,
    pub columns: Vec<String>,
}

/// Structural description of both tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetShape {
    pub monthly: TableShape,
    pub yearly: TableShape,
    /// Distinct years of the yearly table, in order of first appearance.
    pub unique_years: Vec<i32>,
}

/// Totals and extremes for a single clinic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicSummary {
    pub clinic: String,
    pub total_births: u64,
    pub total_deaths: u64,
    pub max_deaths: u64,
    /// Ratio of sums, as a percentage.
    pub mortality_rate: f64,
    /// Highest per-year death percentage.
    pub max_pct_deaths: f64,
}

/// Quality flags for one table, as shown in the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityFlags {
    pub has_nulls: bool,
    pub has_duplicates: bool,
    pub null_rows: usize,
    pub duplicate_rows: usize,
    pub deaths_exceed_births: usize,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub monthly_source: String,
    pub yearly_source: String,
    pub generated_at: DateTime<Utc>,
    /// Whether the highest death rates were scaled by 100 again.
    pub legacy_pct_scaling: bool,
}

/// Mortality benchmark printed next to the overall rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRate {
    pub label: String,
    pub percent: f64,
}

/// The complete exploratory report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub shape: DatasetShape,
    pub monthly_quality: QualityFlags,
    pub yearly_quality: QualityFlags,
    pub mean_monthly_births: f64,
    pub mean_monthly_deaths: f64,
    pub overall_mortality_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceRate>,
    pub clinics: Vec<ClinicSummary>,
    pub pct_deaths: Vec<ClinicYearlyStat>,
}

impl Report {
    /// Whether either table carried a quality finding.
    pub fn has_quality_issues(&self) -> bool {
        [&self.monthly_quality, &self.yearly_quality].iter().any(|q| {
            q.has_nulls || q.has_duplicates || q.deaths_exceed_births > 0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_field_value() {
        let record = MonthlyRecord {
            date: NaiveDate::from_ymd_opt(1841, 1, 1).unwrap(),
            births: 254,
            deaths: 37,
        };
        assert_eq!(MonthlyField::Births.value(&record), 254);
        assert_eq!(MonthlyField::Deaths.value(&record), 37);
        assert_eq!(MonthlyField::Deaths.to_string(), "deaths");
    }

    #[test]
    fn test_quality_flags_default_clean() {
        let flags = QualityFlags::default();
        assert!(!flags.has_nulls);
        assert!(!flags.has_duplicates);
        assert_eq!(flags.deaths_exceed_births, 0);
    }

    #[test]
    fn test_clinic_yearly_stat_serializes() {
        let stat = ClinicYearlyStat {
            year: 1842,
            clinic: "clinic 1".to_string(),
            pct_deaths: 15.8,
        };
        let json = serde_json::to_string(&stat).unwrap();
        assert!(json.contains("\"pct_deaths\":15.8"));
        assert!(json.contains("\"clinic\":\"clinic 1\""));
    }
}
