//! Validation of raw rows into the immutable dataset.

use crate::error::{Dataset, EngineError, QualityKind, Result};
use crate::loader::{RawMonthlyRow, RawTable, RawYearlyRow};
use crate::models::{DatasetShape, MonthlyRecord, QualityFlags, TableShape, YearlyClinicRecord};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::hash::Hash;
use tracing::{debug, warn};

/// Date formats tried, in order, when none are configured.
pub fn default_date_formats() -> Vec<String> {
    vec!["%Y-%m-%d", "%Y-%m-%d %H:%M:%S", "%m/%d/%Y", "%d.%m.%Y"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Quality findings for one table.
///
/// Findings never stop a run; the caller decides how to surface them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetQuality {
    pub has_nulls: bool,
    pub has_duplicates: bool,
    pub null_rows: usize,
    pub duplicate_rows: usize,
    pub deaths_exceed_births: usize,
    /// One `EngineError::DataQuality` per finding.
    pub issues: Vec<EngineError>,
}

impl DatasetQuality {
    pub fn flags(&self) -> QualityFlags {
        QualityFlags {
            has_nulls: self.has_nulls,
            has_duplicates: self.has_duplicates,
            null_rows: self.null_rows,
            duplicate_rows: self.duplicate_rows,
            deaths_exceed_births: self.deaths_exceed_births,
        }
    }

    fn record(&mut self, dataset: Dataset, kind: QualityKind, detail: String) {
        match kind {
            QualityKind::NullValue => {
                self.has_nulls = true;
                self.null_rows += 1;
            }
            QualityKind::DuplicateRow => {
                self.has_duplicates = true;
                self.duplicate_rows += 1;
            }
            QualityKind::DeathsExceedBirths => self.deaths_exceed_births += 1,
        }
        self.issues.push(EngineError::DataQuality {
            dataset,
            kind,
            detail,
        });
    }
}

/// Both tables after validation. Never mutated once built.
#[derive(Debug, Clone)]
pub struct ValidatedDataset {
    monthly: Vec<MonthlyRecord>,
    yearly: Vec<YearlyClinicRecord>,
    monthly_shape: TableShape,
    yearly_shape: TableShape,
    monthly_quality: DatasetQuality,
    yearly_quality: DatasetQuality,
}

impl ValidatedDataset {
    pub fn monthly(&self) -> &[MonthlyRecord] {
        &self.monthly
    }

    pub fn yearly(&self) -> &[YearlyClinicRecord] {
        &self.yearly
    }

    pub fn monthly_quality(&self) -> &DatasetQuality {
        &self.monthly_quality
    }

    pub fn yearly_quality(&self) -> &DatasetQuality {
        &self.yearly_quality
    }

    /// All quality findings across both tables.
    pub fn quality_issues(&self) -> impl Iterator<Item = &EngineError> {
        self.monthly_quality
            .issues
            .iter()
            .chain(self.yearly_quality.issues.iter())
    }
}

/// Validate both raw tables.
///
/// Rows holding a null are reported and left out of the typed records.
/// Duplicate rows are reported and kept. An unparseable date fails the load.
pub fn load(
    monthly: RawTable<RawMonthlyRow>,
    yearly: RawTable<RawYearlyRow>,
    date_formats: &[String],
) -> Result<ValidatedDataset> {
    let mut monthly_quality = DatasetQuality::default();
    let mut yearly_quality = DatasetQuality::default();

    for idx in duplicate_indices(&monthly.rows) {
        monthly_quality.record(
            Dataset::Monthly,
            QualityKind::DuplicateRow,
            format!("line {} repeats an earlier row", idx + 2),
        );
    }
    for idx in duplicate_indices(&yearly.rows) {
        yearly_quality.record(
            Dataset::Yearly,
            QualityKind::DuplicateRow,
            format!("line {} repeats an earlier row", idx + 2),
        );
    }

    let mut monthly_records = Vec::with_capacity(monthly.rows.len());
    for (idx, row) in monthly.rows.iter().enumerate() {
        let line = idx + 2;
        let (Some(date), Some(births), Some(deaths)) = (&row.date, row.births, row.deaths) else {
            monthly_quality.record(
                Dataset::Monthly,
                QualityKind::NullValue,
                format!("line {} has an empty field", line),
            );
            continue;
        };

        let date = parse_date(date, date_formats).ok_or_else(|| {
            EngineError::schema(
                Dataset::Monthly,
                Some(line),
                format!("invalid date '{}'", date),
            )
        })?;

        if deaths > births {
            monthly_quality.record(
                Dataset::Monthly,
                QualityKind::DeathsExceedBirths,
                format!("line {}: {} deaths for {} births", line, deaths, births),
            );
        }

        monthly_records.push(MonthlyRecord {
            date,
            births,
            deaths,
        });
    }

    if monthly_records.windows(2).any(|w| w[0].date >= w[1].date) {
        warn!("Monthly rows are not in strictly increasing date order");
    }

    let mut yearly_records = Vec::with_capacity(yearly.rows.len());
    for (idx, row) in yearly.rows.iter().enumerate() {
        let line = idx + 2;
        let (Some(year), Some(clinic), Some(births), Some(deaths)) =
            (row.year, &row.clinic, row.births, row.deaths)
        else {
            yearly_quality.record(
                Dataset::Yearly,
                QualityKind::NullValue,
                format!("line {} has an empty field", line),
            );
            continue;
        };

        if deaths > births {
            yearly_quality.record(
                Dataset::Yearly,
                QualityKind::DeathsExceedBirths,
                format!("line {}: {} deaths for {} births", line, deaths, births),
            );
        }

        yearly_records.push(YearlyClinicRecord {
            year,
            clinic: clinic.clone(),
            births,
            deaths,
        });
    }

    debug!(
        "Validated {} monthly records from {} and {} yearly records from {}",
        monthly_records.len(),
        monthly.source,
        yearly_records.len(),
        yearly.source
    );

    Ok(ValidatedDataset {
        monthly: monthly_records,
        yearly: yearly_records,
        monthly_shape: TableShape {
            rows: monthly.rows.len(),
            columns: monthly.columns,
        },
        yearly_shape: TableShape {
            rows: yearly.rows.len(),
            columns: yearly.columns,
        },
        monthly_quality,
        yearly_quality,
    })
}

/// Row counts, column names and distinct years.
pub fn describe_shape(dataset: &ValidatedDataset) -> DatasetShape {
    let mut seen = HashSet::new();
    let unique_years = dataset
        .yearly
        .iter()
        .map(|r| r.year)
        .filter(|year| seen.insert(*year))
        .collect();

    DatasetShape {
        monthly: dataset.monthly_shape.clone(),
        yearly: dataset.yearly_shape.clone(),
        unique_years,
    }
}

fn parse_date(value: &str, formats: &[String]) -> Option<NaiveDate> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Indices of rows equal to some earlier row.
fn duplicate_indices<T: Eq + Hash>(rows: &[T]) -> Vec<usize> {
    let mut seen = HashSet::new();
    rows.iter()
        .enumerate()
        .filter(|(_, row)| !seen.insert(*row))
        .map(|(idx, _)| idx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{MONTHLY_COLUMNS, YEARLY_COLUMNS};

    fn monthly_row(date: &str, births: u64, deaths: u64) -> RawMonthlyRow {
        RawMonthlyRow {
            date: Some(date.to_string()),
            births: Some(births),
            deaths: Some(deaths),
        }
    }

    fn yearly_row(year: i32, clinic: &str, births: u64, deaths: u64) -> RawYearlyRow {
        RawYearlyRow {
            year: Some(year),
            clinic: Some(clinic.to_string()),
            births: Some(births),
            deaths: Some(deaths),
        }
    }

    fn tables(
        monthly: Vec<RawMonthlyRow>,
        yearly: Vec<RawYearlyRow>,
    ) -> (RawTable<RawMonthlyRow>, RawTable<RawYearlyRow>) {
        (
            RawTable::new("monthly", &MONTHLY_COLUMNS, monthly),
            RawTable::new("yearly", &YEARLY_COLUMNS, yearly),
        )
    }

    #[test]
    fn test_load_clean_tables() {
        let (m, y) = tables(
            vec![monthly_row("1841-01-01", 254, 37), monthly_row("1841-02-01", 239, 18)],
            vec![yearly_row(1841, "clinic 1", 3036, 237), yearly_row(1841, "clinic 2", 2442, 86)],
        );
        let dataset = load(m, y, &default_date_formats()).unwrap();

        assert_eq!(dataset.monthly().len(), 2);
        assert_eq!(dataset.monthly()[1].date, NaiveDate::from_ymd_opt(1841, 2, 1).unwrap());
        assert_eq!(dataset.yearly().len(), 2);
        assert!(!dataset.monthly_quality().has_nulls);
        assert!(!dataset.yearly_quality().has_duplicates);
        assert_eq!(dataset.quality_issues().count(), 0);
    }

    #[test]
    fn test_null_rows_reported_and_skipped() {
        let mut missing = yearly_row(1842, "clinic 1", 3287, 518);
        missing.deaths = None;
        let (m, y) = tables(
            vec![monthly_row("1841-01-01", 254, 37)],
            vec![yearly_row(1841, "clinic 1", 3036, 237), missing],
        );
        let dataset = load(m, y, &default_date_formats()).unwrap();

        let quality = dataset.yearly_quality();
        assert!(quality.has_nulls);
        assert_eq!(quality.null_rows, 1);
        assert_eq!(dataset.yearly().len(), 1);
        assert!(quality.issues.iter().all(|e| !e.is_fatal()));

        // Shape still describes the table as read.
        assert_eq!(describe_shape(&dataset).yearly.rows, 2);
    }

    #[test]
    fn test_duplicates_reported_and_kept() {
        let (m, y) = tables(
            vec![monthly_row("1841-01-01", 254, 37), monthly_row("1841-01-01", 254, 37)],
            vec![yearly_row(1841, "clinic 1", 3036, 237)],
        );
        let dataset = load(m, y, &default_date_formats()).unwrap();

        assert!(dataset.monthly_quality().has_duplicates);
        assert_eq!(dataset.monthly_quality().duplicate_rows, 1);
        assert_eq!(dataset.monthly().len(), 2);
        assert!(!dataset.yearly_quality().has_duplicates);
    }

    #[test]
    fn test_deaths_exceeding_births_flagged() {
        let (m, y) = tables(
            vec![monthly_row("1841-01-01", 10, 12)],
            vec![yearly_row(1841, "clinic 1", 3036, 237)],
        );
        let dataset = load(m, y, &default_date_formats()).unwrap();

        assert_eq!(dataset.monthly_quality().deaths_exceed_births, 1);
        assert!(matches!(
            dataset.monthly_quality().issues[0],
            EngineError::DataQuality {
                kind: QualityKind::DeathsExceedBirths,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_date_is_schema_error() {
        let (m, y) = tables(
            vec![monthly_row("1841-01-01", 254, 37), monthly_row("sometime", 239, 18)],
            vec![],
        );
        let err = load(m, y, &default_date_formats()).unwrap_err();

        assert_eq!(
            err,
            EngineError::Schema {
                dataset: Dataset::Monthly,
                line: Some(3),
                message: "invalid date 'sometime'".to_string(),
            }
        );
    }

    #[test]
    fn test_timestamp_dates_truncate_to_day() {
        let (m, y) = tables(vec![monthly_row("1847-06-01 00:00:00", 268, 6)], vec![]);
        let dataset = load(m, y, &default_date_formats()).unwrap();

        assert_eq!(dataset.monthly()[0].date, NaiveDate::from_ymd_opt(1847, 6, 1).unwrap());
    }

    #[test]
    fn test_describe_shape_unique_years_in_order() {
        let (m, y) = tables(
            vec![],
            vec![
                yearly_row(1842, "clinic 1", 3287, 518),
                yearly_row(1841, "clinic 1", 3036, 237),
                yearly_row(1842, "clinic 2", 2659, 202),
                yearly_row(1841, "clinic 2", 2442, 86),
            ],
        );
        let dataset = load(m, y, &default_date_formats()).unwrap();
        let shape = describe_shape(&dataset);

        assert_eq!(shape.unique_years, vec![1842, 1841]);
        assert_eq!(shape.yearly.rows, 4);
        assert_eq!(shape.yearly.columns, vec!["year", "births", "deaths", "clinic"]);
        assert_eq!(shape.monthly.rows, 0);
    }
}
