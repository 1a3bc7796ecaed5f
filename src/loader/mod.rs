//! CSV loading for the monthly and yearly tables.
//!
//! Cells are read into optional fields so that an empty cell becomes a
//! null the engine can report, while a cell of the wrong type is a schema
//! error with its line number.

use crate::error::{Dataset, EngineError, Result as EngineResult};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

pub const MONTHLY_COLUMNS: [&str; 3] = ["date", "births", "deaths"];
pub const YEARLY_COLUMNS: [&str; 4] = ["year", "births", "deaths", "clinic"];

/// A monthly row as it appears in the file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct RawMonthlyRow {
    pub date: Option<String>,
    pub births: Option<u64>,
    pub deaths: Option<u64>,
}

/// A yearly per-clinic row as it appears in the file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct RawYearlyRow {
    pub year: Option<i32>,
    pub births: Option<u64>,
    pub deaths: Option<u64>,
    pub clinic: Option<String>,
}

/// Rows of one table together with its header.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable<T> {
    /// Where the rows came from, for messages.
    pub source: String,
    pub columns: Vec<String>,
    pub rows: Vec<T>,
}

impl<T> RawTable<T> {
    #[allow(dead_code)] // Convenience constructor for in-memory tables
    pub fn new(source: impl Into<String>, columns: &[&str], rows: Vec<T>) -> Self {
        Self {
            source: source.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }
}

/// Read the monthly table from any reader.
pub fn read_monthly<R: Read>(reader: R, source: &str) -> EngineResult<RawTable<RawMonthlyRow>> {
    read_table(reader, source, Dataset::Monthly, &MONTHLY_COLUMNS)
}

/// Read the yearly table from any reader.
pub fn read_yearly<R: Read>(reader: R, source: &str) -> EngineResult<RawTable<RawYearlyRow>> {
    read_table(reader, source, Dataset::Yearly, &YEARLY_COLUMNS)
}

/// Open and read the monthly CSV file.
pub fn load_monthly_csv(path: &Path) -> Result<RawTable<RawMonthlyRow>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open monthly file: {}", path.display()))?;
    read_monthly(file, &path.display().to_string())
        .with_context(|| format!("Failed to read monthly file: {}", path.display()))
}

/// Open and read the yearly CSV file.
pub fn load_yearly_csv(path: &Path) -> Result<RawTable<RawYearlyRow>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open yearly file: {}", path.display()))?;
    read_yearly(file, &path.display().to_string())
        .with_context(|| format!("Failed to read yearly file: {}", path.display()))
}

fn read_table<R, T>(
    reader: R,
    source: &str,
    dataset: Dataset,
    required: &[&str],
) -> EngineResult<RawTable<T>>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| EngineError::schema(dataset, Some(1), format!("unreadable header: {}", e)))?
        .iter()
        .map(String::from)
        .collect();

    for name in required {
        if !columns.iter().any(|c| c == name) {
            return Err(EngineError::schema(
                dataset,
                None,
                format!("missing required column `{}`", name),
            ));
        }
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<T>().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let row = result.map_err(|e| EngineError::schema(dataset, Some(line), describe_csv_error(&e)))?;
        rows.push(row);
    }

    debug!("Read {} {} rows from {}", rows.len(), dataset, source);

    Ok(RawTable {
        source: source.to_string(),
        columns,
        rows,
    })
}

fn describe_csv_error(err: &csv::Error) -> String {
    match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => match err.field() {
            Some(field) => format!("field {}: {}", field + 1, err.kind()),
            None => err.kind().to_string(),
        },
        _ => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_monthly_rows() {
        let data = "date,births,deaths\n1841-01-01,254,37\n1841-02-01,239,18\n";
        let table = read_monthly(data.as_bytes(), "inline").unwrap();

        assert_eq!(table.columns, vec!["date", "births", "deaths"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].date.as_deref(), Some("1841-01-01"));
        assert_eq!(table.rows[1].births, Some(239));
        assert_eq!(table.rows[1].deaths, Some(18));
    }

    #[test]
    fn test_empty_cell_is_null() {
        let data = "year,births,deaths,clinic\n1841,3036,,clinic 1\n";
        let table = read_yearly(data.as_bytes(), "inline").unwrap();

        assert_eq!(table.rows[0].deaths, None);
        assert_eq!(table.rows[0].clinic.as_deref(), Some("clinic 1"));
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let data = "clinic,year,deaths,births\nclinic 2,1841,86,2442\n";
        let table = read_yearly(data.as_bytes(), "inline").unwrap();

        assert_eq!(table.rows[0].year, Some(1841));
        assert_eq!(table.rows[0].births, Some(2442));
        assert_eq!(table.rows[0].deaths, Some(86));
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let data = "year,births,clinic\n1841,3036,clinic 1\n";
        let err = read_yearly(data.as_bytes(), "inline").unwrap_err();

        assert!(matches!(err, EngineError::Schema { dataset: Dataset::Yearly, line: None, .. }));
        assert!(err.to_string().contains("deaths"));
    }

    #[test]
    fn test_non_integer_is_schema_error_with_line() {
        let data = "date,births,deaths\n1841-01-01,254,37\n1841-02-01,many,18\n";
        let err = read_monthly(data.as_bytes(), "inline").unwrap_err();

        match err {
            EngineError::Schema { dataset, line, .. } => {
                assert_eq!(dataset, Dataset::Monthly);
                assert_eq!(line, Some(3));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("annual.csv");
        std::fs::write(
            &path,
            "year,births,deaths,clinic\n1841,3036,237,clinic 1\n1841,2442,86,clinic 2\n",
        )
        .unwrap();

        let table = load_yearly_csv(&path).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert!(table.source.ends_with("annual.csv"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_monthly_csv(&temp_dir.path().join("nope.csv"));
        assert!(result.is_err());
    }
}
