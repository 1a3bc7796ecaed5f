//! Error types for the aggregation engine.
//!
//! Data quality problems are reported and never stop a run. Empty inputs,
//! zero denominators, overflowing sums and schema violations fail the call
//! that hit them.

use std::fmt;
use thiserror::Error;

/// Which input table an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Monthly,
    Yearly,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dataset::Monthly => write!(f, "monthly"),
            Dataset::Yearly => write!(f, "yearly"),
        }
    }
}

/// Kind of a non-fatal data quality finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityKind {
    NullValue,
    DuplicateRow,
    DeathsExceedBirths,
}

impl fmt::Display for QualityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityKind::NullValue => write!(f, "null value"),
            QualityKind::DuplicateRow => write!(f, "duplicate row"),
            QualityKind::DeathsExceedBirths => write!(f, "deaths exceed births"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("data quality ({dataset}): {kind}: {detail}")]
    DataQuality {
        dataset: Dataset,
        kind: QualityKind,
        detail: String,
    },

    #[error("empty dataset: {context}")]
    EmptyDataset { context: String },

    #[error("division by zero: {context}")]
    DivisionByZero { context: String },

    #[error("arithmetic overflow: {context}")]
    Overflow { context: String },

    #[error("schema error ({dataset}{}): {message}", line_suffix(.line))]
    Schema {
        dataset: Dataset,
        line: Option<usize>,
        message: String,
    },
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(", line {}", line),
        None => String::new(),
    }
}

impl EngineError {
    /// Data quality findings are the only errors a run may continue past.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, EngineError::DataQuality { .. })
    }

    pub(crate) fn empty(context: impl Into<String>) -> Self {
        EngineError::EmptyDataset {
            context: context.into(),
        }
    }

    pub(crate) fn div_zero(context: impl Into<String>) -> Self {
        EngineError::DivisionByZero {
            context: context.into(),
        }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        EngineError::Overflow {
            context: context.into(),
        }
    }

    pub(crate) fn schema(dataset: Dataset, line: Option<usize>, message: impl Into<String>) -> Self {
        EngineError::Schema {
            dataset,
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
