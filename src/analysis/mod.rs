//! The aggregation engine.
//!
//! `dataset` turns raw rows into a validated, immutable dataset and
//! `aggregator` computes every statistic the report needs from it.

pub mod aggregator;
pub mod dataset;

pub use aggregator::*;
pub use dataset::{default_date_formats, describe_shape, load, ValidatedDataset};
