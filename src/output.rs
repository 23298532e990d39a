//! Output formatting and persistence for aggregate summaries.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::quality::{AggregateSummary, Tier};
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// One CSV row per aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub timestamp: DateTime<Utc>,
    pub total_count: usize,
    pub valid_count: usize,
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,

    // tier counts
    pub bueno: usize,
    pub moderado: usize,
    pub regular: usize,
    pub alto: usize,
    pub muy_alto: usize,
    pub peligroso: usize,
}

impl SummaryRecord {
    pub fn from_summary(summary: &AggregateSummary, timestamp: DateTime<Utc>) -> Self {
        SummaryRecord {
            timestamp,
            total_count: summary.total_count,
            valid_count: summary.valid_count,
            average: summary.average_value(),
            min: summary.min_value(),
            max: summary.max_value(),
            bueno: summary.tier_count(Tier::Bueno),
            moderado: summary.tier_count(Tier::Moderado),
            regular: summary.tier_count(Tier::Regular),
            alto: summary.tier_count(Tier::Alto),
            muy_alto: summary.tier_count(Tier::MuyAlto),
            peligroso: summary.tier_count(Tier::Peligroso),
        }
    }
}

/// Logs any value using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends a [`SummaryRecord`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, record: &SummaryRecord) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}
