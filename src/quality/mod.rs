//! Air-quality classification and aggregation.
//!
//! Concentrations are bucketed into [`Tier`]s through a data-driven
//! [`BoundaryTable`], and collections of station [`Reading`]s are summarised
//! into an [`AggregateSummary`] with per-tier counts.

pub mod aggregate;
pub mod classify;
pub mod error;
pub mod tier;
pub mod types;
pub mod utility;

pub use aggregate::{aggregate, aggregate_with};
pub use classify::{BoundaryTable, Pollutant, classify, classify_monitor};
pub use error::AirQualityError;
pub use tier::{Tier, TierInfo};
pub use types::{AggregateSummary, Reading, ValueStats};
