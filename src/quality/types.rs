//! Data types shared by the classifier and the aggregator.

use crate::quality::tier::Tier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One station's measurement at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub station_id: u64,
    pub latitude: f64,
    pub longitude: f64,
    /// Concentration in µg/m³; `None` means the station reported no data.
    pub value: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Reading {
    /// `[lat, lng, value]` triple for heatmap layers, or `None` without a value.
    pub fn heat_point(&self) -> Option<[f64; 3]> {
        self.value.map(|v| [self.latitude, self.longitude, v])
    }
}

/// Average, minimum and maximum over the readings that carried a value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueStats {
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

/// Summary statistics over a set of readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSummary {
    /// `None` when no reading carried a value.
    pub stats: Option<ValueStats>,
    pub valid_count: usize,
    pub total_count: usize,
    pub tier_counts: BTreeMap<Tier, usize>,
}

impl AggregateSummary {
    pub fn empty(total_count: usize) -> Self {
        Self {
            stats: None,
            valid_count: 0,
            total_count,
            tier_counts: BTreeMap::new(),
        }
    }

    pub fn average_value(&self) -> Option<f64> {
        self.stats.map(|s| s.average)
    }

    pub fn min_value(&self) -> Option<f64> {
        self.stats.map(|s| s.min)
    }

    pub fn max_value(&self) -> Option<f64> {
        self.stats.map(|s| s.max)
    }

    /// Count for a tier, zero when no reading fell into it.
    pub fn tier_count(&self, tier: Tier) -> usize {
        self.tier_counts.get(&tier).copied().unwrap_or(0)
    }
}
