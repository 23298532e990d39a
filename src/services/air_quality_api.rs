//! Trait and wire types for the air-quality monitoring backend.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::quality::Reading;
use crate::services::predictions::{
    AllowedStationsResponse, HealthCheckResponse, PredictionRequest, ProphetPredictionResponse,
    XgboostPredictionResponse,
};

/// A monitoring station with its latest PM2.5 value, as listed by `GET /stations/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: u64,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub name: String,
}

impl Station {
    /// Converts into a [`Reading`] taken at `timestamp`.
    pub fn to_reading(&self, timestamp: Option<DateTime<Utc>>) -> Reading {
        Reading {
            station_id: self.id,
            latitude: self.lat,
            longitude: self.lng,
            value: self.value,
            timestamp,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StationsResponse {
    pub stations: Vec<Station>,
}

/// One row of `GET /reports/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub station_id: u64,
    pub station_name: String,
    pub lat: f64,
    pub lng: f64,
    pub pm25_value: f64,
    pub status: String,
    pub timestamp: String,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct ReportsResponse {
    pub success: bool,
    pub total: usize,
    pub reports: Vec<Report>,
}

/// Server-side summary returned by `GET /reports/summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportsSummary {
    pub total_stations: usize,
    pub avg_pm25: f64,
    pub min_pm25: f64,
    pub max_pm25: f64,
    pub status_distribution: HashMap<String, usize>,
}

#[derive(Debug, Deserialize)]
pub struct ReportsSummaryResponse {
    pub success: bool,
    pub data: ReportsSummary,
}

/// Average of one monitor at a station, from `GET /stations/summary/all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorAverage {
    #[serde(rename = "type")]
    pub monitor_type: String,
    pub promedio: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub ultima_medicion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSummary {
    pub id: u64,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub monitors: Vec<MonitorAverage>,
}

#[derive(Debug, Deserialize)]
pub struct StationSummariesResponse {
    pub data: Vec<StationSummary>,
}

/// Sensor statistics for one station, from `GET /stations/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    #[serde(rename = "type")]
    pub sensor_type: String,
    pub promedio: f64,
    pub minimo: f64,
    pub maximo: f64,
    pub unit: String,
    pub ultima_medicion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationDetail {
    pub id: u64,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub sensors: Vec<Sensor>,
}

/// 24-hour statistics for one monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorWindow {
    #[serde(rename = "type")]
    pub monitor_type: String,
    pub unit: String,
    pub total_lecturas: usize,
    pub promedio_24h: f64,
    pub minimo_24h: f64,
    pub maximo_24h: f64,
    pub sma_4h: f64,
    pub ultima_lectura: String,
    pub tendencia: String,
}

/// `GET /stations/{id}/report` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationReport24h {
    pub station_id: u64,
    pub station_name: String,
    pub lat: f64,
    pub lng: f64,
    pub pm25: Option<MonitorWindow>,
    #[serde(default)]
    pub other_monitors: Vec<MonitorWindow>,
    pub report_timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct StationReportResponse {
    pub success: bool,
    pub data: StationReport24h,
}

/// Abstraction over the monitoring backend.
#[async_trait::async_trait]
pub trait AirQualityApi: Send + Sync {
    async fn list_stations(&self) -> Result<Vec<Station>>;

    async fn reports(&self) -> Result<Vec<Report>>;

    async fn reports_summary(&self) -> Result<ReportsSummary>;

    async fn station_summaries(&self) -> Result<Vec<StationSummary>>;

    async fn station_detail(&self, station_id: u64) -> Result<StationDetail>;

    async fn station_report_24h(&self, station_id: u64) -> Result<StationReport24h>;

    async fn predict_xgboost(&self, request: &PredictionRequest) -> Result<XgboostPredictionResponse>;

    async fn predict_prophet(&self, request: &PredictionRequest) -> Result<ProphetPredictionResponse>;

    async fn allowed_stations(&self) -> Result<AllowedStationsResponse>;

    async fn models_health(&self) -> Result<HealthCheckResponse>;

    /// Whether `station_id` may be sent to the prediction models.
    ///
    /// A failed lookup counts as not allowed.
    async fn is_station_allowed(&self, station_id: u64) -> bool {
        match self.allowed_stations().await {
            Ok(resp) => resp.stations.iter().any(|s| s.id == station_id),
            Err(e) => {
                tracing::warn!(error = %e, station_id, "Allowed-station lookup failed");
                false
            }
        }
    }
}
