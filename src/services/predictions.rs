//! Request/response contract of the forecasting endpoints.
//!
//! The models run on the backend; this module only describes what is sent
//! and received, plus a few helpers for presenting the forecasts.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::quality::{AirQualityError, Tier, classify};

/// Forecast horizons in hours supported by the XGBoost models.
pub const XGBOOST_HORIZONS: [u32; 4] = [1, 3, 6, 12];
/// Forecast horizons in hours supported by the Prophet model.
pub const PROPHET_HORIZONS: [u32; 5] = [1, 3, 6, 12, 24];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Xgboost,
    Prophet,
}

impl ModelType {
    pub fn horizons(self) -> &'static [u32] {
        match self {
            ModelType::Xgboost => &XGBOOST_HORIZONS,
            ModelType::Prophet => &PROPHET_HORIZONS,
        }
    }
}

/// Body of `POST /predict/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub station_id: u64,
    pub horizons: Vec<u32>,
    pub model_type: ModelType,
}

impl PredictionRequest {
    /// Builds a request, rejecting horizons the model does not serve.
    pub fn new(station_id: u64, horizons: Vec<u32>, model_type: ModelType) -> Result<Self> {
        if horizons.is_empty() {
            bail!("at least one horizon is required");
        }
        if let Some(h) = horizons.iter().find(|h| !model_type.horizons().contains(h)) {
            bail!(
                "horizon {h}h is not supported by {:?} (supported: {:?})",
                model_type,
                model_type.horizons()
            );
        }
        Ok(Self {
            station_id,
            horizons,
            model_type,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XgboostPredictionPoint {
    pub horizon: u32,
    pub predicted_pm25: f64,
    pub timestamp: String,
    #[serde(default)]
    pub features_used: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XgboostPredictionResponse {
    pub success: bool,
    pub station_id: u64,
    pub station_name: String,
    pub predictions: Vec<XgboostPredictionPoint>,
    pub generated_at: String,
    pub method: String,
}

/// Prophet forecast with its confidence interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProphetPredictionPoint {
    pub horizon: u32,
    pub predicted_pm25: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub prediction_timestamp: String,
}

impl ProphetPredictionPoint {
    /// Renders the interval as `[lower, upper] μg/m³` with one decimal.
    pub fn format_confidence_interval(&self) -> String {
        format!("[{:.1}, {:.1}] μg/m³", self.lower_bound, self.upper_bound)
    }

    /// Interval width relative to the prediction, in percent.
    ///
    /// `None` when the predicted value is zero.
    pub fn uncertainty_percentage(&self) -> Option<f64> {
        if self.predicted_pm25 == 0.0 {
            return None;
        }
        Some((self.upper_bound - self.lower_bound) / self.predicted_pm25 * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProphetPredictionResponse {
    pub success: bool,
    pub station_id: u64,
    pub station_name: String,
    /// Keyed by horizon in hours; the wire keys are `"1"`, `"24"` and so on.
    pub predictions: BTreeMap<u32, ProphetPredictionPoint>,
    pub last_known_value: f64,
    pub last_known_timestamp: String,
    pub data_points_used: usize,
    pub generated_at: String,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowedStation {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowedStationsResponse {
    pub success: bool,
    pub stations: Vec<AllowedStation>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub loaded: bool,
    pub horizon: u32,
    #[serde(default)]
    pub num_features: Option<u32>,
    #[serde(default)]
    pub num_boosted_rounds: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
    #[serde(default)]
    pub models: HashMap<String, ModelStatus>,
    #[serde(default)]
    pub allowed_stations: Option<usize>,
}

impl HealthCheckResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Time-range label for the widest requested horizon, defaulting to `"12h"`.
pub fn horizons_to_time_range(horizons: &[u32]) -> &'static str {
    match horizons.iter().max() {
        Some(1) => "1h",
        Some(3) => "3h",
        Some(6) => "6h",
        _ => "12h",
    }
}

/// Tier of a forecast value.
pub fn forecast_tier(predicted_pm25: f64) -> Result<Tier, AirQualityError> {
    classify(predicted_pm25)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prophet_point(predicted: f64, lower: f64, upper: f64) -> ProphetPredictionPoint {
        ProphetPredictionPoint {
            horizon: 6,
            predicted_pm25: predicted,
            lower_bound: lower,
            upper_bound: upper,
            prediction_timestamp: "2025-01-01T06:00:00Z".into(),
        }
    }

    #[test]
    fn test_request_rejects_unsupported_horizon() {
        assert!(PredictionRequest::new(2, vec![1, 24], ModelType::Xgboost).is_err());
        assert!(PredictionRequest::new(2, vec![], ModelType::Xgboost).is_err());
        assert!(PredictionRequest::new(2, vec![1, 24], ModelType::Prophet).is_ok());
    }

    #[test]
    fn test_request_serializes_model_type() {
        let req = PredictionRequest::new(2, vec![1, 3], ModelType::Xgboost).unwrap();
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"station_id":2,"horizons":[1,3],"model_type":"xgboost"}"#);
    }

    #[test]
    fn test_horizons_to_time_range() {
        assert_eq!(horizons_to_time_range(&[1]), "1h");
        assert_eq!(horizons_to_time_range(&[1, 3]), "3h");
        assert_eq!(horizons_to_time_range(&[6, 1]), "6h");
        assert_eq!(horizons_to_time_range(&[12, 3]), "12h");
        assert_eq!(horizons_to_time_range(&[]), "12h");
    }

    #[test]
    fn test_confidence_interval_format() {
        let p = prophet_point(20.0, 15.04, 25.96);
        assert_eq!(p.format_confidence_interval(), "[15.0, 26.0] μg/m³");
    }

    #[test]
    fn test_uncertainty_percentage() {
        assert_eq!(prophet_point(20.0, 15.0, 25.0).uncertainty_percentage(), Some(50.0));
        assert_eq!(prophet_point(0.0, 0.0, 1.0).uncertainty_percentage(), None);
    }

    #[test]
    fn test_prophet_predictions_ordered_by_horizon() {
        let point = |h: u32| {
            serde_json::json!({
                "horizon": h,
                "predicted_pm25": 18.0,
                "lower_bound": 12.0,
                "upper_bound": 24.0,
                "prediction_timestamp": "2025-01-01T06:00:00Z"
            })
        };
        let json = serde_json::json!({
            "success": true,
            "station_id": 2,
            "station_name": "Kennedy",
            "predictions": {"1": point(1), "12": point(12), "24": point(24), "3": point(3), "6": point(6)},
            "last_known_value": 17.5,
            "last_known_timestamp": "2025-01-01T00:00:00Z",
            "data_points_used": 720,
            "generated_at": "2025-01-01T00:05:00Z",
            "method": "prophet"
        });

        let resp: ProphetPredictionResponse = serde_json::from_value(json).unwrap();
        let horizons: Vec<u32> = resp.predictions.keys().copied().collect();
        assert_eq!(horizons, vec![1, 3, 6, 12, 24]);
        assert_eq!(resp.predictions[&12].horizon, 12);
    }

    #[test]
    fn test_health_response_decodes() {
        let json = r#"{
            "status": "healthy",
            "models": {"tplus1": {"loaded": true, "horizon": 1, "num_features": 42}},
            "allowed_stations": 10
        }"#;
        let health: HealthCheckResponse = serde_json::from_str(json).unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.models["tplus1"].num_features, Some(42));
        assert_eq!(health.models["tplus1"].num_boosted_rounds, None);
    }

    #[test]
    fn test_forecast_tier() {
        assert_eq!(forecast_tier(40.0).unwrap(), Tier::Regular);
        assert!(forecast_tier(-2.0).is_err());
    }
}
