use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::fetch::{HttpClient, get_json, post_json};
use crate::services::air_quality_api::{
    AirQualityApi, Report, ReportsResponse, ReportsSummary, ReportsSummaryResponse, Station,
    StationDetail, StationReport24h, StationReportResponse, StationSummariesResponse,
    StationSummary, StationsResponse,
};
use crate::services::predictions::{
    AllowedStationsResponse, HealthCheckResponse, ModelType, PredictionRequest,
    ProphetPredictionResponse, XgboostPredictionResponse,
};

/// REST client for the monitoring backend.
pub struct BackendClient<C> {
    http: C,
    base_url: String,
}

impl<C: HttpClient> BackendClient<C> {
    pub fn new(http: C, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        debug!(endpoint, "GET");
        get_json(&self.http, &self.url(endpoint)).await
    }

    async fn post<B: Serialize + Sync, T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        debug!(endpoint, "POST");
        post_json(&self.http, &self.url(endpoint), body).await
    }
}

#[async_trait]
impl<C: HttpClient> AirQualityApi for BackendClient<C> {
    async fn list_stations(&self) -> Result<Vec<Station>> {
        let resp: StationsResponse = self.get("/stations/").await?;
        info!(count = resp.stations.len(), "Stations fetched");
        Ok(resp.stations)
    }

    async fn reports(&self) -> Result<Vec<Report>> {
        let resp: ReportsResponse = self.get("/reports/").await?;
        debug!(total = resp.total, success = resp.success, "Reports fetched");
        Ok(resp.reports)
    }

    async fn reports_summary(&self) -> Result<ReportsSummary> {
        let resp: ReportsSummaryResponse = self.get("/reports/summary").await?;
        Ok(resp.data)
    }

    async fn station_summaries(&self) -> Result<Vec<StationSummary>> {
        let resp: StationSummariesResponse = self.get("/stations/summary/all").await?;
        Ok(resp.data)
    }

    async fn station_detail(&self, station_id: u64) -> Result<StationDetail> {
        self.get(&format!("/stations/{station_id}"))
            .await
            .with_context(|| format!("failed to load station {station_id}"))
    }

    async fn station_report_24h(&self, station_id: u64) -> Result<StationReport24h> {
        let resp: StationReportResponse = self
            .get(&format!("/stations/{station_id}/report"))
            .await
            .with_context(|| format!("failed to load 24h report for station {station_id}"))?;
        Ok(resp.data)
    }

    #[tracing::instrument(skip(self), fields(station_id = request.station_id))]
    async fn predict_xgboost(&self, request: &PredictionRequest) -> Result<XgboostPredictionResponse> {
        let request = PredictionRequest {
            model_type: ModelType::Xgboost,
            ..request.clone()
        };
        let resp: XgboostPredictionResponse = self.post("/predict/", &request).await?;
        info!(
            station = %resp.station_name,
            predictions = resp.predictions.len(),
            method = %resp.method,
            "Prediction received"
        );
        Ok(resp)
    }

    #[tracing::instrument(skip(self), fields(station_id = request.station_id))]
    async fn predict_prophet(&self, request: &PredictionRequest) -> Result<ProphetPredictionResponse> {
        let request = PredictionRequest {
            model_type: ModelType::Prophet,
            ..request.clone()
        };
        let resp: ProphetPredictionResponse = self.post("/predict/", &request).await?;
        info!(
            station = %resp.station_name,
            predictions = resp.predictions.len(),
            data_points_used = resp.data_points_used,
            "Prediction received"
        );
        Ok(resp)
    }

    async fn allowed_stations(&self) -> Result<AllowedStationsResponse> {
        let resp: AllowedStationsResponse = self
            .get("/predict/allowed-stations")
            .await
            .context("failed to load allowed stations")?;
        debug!(count = resp.count, "Allowed stations fetched");
        Ok(resp)
    }

    async fn models_health(&self) -> Result<HealthCheckResponse> {
        self.get("/predict/health")
            .await
            .context("failed to check model health")
    }
}
