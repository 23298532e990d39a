//! CLI entry point for the PM2.5 monitor.
//!
//! Provides subcommands for classifying single concentrations, summarising
//! the current station readings, building per-monitor reports, querying the
//! forecast models and loading the locality boundaries.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use pm25_monitor::{
    cache::TtlCache,
    config::Settings,
    fetch::BasicClient,
    infra::localities::client::{LOCALITIES_CACHE_KEY, localities},
    infra::{BackendClient, LocalitiesClient},
    output::{SummaryRecord, append_record, print_json},
    quality::{Pollutant, Reading, Tier, aggregate, classify},
    services::air_quality_api::AirQualityApi,
    services::predictions::{ModelType, PredictionRequest, forecast_tier, horizons_to_time_range},
    services::reports::{available_monitors, reports_by_monitor, station_monitors},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "pm25_monitor")]
#[command(about = "Classify and summarise PM2.5 monitoring data", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single concentration
    Classify {
        #[arg(value_name = "VALUE", allow_negative_numbers = true)]
        value: f64,

        /// Pollutant whose boundary table applies (PM2.5, PM10, O3, NO2)
        #[arg(short, long, default_value = "PM2.5")]
        pollutant: Pollutant,
    },
    /// Fetch current station readings and summarise them
    Monitor {
        /// Print the summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// CSV file to append the summary row to
        #[arg(long)]
        csv: Option<String>,
    },
    /// Station reports; per-monitor when --monitor is given
    Reports {
        /// Monitor type to report on (PM2.5, PM10, O3, NO2, ...)
        #[arg(short, long)]
        monitor: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List monitor types available across stations
    Monitors,
    /// Show every monitor of one station and its 24h report
    Station {
        #[arg(value_name = "STATION_ID")]
        id: u64,
    },
    /// Request a forecast for a station
    Predict {
        #[arg(short, long)]
        station: u64,

        /// Comma-separated horizons in hours
        #[arg(long, value_delimiter = ',', default_value = "1,3,6,12")]
        horizons: Vec<u32>,

        #[arg(short, long, value_enum, default_value_t = ModelType::Xgboost)]
        model: ModelType,
    },
    /// Check the forecast models' health
    Health,
    /// Load the locality boundaries, using the on-disk cache when fresh
    Localities {
        /// Drop the cached copy before loading
        #[arg(long, default_value_t = false)]
        refresh: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/pm25_monitor.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("pm25_monitor.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let settings = cli.settings;

    match cli.command {
        Commands::Classify { value, pollutant } => {
            let tier = pollutant.table().classify(value)?;
            info!(
                pollutant = %pollutant,
                value,
                tier = %tier,
                color = tier.color_key(),
                "Classified"
            );
            print_json(&tier.info())?;
        }
        Commands::Monitor { json, csv } => {
            let backend = backend(&settings)?;
            monitor(&backend, json, csv.as_deref()).await?;
        }
        Commands::Reports { monitor, json } => {
            let backend = backend(&settings)?;
            match monitor {
                Some(monitor) => monitor_reports(&backend, &monitor, json).await?,
                None => station_reports(&backend, json).await?,
            }
        }
        Commands::Monitors => {
            let backend = backend(&settings)?;
            let summaries = backend.station_summaries().await?;
            let details = available_monitors(&summaries);

            info!(total_types = details.len(), "Monitor types");
            for (monitor_type, availability) in &details {
                info!(
                    monitor_type = %monitor_type,
                    count = availability.count,
                    stations = %availability.stations.join(", "),
                    "Monitor"
                );
            }
        }
        Commands::Station { id } => {
            let backend = backend(&settings)?;
            let detail = backend.station_detail(id).await?;
            let monitors = station_monitors(&detail)?;

            info!(station = %detail.name, total_monitors = monitors.len(), "Station");
            for m in &monitors {
                info!(
                    monitor_type = %m.monitor_type,
                    value = m.value,
                    min = m.min,
                    max = m.max,
                    unit = %m.unit,
                    status = m.status.map(|t| t.label()).unwrap_or("Desconocido"),
                    "Monitor"
                );
            }

            match backend.station_report_24h(id).await {
                Ok(report) => print_json(&report)?,
                Err(e) => warn!(error = %e, "24h report unavailable"),
            }
        }
        Commands::Predict {
            station,
            horizons,
            model,
        } => {
            let backend = backend(&settings)?;
            predict(&backend, station, horizons, model).await?;
        }
        Commands::Health => {
            let backend = backend(&settings)?;
            let health = backend.models_health().await?;
            if health.is_healthy() {
                info!(status = %health.status, models = health.models.len(), "Model health");
            } else {
                warn!(status = %health.status, models = health.models.len(), "Models unhealthy");
            }
            for (name, model) in &health.models {
                info!(
                    model = %name,
                    loaded = model.loaded,
                    horizon = model.horizon,
                    features = model.num_features,
                    "Model"
                );
            }
        }
        Commands::Localities { refresh } => {
            let path = settings.localities_cache_path();
            let mut cache = TtlCache::load(&path, settings.cache_ttl())?;
            if refresh {
                cache.clear();
            }

            let client = LocalitiesClient::new(
                BasicClient::with_timeout(settings.http_timeout())?,
                settings.localities_url.clone(),
            );
            let geojson = client.load(&mut cache).await?;
            let now = Utc::now();
            cache.purge_expired_at(now);
            cache.save(&path)?;

            if let Some(left) = cache.time_until_expiry_at(LOCALITIES_CACHE_KEY, now) {
                info!(expires_in_secs = left.num_seconds(), "Localities cached");
            }

            for locality in localities(&geojson) {
                info!(id = locality.id, name = %locality.name, color = locality.color, "Locality");
            }
        }
    }

    Ok(())
}

fn backend(settings: &Settings) -> Result<BackendClient<BasicClient>> {
    let http = BasicClient::with_timeout(settings.http_timeout())?;
    Ok(BackendClient::new(http, settings.api_url.clone()))
}

/// Fetches the station list, classifies every station and summarises the set.
#[tracing::instrument(skip(api))]
async fn monitor<A: AirQualityApi>(api: &A, json: bool, csv: Option<&str>) -> Result<()> {
    let stations = api.list_stations().await?;
    let fetched_at = Utc::now();
    let readings: Vec<Reading> = stations
        .iter()
        .map(|s| s.to_reading(Some(fetched_at)))
        .collect();

    for station in &stations {
        match station.value {
            Some(value) => match classify(value) {
                Ok(tier) => info!(station = %station.name, value, tier = %tier, color = tier.hex_color(), "Station"),
                Err(e) => warn!(station = %station.name, error = %e, "Unclassifiable reading"),
            },
            None => info!(station = %station.name, "No data"),
        }
    }

    let summary = aggregate(&readings).context("station readings failed validation")?;

    if json {
        let heat_points: Vec<[f64; 3]> = readings.iter().filter_map(Reading::heat_point).collect();
        print_json(&serde_json::json!({
            "summary": &summary,
            "heat_points": heat_points,
        }))?;
    } else if let Some(stats) = summary.stats {
        info!(
            valid = summary.valid_count,
            total = summary.total_count,
            average = stats.average,
            min = stats.min,
            max = stats.max,
            "Summary"
        );
        for (tier, count) in &summary.tier_counts {
            info!(tier = %tier, count, "Tier count");
        }
    } else {
        warn!(total = summary.total_count, "No station reported data");
    }

    if let Some(path) = csv {
        append_record(path, &SummaryRecord::from_summary(&summary, fetched_at))?;
        info!(path, "Summary appended");
    }

    Ok(())
}

/// Lists the backend's PM2.5 reports next to its own summary, flagging rows
/// whose status disagrees with the local classification.
async fn station_reports<A: AirQualityApi>(api: &A, json: bool) -> Result<()> {
    let reports = api.reports().await?;

    if json {
        print_json(&reports)?;
    } else {
        for report in &reports {
            let local = classify(report.pm25_value)?;
            if Tier::from_label(&report.status) != Some(local) {
                warn!(
                    station = %report.station_name,
                    backend_status = %report.status,
                    local_status = %local,
                    "Status mismatch"
                );
            }
            info!(
                station = %report.station_name,
                pm25 = report.pm25_value,
                status = %local,
                date = %report.date,
                "Report"
            );
        }
    }

    match api.reports_summary().await {
        Ok(summary) => info!(
            total_stations = summary.total_stations,
            avg = summary.avg_pm25,
            min = summary.min_pm25,
            max = summary.max_pm25,
            "Backend summary"
        ),
        Err(e) => warn!(error = %e, "Backend summary unavailable"),
    }

    Ok(())
}

/// Builds the per-monitor report from the station summaries.
async fn monitor_reports<A: AirQualityApi>(api: &A, monitor: &str, json: bool) -> Result<()> {
    let summaries = api.station_summaries().await?;
    let set = reports_by_monitor(&summaries, monitor)?;

    if json {
        return print_json(&set);
    }

    for report in &set.reports {
        info!(
            station = %report.station_name,
            value = report.value,
            unit = %report.unit,
            status = report.status.map(|t| t.label()).unwrap_or("Desconocido"),
            "Report"
        );
    }
    match set.statistics {
        Some(s) => info!(
            monitor = %set.monitor_type,
            total = set.total,
            avg = s.avg,
            min = s.min,
            max = s.max,
            "Report statistics"
        ),
        None => warn!(monitor = %set.monitor_type, "No station reports this monitor"),
    }

    Ok(())
}

/// Requests a forecast and logs each horizon with its tier.
#[tracing::instrument(skip(api, horizons))]
async fn predict<A: AirQualityApi>(
    api: &A,
    station: u64,
    horizons: Vec<u32>,
    model: ModelType,
) -> Result<()> {
    if !api.is_station_allowed(station).await {
        anyhow::bail!("station {station} is not enabled for predictions");
    }

    let request = PredictionRequest::new(station, horizons, model)?;
    info!(
        time_range = horizons_to_time_range(&request.horizons),
        "Requesting forecast"
    );

    match model {
        ModelType::Xgboost => {
            let resp = api.predict_xgboost(&request).await?;
            for p in &resp.predictions {
                let tier = forecast_tier(p.predicted_pm25)?;
                info!(
                    horizon_h = p.horizon,
                    predicted_pm25 = p.predicted_pm25,
                    tier = %tier,
                    timestamp = %p.timestamp,
                    "Forecast"
                );
            }
        }
        ModelType::Prophet => {
            let resp = api.predict_prophet(&request).await?;
            for (horizon, p) in &resp.predictions {
                let tier = forecast_tier(p.predicted_pm25)?;
                info!(
                    horizon_h = *horizon,
                    predicted_pm25 = p.predicted_pm25,
                    interval = %p.format_confidence_interval(),
                    uncertainty_pct = p.uncertainty_percentage(),
                    tier = %tier,
                    "Forecast"
                );
            }
        }
    }

    Ok(())
}
