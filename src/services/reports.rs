//! Client-side shaping of station summaries into report tables.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::quality::utility::{mean, round2};
use crate::quality::{AirQualityError, Tier, classify_monitor};
use crate::services::air_quality_api::{StationDetail, StationSummary};

/// One station's average for a single monitor type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorReport {
    pub station_id: u64,
    pub station_name: String,
    pub lat: f64,
    pub lng: f64,
    pub monitor_type: String,
    pub value: f64,
    pub unit: String,
    /// `None` for monitor types without a boundary table.
    pub status: Option<Tier>,
    pub timestamp: String,
}

/// Statistics shown above a monitor report, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonitorStatistics {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorReportSet {
    pub monitor_type: String,
    pub total: usize,
    /// `None` when no station has the monitor.
    pub statistics: Option<MonitorStatistics>,
    /// Highest value first.
    pub reports: Vec<MonitorReport>,
}

/// Builds the report for `monitor_type` from every station that carries it.
pub fn reports_by_monitor(
    summaries: &[StationSummary],
    monitor_type: &str,
) -> Result<MonitorReportSet, AirQualityError> {
    let mut reports = Vec::new();

    for station in summaries {
        let Some(monitor) = station
            .monitors
            .iter()
            .find(|m| m.monitor_type == monitor_type)
        else {
            continue;
        };

        reports.push(MonitorReport {
            station_id: station.id,
            station_name: station.name.clone(),
            lat: station.lat,
            lng: station.lng,
            monitor_type: monitor_type.to_string(),
            value: monitor.promedio,
            unit: monitor.unit.clone(),
            status: classify_monitor(monitor_type, monitor.promedio)?,
            timestamp: monitor.ultima_medicion.clone(),
        });
    }

    reports.sort_by(|a, b| b.value.total_cmp(&a.value));

    let values: Vec<f64> = reports.iter().map(|r| r.value).collect();
    let statistics = mean(&values).map(|avg| MonitorStatistics {
        avg: round2(avg),
        min: round2(values.iter().copied().fold(f64::INFINITY, f64::min)),
        max: round2(values.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
    });

    Ok(MonitorReportSet {
        monitor_type: monitor_type.to_string(),
        total: reports.len(),
        statistics,
        reports,
    })
}

/// Stations carrying one monitor type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonitorAvailability {
    pub count: usize,
    pub stations: Vec<String>,
}

/// Every monitor type seen across stations, sorted by name.
pub fn available_monitors(summaries: &[StationSummary]) -> BTreeMap<String, MonitorAvailability> {
    let mut details: BTreeMap<String, MonitorAvailability> = BTreeMap::new();

    for station in summaries {
        for monitor in &station.monitors {
            let entry = details.entry(monitor.monitor_type.clone()).or_default();
            entry.count += 1;
            entry.stations.push(station.name.clone());
        }
    }

    details
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMonitor {
    pub monitor_type: String,
    pub value: f64,
    pub unit: String,
    pub status: Option<Tier>,
    pub timestamp: String,
    pub min: f64,
    pub max: f64,
}

/// Every sensor of one station with its classified average.
pub fn station_monitors(detail: &StationDetail) -> Result<Vec<StationMonitor>, AirQualityError> {
    detail
        .sensors
        .iter()
        .map(|sensor| {
            Ok(StationMonitor {
                monitor_type: sensor.sensor_type.clone(),
                value: sensor.promedio,
                unit: sensor.unit.clone(),
                status: classify_monitor(&sensor.sensor_type, sensor.promedio)?,
                timestamp: sensor.ultima_medicion.clone(),
                min: sensor.minimo,
                max: sensor.maximo,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::air_quality_api::{MonitorAverage, Sensor};

    fn monitor(monitor_type: &str, promedio: f64) -> MonitorAverage {
        MonitorAverage {
            monitor_type: monitor_type.to_string(),
            promedio,
            unit: "µg/m³".to_string(),
            ultima_medicion: "2025-03-01T10:00:00".to_string(),
        }
    }

    fn station(id: u64, name: &str, monitors: Vec<MonitorAverage>) -> StationSummary {
        StationSummary {
            id,
            name: name.to_string(),
            lat: 4.6,
            lng: -74.1,
            monitors,
        }
    }

    fn summaries() -> Vec<StationSummary> {
        vec![
            station(1, "Usaquén", vec![monitor("PM2.5", 10.123), monitor("PM10", 30.0)]),
            station(2, "Kennedy", vec![monitor("PM2.5", 40.457)]),
            station(3, "Suba", vec![monitor("CO", 1.2)]),
        ]
    }

    #[test]
    fn test_reports_by_monitor_sorted_and_classified() {
        let set = reports_by_monitor(&summaries(), "PM2.5").unwrap();

        assert_eq!(set.total, 2);
        assert_eq!(set.reports[0].station_name, "Kennedy");
        assert_eq!(set.reports[0].status, Some(Tier::Regular));
        assert_eq!(set.reports[1].status, Some(Tier::Bueno));

        let stats = set.statistics.unwrap();
        assert_eq!(stats.avg, 25.29);
        assert_eq!(stats.min, 10.12);
        assert_eq!(stats.max, 40.46);
    }

    #[test]
    fn test_reports_by_unknown_monitor_type() {
        let set = reports_by_monitor(&summaries(), "CO").unwrap();
        assert_eq!(set.total, 1);
        assert_eq!(set.reports[0].status, None);
    }

    #[test]
    fn test_reports_by_missing_monitor() {
        let set = reports_by_monitor(&summaries(), "O3").unwrap();
        assert_eq!(set.total, 0);
        assert!(set.statistics.is_none());
    }

    #[test]
    fn test_available_monitors() {
        let details = available_monitors(&summaries());
        let types: Vec<_> = details.keys().cloned().collect();
        assert_eq!(types, vec!["CO", "PM10", "PM2.5"]);
        assert_eq!(details["PM2.5"].count, 2);
        assert_eq!(details["PM2.5"].stations, vec!["Usaquén", "Kennedy"]);
    }

    #[test]
    fn test_station_monitors() {
        let detail = StationDetail {
            id: 7,
            name: "Guaymaral".to_string(),
            lat: 4.78,
            lng: -74.04,
            sensors: vec![Sensor {
                sensor_type: "NO2".to_string(),
                promedio: 0.2,
                minimo: 0.05,
                maximo: 0.4,
                unit: "ppm".to_string(),
                ultima_medicion: "2025-03-01T10:00:00".to_string(),
            }],
        };

        let monitors = station_monitors(&detail).unwrap();
        assert_eq!(monitors.len(), 1);
        assert_eq!(monitors[0].status, Some(Tier::Alto));
        assert_eq!(monitors[0].max, 0.4);
    }
}
