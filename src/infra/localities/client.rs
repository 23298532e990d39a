//! Bogotá locality boundaries from the IDECA ArcGIS feature service.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::TtlCache;
use crate::fetch::{HttpClient, get_json};

pub const LOCALITIES_CACHE_KEY: &str = "localidades_geojson";

/// Fill colours assigned to localities by feature id.
pub const PALETTE: [&str; 18] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#F7DC6F", "#FDCB6E", "#E17055", "#A29BFE", "#FAB1A0",
    "#74B9FF", "#55EFC4", "#96CEB4", "#FD79A8", "#636E72", "#00B894", "#00CEC9", "#FFEAA7",
    "#81C784", "#6C5CE7",
];

pub fn locality_color(feature_id: u64) -> &'static str {
    PALETTE[(feature_id % PALETTE.len() as u64) as usize]
}

/// A locality polygon reduced to what the legend needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Locality {
    pub id: u64,
    pub name: String,
    pub color: &'static str,
}

/// Extracts id, `NOMBRE` and palette colour from each feature of a GeoJSON
/// `FeatureCollection`. Features without a numeric id are skipped.
pub fn localities(geojson: &Value) -> Vec<Locality> {
    geojson["features"]
        .as_array()
        .map(|features| {
            features
                .iter()
                .filter_map(|f| {
                    let id = f["id"].as_u64()?;
                    let name = f["properties"]["NOMBRE"].as_str().unwrap_or("").to_string();
                    Some(Locality {
                        id,
                        name,
                        color: locality_color(id),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Loads the localities GeoJSON through a caller-owned cache.
pub struct LocalitiesClient<C> {
    http: C,
    url: String,
}

impl<C: HttpClient> LocalitiesClient<C> {
    pub fn new(http: C, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Returns the cached GeoJSON when fresh, otherwise fetches and stores it.
    #[tracing::instrument(skip(self, cache))]
    pub async fn load(&self, cache: &mut TtlCache<Value>) -> Result<Value> {
        if let Some(cached) = cache.get(LOCALITIES_CACHE_KEY) {
            debug!("Localities served from cache");
            return Ok(cached.clone());
        }

        let geojson: Value = get_json(&self.http, &self.url)
            .await
            .context("failed to load localities")?;
        info!(features = localities(&geojson).len(), "Localities fetched");

        cache.insert(LOCALITIES_CACHE_KEY, geojson.clone());
        Ok(geojson)
    }
}
