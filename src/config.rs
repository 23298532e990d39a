//! Runtime settings, read from CLI flags or environment variables.
//!
//! `.env` is loaded by the binary before parsing, so every variable below can
//! also live there.

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_LOCALITIES_URL: &str = "https://services1.arcgis.com/J5ltM0ovtzXUbp7B/ArcGIS/rest/services/Mapa_Referencia/FeatureServer/48/query?where=1=1&outFields=*&f=geojson";

#[derive(Args, Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the monitoring backend
    #[arg(long, env = "PM25_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// GeoJSON query for the locality boundaries
    #[arg(long, env = "PM25_LOCALITIES_URL", default_value = DEFAULT_LOCALITIES_URL, global = true)]
    pub localities_url: String,

    /// HTTP request timeout in seconds
    #[arg(long, env = "PM25_HTTP_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub http_timeout_secs: u64,

    /// How long cached payloads stay fresh, in seconds
    #[arg(long, env = "PM25_CACHE_TTL_SECS", default_value_t = 86_400, global = true)]
    pub cache_ttl_secs: i64,

    /// Directory for cache files
    #[arg(long, env = "PM25_CACHE_DIR", default_value = ".cache", global = true)]
    pub cache_dir: PathBuf,
}

impl Settings {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs.max(0))
    }

    pub fn localities_cache_path(&self) -> PathBuf {
        self.cache_dir.join("localities.json")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            localities_url: DEFAULT_LOCALITIES_URL.to_string(),
            http_timeout_secs: 30,
            cache_ttl_secs: 86_400,
            cache_dir: PathBuf::from(".cache"),
        }
    }
}
