//! Concrete clients for the services the monitor talks to.
//!
//! [`BackendClient`] implements [`AirQualityApi`](crate::services::air_quality_api::AirQualityApi)
//! over REST. [`LocalitiesClient`] loads the locality boundaries shown under
//! the station markers.

pub mod backend;
pub mod localities;

pub use backend::client::BackendClient;
pub use localities::client::LocalitiesClient;
