//! Backend contracts and client-side shaping of what the backend returns.

pub mod air_quality_api;
pub mod predictions;
pub mod reports;
