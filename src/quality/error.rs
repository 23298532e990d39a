/// Errors raised by classification and aggregation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AirQualityError {
    /// Concentration was negative, NaN or infinite.
    #[error("invalid concentration {0}: value must be finite and non-negative")]
    InvalidInput(f64),
    #[error("invalid boundary table: {0}")]
    InvalidTable(String),
}
