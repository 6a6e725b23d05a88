//! Error types

use std::path::PathBuf;

/// A configuration rejected at the generation boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("radius {radius} exceeds the supported maximum of {max}")]
    RadiusTooLarge { radius: u32, max: u32 },

    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("terrain band {upper} ({upper_value}) must be above {lower} ({lower_value})")]
    BandsNotAscending {
        lower: &'static str,
        lower_value: f64,
        upper: &'static str,
        upper_value: f64,
    },
}

/// Top-level error for library and CLI operations.
#[derive(Debug, thiserror::Error)]
pub enum HexworldError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid hex coordinate: {0:?}")]
    InvalidCoordinate(String),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
