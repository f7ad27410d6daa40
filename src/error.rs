use std::path::PathBuf;

use thiserror::Error;

/// Conditions that stop a single segment from being aggregated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("track contains no points")]
    EmptyTrack,

    #[error("timestamp goes back {seconds:.3}s at point {index}")]
    NonMonotonicTimestamp { index: usize, seconds: f64 },
}

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GPX parsing error: {0}")]
    GpxParsing(String),

    #[error("no tracks found in GPX document")]
    NoTracks,

    #[error("error walking {path}: {message}")]
    Walk { path: PathBuf, message: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{field} must be greater than zero")]
    ZeroDimension { field: &'static str },
}
