//! Error types for dayscope-core

use thiserror::Error;

/// Main error type for the dayscope-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Effort estimator error
    #[error("estimator error: {0}")]
    Estimator(String),

    /// Upstream source error, scoped to one source
    #[error("{name} source error: {message}")]
    Source { name: String, message: String },
}

/// Result type alias for dayscope-core
pub type Result<T> = std::result::Result<T, Error>;
