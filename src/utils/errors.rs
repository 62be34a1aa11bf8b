// src/utils/errors.rs
//! Error types for sessionscope

use thiserror::Error;

/// Main error type for the sessionscope library
#[derive(Error, Debug)]
pub enum RecorderError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Recording engine failed to start; returned by `RecordingEngine`
    /// implementations
    #[error("recording engine error: {0}")]
    Engine(String),

    /// Collector/transport error (network failure or non-success response)
    #[error("collector error: {0}")]
    Collector(String),

    /// Event or chunk serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Chunk compression error
    #[error("compression error: {0}")]
    Compression(String),
}

/// Result type alias for sessionscope
pub type Result<T> = std::result::Result<T, RecorderError>;
