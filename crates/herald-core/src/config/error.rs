//! # Herald Configuration Errors
//!
//! Defines [`ConfigError`], covering failures to read configuration files,
//! to recognize their format, to (de)serialize them, and values of the
//! wrong shape.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error during operation '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization to '{format}' failed: {source}")]
    Serialization {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Deserialization from '{format}' failed: {source}")]
    Deserialization {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Invalid value for configuration key '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

// Helper for creating Io errors, ensuring path is always included.
impl ConfigError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        ConfigError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }
}

/// Shorthand for results produced by the configuration layer.
pub type Result<T> = std::result::Result<T, ConfigError>;
