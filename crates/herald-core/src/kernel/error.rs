//! # Herald Kernel Errors
//!
//! Defines [`Error`], the top-level error of the crate. It wraps the typed
//! errors of the event and configuration subsystems so callers can use a
//! single `Result` across both.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::error::ConfigError;
use crate::event::error::EventSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed event system error
    #[error("Event system error: {0}")]
    EventSystem(#[from] EventSystemError),

    /// Specific, typed configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
