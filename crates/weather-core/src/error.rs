//! Error types for the weather add-on
//!
//! This module defines all error types used throughout the crate.
//! None of them is fatal to the process: the poller catches every error,
//! logs it and keeps the previous property values.

use thiserror::Error;

/// Result type alias for weather operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the weather add-on
#[derive(Error, Debug)]
pub enum Error {
    /// Upstream fetch failed (network, timeout)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Upstream answered with a non-success status
    #[error("HTTP error: {0}")]
    Http(String),

    /// Upstream document was malformed or lacked an expected key
    #[error("Parse error: {0}")]
    Parse(String),

    /// Settings store errors
    #[error("Settings error: {0}")]
    Settings(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Settings file is not a JSON object
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create an HTTP status error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a settings store error
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the error came from talking to the upstream feed
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Http(_))
    }
}
