//! Error types for deployctl

use thiserror::Error;

/// Main error type for deployctl
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// A structured form field holds text that is not a well-formed list.
    #[error("Invalid {field}: {source}")]
    ParseError {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Controller error: {0}")]
    ControllerError(String),
}

impl ClientError {
    /// True for errors raised while building a request, before any network call
    pub fn is_parse_error(&self) -> bool {
        matches!(self, ClientError::ParseError { .. })
    }
}
