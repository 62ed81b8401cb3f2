//! Error types for the GoCanvas client.
//!
//! # Design
//! `Service` gets a dedicated variant because the API reports failures inside
//! an otherwise successful HTTP response (the `Error` envelope), and callers
//! need to tell those apart from connection faults or malformed XML. No
//! variant is ever produced alongside a decoded value.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `GoCanvas` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connecting, sending, or reading the response body failed.
    #[error("transport failed: {0}")]
    Transport(String),

    /// A request body or reference-data document could not be produced.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response claimed to be XML but could not be parsed.
    #[error("failed to parse XML response: {0}")]
    Parse(String),

    /// The API answered with an `Error` envelope.
    #[error("{description} (code {code})")]
    Service { description: String, code: String },

    /// The facade method exists for API parity but has no implementation.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

impl ApiError {
    pub fn service(description: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Service {
            description: description.into(),
            code: code.into(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
