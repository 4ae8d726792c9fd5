//! Wire types and error definitions for the validator boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::CacheEntry;

/// Body sent to the validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest<'a> {
    pub address: &'a str,
}

/// Body returned by the validator on HTTP 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub validation: bool,
    pub message: String,
}

impl From<ValidationResponse> for CacheEntry {
    fn from(resp: ValidationResponse) -> Self {
        Self {
            validation: resp.validation,
            message: resp.message,
        }
    }
}

impl From<CacheEntry> for ValidationResponse {
    fn from(entry: CacheEntry) -> Self {
        Self {
            validation: entry.validation,
            message: entry.message,
        }
    }
}

/// Errors that can occur while talking to the validator.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The call did not finish within the bound.
    #[error("upstream request timed out")]
    Timeout,

    /// Could not connect to the validator.
    #[error("upstream connection failed: {0}")]
    Connect(String),

    /// Validator answered with a status other than 200.
    #[error("upstream returned HTTP {0}")]
    Status(u16),

    /// Response body was not a validation result.
    #[error("invalid upstream response: {0}")]
    Decode(String),

    /// Any other transport failure.
    #[error("upstream transport error: {0}")]
    Transport(String),

    /// Configured base URL is unusable.
    #[error("invalid upstream url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout
        } else if e.is_connect() {
            UpstreamError::Connect(e.to_string())
        } else if e.is_decode() {
            UpstreamError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            UpstreamError::Status(status.as_u16())
        } else {
            UpstreamError::Transport(e.to_string())
        }
    }
}

impl UpstreamError {
    /// Metric label for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Timeout => "timeout",
            UpstreamError::Connect(_) => "connect",
            UpstreamError::Status(_) => "status",
            UpstreamError::Decode(_) => "decode",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::InvalidUrl(_) => "config",
        }
    }
}
