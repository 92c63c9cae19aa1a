//! Error types for the GitHub client.

use crate::transport::TransportError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Rate-limit retries used up the cumulative wait budget.
    #[error("rate limit exceeded, waited {waited:?}: {error}")]
    RateLimitExceeded {
        waited: Duration,
        error: TransportError,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to encode request body: {0}")]
    Encode(serde_json::Error),

    #[error("failed to decode {what}: {error}")]
    Decode {
        what: &'static str,
        error: serde_json::Error,
    },

    #[error("empty response body for {0}")]
    EmptyBody(String),

    #[error("unexpected encoding: {0}")]
    UnexpectedEncoding(String),

    #[error("failed to decode content: {0}")]
    Base64(base64::DecodeError),

    #[error("repository {owner}/{repo} is archived")]
    Archived { owner: String, repo: String },

    #[error("insufficient permissions to access repository: {0}")]
    InsufficientPermissions(Box<ApiError>),
}

impl ApiError {
    /// True when the underlying HTTP status was 404.
    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::Transport(e) => e.is_not_found(),
            ApiError::InsufficientPermissions(inner) => inner.is_not_found(),
            _ => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimitExceeded { .. })
    }
}
