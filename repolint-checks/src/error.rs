//! Errors that abort a check run.
//!
//! Checks are fail-fast: any of these stops the runner, since a failed
//! live-state read invalidates the comparisons that would follow.

use repolint_github::{ApiError, ReferenceError};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("failed to fetch {what}: {error}")]
    Api { what: &'static str, error: ApiError },

    #[error("failed to fetch reference {what}: {error}")]
    Reference {
        what: &'static str,
        error: ReferenceError,
    },

    #[error("{kind} '{name}' missing required reference field")]
    MissingReference { kind: &'static str, name: String },

    #[error("invalid default_branch pattern: {0}")]
    Pattern(globset::Error),

    #[error("invalid workflow file {path}: {error}")]
    InvalidWorkflow {
        path: String,
        error: serde_yaml::Error,
    },

    #[error("failed to read {path}: {error}")]
    Io { path: String, error: io::Error },
}

impl CheckError {
    pub(crate) fn api(what: &'static str) -> impl FnOnce(ApiError) -> CheckError {
        move |error| CheckError::Api { what, error }
    }

    pub(crate) fn reference(what: &'static str) -> impl FnOnce(ReferenceError) -> CheckError {
        move |error| CheckError::Reference { what, error }
    }

    pub(crate) fn io(path: &str) -> impl FnOnce(io::Error) -> CheckError + '_ {
        move |error| CheckError::Io {
            path: path.to_string(),
            error,
        }
    }
}
