use repolint_github::{ApiError, ReferenceError};
use repolint_types::CheckType;
use std::io;
use thiserror::Error;

/// Why a single issue was not remediated.
///
/// These are carried inside a [`FixResult`](crate::FixResult) and never abort
/// the batch.
#[derive(Debug, Error)]
pub enum FixError {
    #[error("issue is not fixable")]
    NotFixable,

    #[error("no fixer for check type '{0}'")]
    NoFixer(CheckType),

    #[error("issue data missing {0}")]
    MissingData(&'static str),

    #[error("no config found for {kind} '{name}'")]
    NoConfig { kind: &'static str, name: String },

    #[error("{kind} '{name}' has no reference specified")]
    NoReference { kind: &'static str, name: String },

    #[error("{0} not configured")]
    NotConfigured(String),

    #[error("unknown setting: {0}")]
    UnknownSetting(String),

    #[error("failed to fetch reference {what}: {error}")]
    Reference {
        what: &'static str,
        error: ReferenceError,
    },

    #[error("failed to {action}: {error}")]
    Api {
        action: &'static str,
        error: ApiError,
    },

    #[error("failed to write {path}: {error}")]
    Write { path: String, error: io::Error },
}

impl FixError {
    pub(crate) fn api(action: &'static str) -> impl FnOnce(ApiError) -> FixError {
        move |error| FixError::Api { action, error }
    }

    pub(crate) fn reference(what: &'static str) -> impl FnOnce(ReferenceError) -> FixError {
        move |error| FixError::Reference { what, error }
    }

    pub(crate) fn write(path: &str) -> impl FnOnce(io::Error) -> FixError + '_ {
        move |error| FixError::Write {
            path: path.to_string(),
            error,
        }
    }
}
