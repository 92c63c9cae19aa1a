//! Reference resolution: a policy pointer to canonical content.
//!
//! A reference is first read as a path relative to the working directory.
//! Only when that file does not exist is it parsed as `owner/repo/path` and
//! fetched from GitHub.

use crate::client::Client;
use crate::error::ApiError;
use camino::Utf8PathBuf;
use repolint_types::github::Ruleset;
use std::io;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error(
        "reference file '{0}' not found locally and invalid remote format (expected owner/repo/path)"
    )]
    NotFound(String),

    #[error("invalid reference format: {0} (expected owner/repo/path)")]
    InvalidRemote(String),

    #[error("failed to read local reference file {path}: {error}")]
    LocalRead { path: Utf8PathBuf, error: io::Error },

    #[error("failed to fetch remote reference file: {0}")]
    Remote(ApiError),

    #[error("failed to parse reference JSON: {0}")]
    Parse(serde_json::Error),
}

/// `owner/repo/path`, split on the first two separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteRef<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub path: &'a str,
}

impl<'a> RemoteRef<'a> {
    /// Returns `None` unless all three components are present and non-empty.
    pub fn parse(reference: &'a str) -> Option<Self> {
        let mut parts = reference.splitn(3, '/');
        let owner = parts.next().filter(|s| !s.is_empty())?;
        let repo = parts.next().filter(|s| !s.is_empty())?;
        let path = parts.next().filter(|s| !s.is_empty())?;
        Some(Self { owner, repo, path })
    }
}

impl Client {
    /// Local file first, remote `owner/repo/path` second.
    ///
    /// A local read failure other than "not found" is fatal and does not
    /// fall through to the remote lookup.
    pub fn resolve_reference(&self, reference: &str) -> Result<Vec<u8>, ReferenceError> {
        let path = self.local_path(reference);
        match fs_err::read(&path) {
            Ok(content) => {
                debug!(reference, path = %path, "resolved reference locally");
                return Ok(content);
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => return Err(ReferenceError::LocalRead { path, error }),
        }

        let remote =
            RemoteRef::parse(reference).ok_or_else(|| ReferenceError::NotFound(reference.to_string()))?;
        self.fetch_remote(remote)
    }

    /// Remote-only resolution, used for workflow references.
    pub fn fetch_remote_reference(&self, reference: &str) -> Result<Vec<u8>, ReferenceError> {
        let remote = RemoteRef::parse(reference)
            .ok_or_else(|| ReferenceError::InvalidRemote(reference.to_string()))?;
        self.fetch_remote(remote)
    }

    fn fetch_remote(&self, remote: RemoteRef<'_>) -> Result<Vec<u8>, ReferenceError> {
        debug!(owner = remote.owner, repo = remote.repo, path = remote.path, "fetching remote reference");
        self.get_remote_file_content(remote.owner, remote.repo, remote.path)
            .map_err(ReferenceError::Remote)
    }

    /// Resolves a reference and parses it as a ruleset document.
    pub fn fetch_reference_ruleset(&self, reference: &str) -> Result<Ruleset, ReferenceError> {
        let content = self.resolve_reference(reference)?;
        serde_json::from_slice(&content).map_err(ReferenceError::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_ref_keeps_nested_path() {
        let r = RemoteRef::parse("acme/acme/.repolint/rulesets/main.json").unwrap();
        assert_eq!(r.owner, "acme");
        assert_eq!(r.repo, "acme");
        assert_eq!(r.path, ".repolint/rulesets/main.json");
    }

    #[test]
    fn remote_ref_rejects_short_or_empty_components() {
        assert_eq!(RemoteRef::parse("foo"), None);
        assert_eq!(RemoteRef::parse("acme/acme"), None);
        assert_eq!(RemoteRef::parse("acme//x.json"), None);
        assert_eq!(RemoteRef::parse("acme/acme/"), None);
    }
}
