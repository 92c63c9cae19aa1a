//! Policy discovery.
//!
//! Repo scope: `.repolint.yaml` / `.repolint.yml` in the working directory,
//! else at the enclosing git root. Org scope: the same names fetched from the
//! `<owner>/<owner>` repository, skipped when the working repository is
//! itself that repository.

use crate::merge::merge_configs;
use crate::model::Config;
use camino::{Utf8Path, Utf8PathBuf};
use repolint_github::{ApiError, Client};
use std::fmt;
use std::io;
use thiserror::Error;
use tracing::{debug, info};

/// Candidate file names, in priority order.
pub const CONFIG_FILE_NAMES: [&str; 2] = [".repolint.yaml", ".repolint.yml"];

/// Which precedence tier a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Repo,
    Owner,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Repo => "repo",
            Source::Owner => "owner",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "no configuration found: checked {owner}/{repo}/{{{names}}} and {owner}/{owner}/{{{names}}}"
    )]
    NotFound {
        owner: String,
        repo: String,
        names: String,
    },

    #[error("failed to read config file {path}: {error}")]
    Read { path: Utf8PathBuf, error: io::Error },

    #[error("invalid YAML in {origin}: {error}")]
    Parse {
        origin: String,
        error: serde_yaml::Error,
    },

    #[error("failed to fetch {origin}: {error}")]
    Remote { origin: String, error: ApiError },
}

/// The merged policy plus both unmerged sides and their origin labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedConfig {
    pub config: Config,
    pub repo_config: Option<Config>,
    pub owner_config: Option<Config>,
    /// `owner/repo/<file name>`, or the explicit path.
    pub repo_source: Option<String>,
    /// `owner/owner/<file name>`.
    pub owner_source: Option<String>,
}

impl LoadedConfig {
    /// A one-sided load from a single document treated as repo scope.
    pub fn from_repo(config: Config, source: impl Into<String>) -> Self {
        Self {
            config: config.clone(),
            repo_config: Some(config),
            owner_config: None,
            repo_source: Some(source.into()),
            owner_source: None,
        }
    }
}

pub struct Loader<'a> {
    client: &'a Client,
}

impl<'a> Loader<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Discovers both scopes and merges them.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let owner = self.client.owner();
        let repo = self.client.repo();

        let repo_side = self.load_local()?;
        let owner_side = self.load_owner()?;

        let repo_source = repo_side
            .as_ref()
            .map(|(_, name)| format!("{owner}/{repo}/{name}"));
        let owner_source = owner_side
            .as_ref()
            .map(|(_, name)| format!("{owner}/{owner}/{name}"));
        let repo_config = repo_side.map(|(cfg, _)| cfg);
        let owner_config = owner_side.map(|(cfg, _)| cfg);

        let Some(config) = merge_configs(owner_config.as_ref(), repo_config.as_ref()) else {
            return Err(ConfigError::NotFound {
                owner: owner.to_string(),
                repo: repo.to_string(),
                names: CONFIG_FILE_NAMES.join(","),
            });
        };

        info!(
            repo_source = repo_source.as_deref().unwrap_or("-"),
            owner_source = owner_source.as_deref().unwrap_or("-"),
            "loaded configuration"
        );

        Ok(LoadedConfig {
            config,
            repo_config,
            owner_config,
            repo_source,
            owner_source,
        })
    }

    /// Loads exactly one file, bypassing discovery. No org scope is consulted.
    pub fn load_from_file(&self, path: &Utf8Path) -> Result<LoadedConfig, ConfigError> {
        let full = self.client.local_path(path);
        let content = fs_err::read(&full).map_err(|error| ConfigError::Read {
            path: full.clone(),
            error,
        })?;
        let config = parse_config(&content, path.as_str())?;
        Ok(LoadedConfig::from_repo(config, path.as_str()))
    }

    fn load_local(&self) -> Result<Option<(Config, &'static str)>, ConfigError> {
        let workdir = self.client.workdir();
        let found = find_config_file(workdir).or_else(|| {
            let root = find_git_root(workdir)?;
            debug!(root = %root, "searching git root for config");
            find_config_file(&root)
        });
        let Some((path, name)) = found else {
            debug!("no repo-scope config found");
            return Ok(None);
        };

        let content = fs_err::read(&path).map_err(|error| ConfigError::Read {
            path: path.clone(),
            error,
        })?;
        let config = parse_config(&content, path.as_str())?;
        debug!(path = %path, "loaded repo-scope config");
        Ok(Some((config, name)))
    }

    fn load_owner(&self) -> Result<Option<(Config, &'static str)>, ConfigError> {
        let owner = self.client.owner();
        if self.client.repo() == owner {
            debug!("working repository is the org repository; skipping org scope");
            return Ok(None);
        }

        for name in CONFIG_FILE_NAMES {
            let origin = format!("{owner}/{owner}/{name}");
            match self.client.get_remote_file_content(owner, owner, name) {
                Ok(content) => {
                    let config = parse_config(&content, &origin)?;
                    debug!(origin, "loaded org-scope config");
                    return Ok(Some((config, name)));
                }
                Err(error) if error.is_not_found() => {
                    debug!(origin, "org-scope config not present");
                }
                Err(error) => return Err(ConfigError::Remote { origin, error }),
            }
        }
        Ok(None)
    }
}

/// Parses a policy document. Blank input yields an empty policy.
pub fn parse_config(content: &[u8], origin: &str) -> Result<Config, ConfigError> {
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(Config::default());
    }
    serde_yaml::from_slice(content).map_err(|error| ConfigError::Parse {
        origin: origin.to_string(),
        error,
    })
}

fn find_config_file(dir: &Utf8Path) -> Option<(Utf8PathBuf, &'static str)> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| (dir.join(name), *name))
        .find(|(path, _)| path.is_file())
}

/// Nearest ancestor of `start` (inclusive) containing a `.git` entry.
pub fn find_git_root(start: &Utf8Path) -> Option<Utf8PathBuf> {
    let start = start.canonicalize_utf8().ok()?;
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Utf8Path::to_path_buf)
}
