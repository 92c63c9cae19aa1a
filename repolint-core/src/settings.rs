//! Clap-free settings for the lint and config pipelines.

use camino::Utf8PathBuf;
use repolint_github::{Client, Transport};

#[derive(Debug, Clone)]
pub struct Settings {
    /// Local files and repo-scope policy are resolved against this directory.
    pub workdir: Utf8PathBuf,
    pub owner: String,
    pub repo: String,

    /// Explicit policy file. Disables discovery and the org scope.
    pub config_path: Option<Utf8PathBuf>,

    /// Check instance names to skip, e.g. `files(LICENSE)`.
    pub skip: Vec<String>,
    pub fix: bool,

    // Output
    pub verbose: bool,
    pub use_color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workdir: Utf8PathBuf::from("."),
            owner: String::new(),
            repo: String::new(),
            config_path: None,
            skip: Vec::new(),
            fix: false,
            verbose: false,
            use_color: false,
        }
    }
}

impl Settings {
    /// A client bound to `owner/repo` that reads local files under `workdir`.
    pub fn client(&self, transport: impl Transport + 'static) -> Client {
        Client::new(transport, self.owner.as_str(), self.repo.as_str())
            .with_workdir(self.workdir.clone())
    }
}
