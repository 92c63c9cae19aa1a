use crate::error::FixError;
use crate::fixers::Fixer;
use repolint_config::FileConfig;
use repolint_github::Client;
use repolint_types::{Issue, data_keys};
use tracing::info;

/// Overwrites a working-directory file with its hydrated reference.
pub struct FilesFixer {
    configs: Vec<FileConfig>,
}

impl FilesFixer {
    pub fn new(configs: Vec<FileConfig>) -> Self {
        Self { configs }
    }
}

impl Fixer for FilesFixer {
    fn name(&self) -> &'static str {
        "files"
    }

    fn fix(&self, client: &Client, issue: &Issue) -> Result<(), FixError> {
        let name = issue
            .data(data_keys::FILE_NAME)
            .ok_or(FixError::MissingData(data_keys::FILE_NAME))?;
        let cfg = self
            .configs
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| FixError::NoConfig {
                kind: "file",
                name: name.to_string(),
            })?;
        if cfg.reference.is_empty() {
            return Err(FixError::NoReference {
                kind: "file",
                name: name.to_string(),
            });
        }

        let content = client
            .resolve_reference(&cfg.reference)
            .map_err(FixError::reference("file"))?;
        let content = client.hydrate_template(&content);

        client
            .write_file(&cfg.name, &content)
            .map_err(FixError::write(&cfg.name))?;
        info!(file = %cfg.name, reference = %cfg.reference, "wrote file");
        Ok(())
    }
}
