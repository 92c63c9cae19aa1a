use crate::error::FixError;
use crate::fixers::Fixer;
use repolint_config::ActionsConfig;
use repolint_github::Client;
use repolint_types::{Issue, data_keys};
use tracing::info;

/// Writes a required workflow from its remote reference.
pub struct ActionsFixer {
    config: Option<ActionsConfig>,
}

impl ActionsFixer {
    pub fn new(config: Option<ActionsConfig>) -> Self {
        Self { config }
    }
}

impl Fixer for ActionsFixer {
    fn name(&self) -> &'static str {
        "actions"
    }

    fn fix(&self, client: &Client, issue: &Issue) -> Result<(), FixError> {
        let path = issue
            .data(data_keys::FILE_NAME)
            .ok_or(FixError::MissingData(data_keys::FILE_NAME))?;
        let reference = self
            .config
            .as_ref()
            .and_then(|cfg| cfg.required_workflows().iter().find(|w| w.path == path))
            .and_then(|w| w.reference())
            .ok_or_else(|| FixError::NoReference {
                kind: "workflow",
                name: path.to_string(),
            })?;

        let content = client
            .fetch_remote_reference(reference)
            .map_err(FixError::reference("workflow"))?;
        let repo = client
            .get_repository()
            .map_err(FixError::api("fetch repository"))?;
        let content = client.hydrate_workflow_template(&content, &repo.default_branch);

        client
            .write_file(path, &content)
            .map_err(FixError::write(path))?;
        info!(path, reference, "wrote workflow");
        Ok(())
    }
}
