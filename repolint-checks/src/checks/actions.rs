use crate::checks::Check;
use crate::error::CheckError;
use crate::workflow::{Timeout, Workflow, unpinned_actions, yaml_equivalent};
use camino::Utf8PathBuf;
use repolint_config::{ActionsConfig, WorkflowConfig};
use repolint_github::Client;
use repolint_types::{CheckType, Issue, data_keys};
use std::io;
use tracing::debug;

/// Directory scanned for workflow files, relative to the working directory.
pub const WORKFLOWS_DIR: &str = ".github/workflows";

pub struct ActionsCheck {
    config: Option<ActionsConfig>,
}

impl ActionsCheck {
    pub fn new(config: Option<ActionsConfig>) -> Self {
        Self { config }
    }

    fn issue(&self, message: String) -> Issue {
        Issue::new(self.check_type(), self.name(), message)
    }

    fn check_required(
        &self,
        client: &Client,
        workflow: &WorkflowConfig,
        default_branch: &mut Option<String>,
    ) -> Result<Option<Issue>, CheckError> {
        let reference = workflow.reference();

        if !client.file_exists(&workflow.path) {
            return Ok(Some(
                self.issue(format!("Required workflow '{}' is missing", workflow.path))
                    .fixable(reference.is_some())
                    .with_data(data_keys::FILE_NAME, &workflow.path)
                    .with_data(data_keys::REFERENCE, reference.unwrap_or_default()),
            ));
        }

        let Some(reference) = reference else {
            return Ok(None);
        };

        let branch = match default_branch {
            Some(branch) => branch.clone(),
            None => {
                let repo = client
                    .get_repository()
                    .map_err(CheckError::api("repository"))?;
                default_branch.insert(repo.default_branch).clone()
            }
        };

        let expected = client
            .fetch_remote_reference(reference)
            .map_err(CheckError::reference("workflow"))?;
        let expected = client.hydrate_workflow_template(&expected, &branch);
        let actual = client
            .read_local_file(&workflow.path)
            .map_err(CheckError::io(&workflow.path))?;

        if yaml_equivalent(&expected, &actual) {
            debug!(path = %workflow.path, reference, "workflow matches reference");
            return Ok(None);
        }

        Ok(Some(
            self.issue(format!(
                "Workflow '{}' does not match reference '{reference}'",
                workflow.path
            ))
            .fixable(true)
            .with_data(data_keys::FILE_NAME, &workflow.path)
            .with_data(data_keys::REFERENCE, reference),
        ))
    }

    fn check_rules(
        &self,
        cfg: &ActionsConfig,
        path: &str,
        content: &[u8],
        issues: &mut Vec<Issue>,
    ) -> Result<(), CheckError> {
        let workflow = Workflow::parse(content).map_err(|error| CheckError::InvalidWorkflow {
            path: path.to_string(),
            error,
        })?;

        if cfg.require_pinned_versions == Some(true) {
            let text = String::from_utf8_lossy(content);
            for unpinned in unpinned_actions(&text) {
                issues.push(self.issue(format!(
                    "Action '{}@{}' in '{path}' is not pinned to a SHA",
                    unpinned.action, unpinned.version
                )));
            }
        }

        if cfg.require_timeout == Some(true) {
            for (job, spec) in &workflow.jobs {
                match spec.timeout() {
                    Timeout::Missing => issues.push(self.issue(format!(
                        "Job '{job}' in '{path}' does not have timeout-minutes set"
                    ))),
                    Timeout::Minutes(minutes) => {
                        if let Some(max) = cfg.max_timeout_minutes
                            && minutes > u64::from(max)
                        {
                            issues.push(self.issue(format!(
                                "Job '{job}' in '{path}' has timeout-minutes ({minutes}) exceeding maximum ({max})"
                            )));
                        }
                    }
                    Timeout::Dynamic => {}
                }
            }
        }

        if cfg.require_minimal_permissions == Some(true) && !workflow.declares_permissions() {
            issues.push(self.issue(format!(
                "Workflow '{path}' does not declare permissions at workflow or job level"
            )));
        }

        Ok(())
    }
}

impl Check for ActionsCheck {
    fn check_type(&self) -> CheckType {
        CheckType::Actions
    }

    fn name(&self) -> String {
        "actions".to_string()
    }

    fn run(&self, client: &Client) -> Result<Vec<Issue>, CheckError> {
        let Some(cfg) = &self.config else {
            return Ok(vec![]);
        };

        let mut issues = Vec::new();
        let mut default_branch = None;
        for workflow in cfg.required_workflows() {
            if let Some(issue) = self.check_required(client, workflow, &mut default_branch)? {
                issues.push(issue);
            }
        }

        let any_rule = [
            cfg.require_pinned_versions,
            cfg.require_timeout,
            cfg.require_minimal_permissions,
        ]
        .contains(&Some(true));
        if !any_rule {
            return Ok(issues);
        }

        for path in workflow_files(client)? {
            let content = client
                .read_local_file(&path)
                .map_err(CheckError::io(path.as_str()))?;
            self.check_rules(cfg, path.as_str(), &content, &mut issues)?;
        }

        Ok(issues)
    }
}

/// `.yml` and `.yaml` files directly under the workflows directory, sorted.
///
/// Paths are relative to the working directory. A missing directory yields
/// no files.
pub fn workflow_files(client: &Client) -> Result<Vec<Utf8PathBuf>, CheckError> {
    let dir = client.local_path(WORKFLOWS_DIR);
    let entries = match dir.read_dir_utf8() {
        Ok(entries) => entries,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
        Err(error) => return Err(CheckError::io(WORKFLOWS_DIR)(error)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(CheckError::io(WORKFLOWS_DIR))?;
        if entry.path().is_dir() {
            continue;
        }
        if matches!(entry.path().extension(), Some("yml" | "yaml")) {
            files.push(Utf8PathBuf::from(WORKFLOWS_DIR).join(entry.file_name()));
        }
    }
    files.sort();
    Ok(files)
}
