use crate::error::FixError;
use crate::fixers::Fixer;
use repolint_config::{MergeConfig, SettingsConfig};
use repolint_github::Client;
use repolint_types::github::RepoUpdateRequest;
use repolint_types::{Issue, data_keys};
use tracing::debug;

pub struct SettingsFixer {
    config: Option<SettingsConfig>,
}

impl SettingsFixer {
    pub fn new(config: Option<SettingsConfig>) -> Self {
        Self { config }
    }

    /// The repository PATCH that sets exactly `setting` to its configured value.
    fn update_for(cfg: &SettingsConfig, setting: &str) -> Result<RepoUpdateRequest, FixError> {
        let wanted = |value: Option<bool>| value.ok_or_else(|| FixError::NotConfigured(setting.to_string()));
        let merge = || cfg.merge.as_ref().ok_or_else(|| FixError::NotConfigured("merge settings".into()));
        let merged = |pick: fn(&MergeConfig) -> Option<bool>| -> Result<Option<bool>, FixError> {
            Ok(Some(wanted(pick(merge()?))?))
        };

        let mut update = RepoUpdateRequest::default();
        match setting {
            "issues" => update.has_issues = Some(wanted(cfg.issues)?),
            "wiki" => update.has_wiki = Some(wanted(cfg.wiki)?),
            "projects" => update.has_projects = Some(wanted(cfg.projects)?),
            "discussions" => update.has_discussions = Some(wanted(cfg.discussions)?),
            "pull_request_creation_policy" => {
                let policy = cfg
                    .pull_request_creation_policy
                    .clone()
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| FixError::NotConfigured(setting.to_string()))?;
                update.pull_request_creation_policy = Some(policy);
            }
            "merge_commit" => update.allow_merge_commit = merged(|m| m.allow_merge_commit)?,
            "squash_merge" => update.allow_squash_merge = merged(|m| m.allow_squash_merge)?,
            "rebase_merge" => update.allow_rebase_merge = merged(|m| m.allow_rebase_merge)?,
            "auto_merge" => update.allow_auto_merge = merged(|m| m.allow_auto_merge)?,
            "delete_branch_on_merge" => {
                update.delete_branch_on_merge = merged(|m| m.delete_branch_on_merge)?
            }
            "update_branch" => {
                update.allow_update_branch =
                    merged(|m| m.always_suggest_updating_pull_request_branches)?
            }
            other => return Err(FixError::UnknownSetting(other.to_string())),
        }
        Ok(update)
    }
}

impl Fixer for SettingsFixer {
    fn name(&self) -> &'static str {
        "settings"
    }

    fn fix(&self, client: &Client, issue: &Issue) -> Result<(), FixError> {
        let setting = issue
            .data(data_keys::SETTING)
            .ok_or(FixError::MissingData(data_keys::SETTING))?;
        let cfg = self
            .config
            .as_ref()
            .ok_or_else(|| FixError::NotConfigured("settings".into()))?;
        debug!(setting, "fixing setting");

        match setting {
            "actions_approve_prs" => {
                let allow = cfg
                    .allow_actions_to_approve_prs
                    .ok_or_else(|| FixError::NotConfigured("allow_actions_to_approve_prs".into()))?;
                client
                    .update_workflow_permissions(allow)
                    .map_err(FixError::api("update workflow permissions"))
            }
            "dependabot_alerts" => {
                let enable = cfg
                    .dependabot
                    .as_ref()
                    .and_then(|d| d.alerts)
                    .ok_or_else(|| FixError::NotConfigured("dependabot alerts".into()))?;
                let result = if enable {
                    client.enable_vulnerability_alerts()
                } else {
                    client.disable_vulnerability_alerts()
                };
                result.map_err(FixError::api("update vulnerability alerts"))
            }
            "dependabot_security_updates" => {
                let enable = cfg
                    .dependabot
                    .as_ref()
                    .and_then(|d| d.security_updates)
                    .ok_or_else(|| FixError::NotConfigured("dependabot security updates".into()))?;
                let result = if enable {
                    client.enable_automated_security_fixes()
                } else {
                    client.disable_automated_security_fixes()
                };
                result.map_err(FixError::api("update automated security fixes"))
            }
            _ => {
                let update = Self::update_for(cfg, setting)?;
                client
                    .update_repository(&update)
                    .map_err(FixError::api("update repository"))
            }
        }
    }
}
