use crate::checks::Check;
use crate::error::CheckError;
use globset::GlobBuilder;
use repolint_config::{DependabotSettingsConfig, MergeConfig, SettingsConfig};
use repolint_github::Client;
use repolint_types::github::Repository;
use repolint_types::{CheckType, Issue, data_keys};

/// Repository feature toggles, merge options, default branch naming,
/// pull-request creation policy and Dependabot switches.
pub struct SettingsCheck {
    config: Option<SettingsConfig>,
}

impl SettingsCheck {
    pub fn new(config: Option<SettingsConfig>) -> Self {
        Self { config }
    }

    fn issue(&self, message: String, setting: &str) -> Issue {
        Issue::new(self.check_type(), self.name(), message)
            .fixable(true)
            .with_data(data_keys::SETTING, setting)
    }

    /// Emits an issue when a configured toggle differs from the live value.
    fn compare(
        &self,
        issues: &mut Vec<Issue>,
        want: Option<bool>,
        actual: bool,
        setting: &str,
        subject: &str,
        words: fn(bool) -> &'static str,
    ) {
        let Some(want) = want else { return };
        if actual != want {
            issues.push(self.issue(
                format!("{subject} {} but should be {}", words(actual), words(want)),
                setting,
            ));
        }
    }

    fn check_merge(&self, merge: &MergeConfig, repo: &Repository, issues: &mut Vec<Issue>) {
        self.compare(
            issues,
            merge.allow_merge_commit,
            repo.allow_merge_commit,
            "merge_commit",
            "Merge commits are",
            allowed,
        );
        self.compare(
            issues,
            merge.allow_squash_merge,
            repo.allow_squash_merge,
            "squash_merge",
            "Squash merge is",
            allowed,
        );
        self.compare(
            issues,
            merge.allow_rebase_merge,
            repo.allow_rebase_merge,
            "rebase_merge",
            "Rebase merge is",
            allowed,
        );
        self.compare(
            issues,
            merge.allow_auto_merge,
            repo.allow_auto_merge,
            "auto_merge",
            "Auto-merge is",
            enabled,
        );
        self.compare(
            issues,
            merge.delete_branch_on_merge,
            repo.delete_branch_on_merge,
            "delete_branch_on_merge",
            "Delete branch on merge is",
            enabled,
        );
        self.compare(
            issues,
            merge.always_suggest_updating_pull_request_branches,
            repo.allow_update_branch,
            "update_branch",
            "Always suggest updating PR branches is",
            enabled,
        );
    }

    fn check_dependabot(
        &self,
        client: &Client,
        dependabot: &DependabotSettingsConfig,
        issues: &mut Vec<Issue>,
    ) -> Result<(), CheckError> {
        if let Some(want) = dependabot.alerts {
            let actual = client
                .get_vulnerability_alerts_enabled()
                .map_err(CheckError::api("vulnerability alerts"))?;
            self.compare(
                issues,
                Some(want),
                actual,
                "dependabot_alerts",
                "Dependabot alerts is",
                enabled,
            );
        }

        if let Some(want) = dependabot.security_updates {
            let actual = client
                .get_automated_security_fixes()
                .map_err(CheckError::api("automated security fixes"))?;
            self.compare(
                issues,
                Some(want),
                actual.enabled,
                "dependabot_security_updates",
                "Dependabot security updates is",
                enabled,
            );
        }
        Ok(())
    }
}

impl Check for SettingsCheck {
    fn check_type(&self) -> CheckType {
        CheckType::Settings
    }

    fn name(&self) -> String {
        "settings".to_string()
    }

    fn run(&self, client: &Client) -> Result<Vec<Issue>, CheckError> {
        let Some(cfg) = &self.config else {
            return Ok(vec![]);
        };

        let repo = client
            .get_repository()
            .map_err(CheckError::api("repository"))?;
        let mut issues = Vec::new();

        self.compare(&mut issues, cfg.issues, repo.has_issues, "issues", "Issues is", enabled);
        self.compare(&mut issues, cfg.wiki, repo.has_wiki, "wiki", "Wiki is", enabled);
        self.compare(
            &mut issues,
            cfg.projects,
            repo.has_projects,
            "projects",
            "Projects is",
            enabled,
        );
        self.compare(
            &mut issues,
            cfg.discussions,
            repo.has_discussions,
            "discussions",
            "Discussions is",
            enabled,
        );

        if let Some(want) = cfg.allow_actions_to_approve_prs {
            let perms = client
                .get_workflow_permissions()
                .map_err(CheckError::api("workflow permissions"))?;
            self.compare(
                &mut issues,
                Some(want),
                perms.can_approve_pull_request_reviews,
                "actions_approve_prs",
                "Actions can approve PRs is",
                enabled,
            );
        }

        if let Some(merge) = &cfg.merge {
            self.check_merge(merge, &repo, &mut issues);
        }

        if let Some(pattern) = cfg.default_branch.as_deref().filter(|p| !p.is_empty()) {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(false)
                .build()
                .map_err(CheckError::Pattern)?
                .compile_matcher();
            if !glob.is_match(&repo.default_branch) {
                // Renaming the default branch is left to a human.
                issues.push(Issue::new(
                    self.check_type(),
                    self.name(),
                    format!(
                        "Default branch '{}' does not match pattern '{pattern}'",
                        repo.default_branch
                    ),
                ));
            }
        }

        if let Some(policy) = cfg
            .pull_request_creation_policy
            .as_deref()
            .filter(|p| !p.is_empty())
            && repo.pull_request_creation_policy != policy
        {
            issues.push(self.issue(
                format!(
                    "Pull request creation policy is '{}' but should be '{policy}'",
                    repo.pull_request_creation_policy
                ),
                "pull_request_creation_policy",
            ));
        }

        if let Some(dependabot) = &cfg.dependabot {
            self.check_dependabot(client, dependabot, &mut issues)?;
        }

        Ok(issues)
    }
}

fn enabled(value: bool) -> &'static str {
    if value { "enabled" } else { "disabled" }
}

fn allowed(value: bool) -> &'static str {
    if value { "allowed" } else { "disallowed" }
}
