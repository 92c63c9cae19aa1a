//! Policy document model.
//!
//! Every leaf is optional so "unset" stays distinguishable from an explicit
//! `false`. Arrays are `Option<Vec<_>>`: an explicitly empty list is still
//! "set" and replaces the org-scope list during merge.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub checks: ChecksConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<SettingsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<ActionsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rulesets: Option<Vec<RulesetConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileConfig>>,
}

impl ChecksConfig {
    pub fn rulesets(&self) -> &[RulesetConfig] {
        self.rulesets.as_deref().unwrap_or_default()
    }

    pub fn files(&self) -> &[FileConfig] {
        self.files.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discussions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_actions_to_approve_prs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_creation_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeConfig>,
    /// Glob pattern the default branch name must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependabot: Option<DependabotSettingsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_merge_commit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_squash_merge: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_rebase_merge: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_auto_merge: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_branch_on_merge: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_suggest_updating_pull_request_branches: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependabotSettingsConfig {
    /// Vulnerability alerts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerts: Option<bool>,
    /// Automated security fixes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_updates: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_pinned_versions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_workflows: Option<Vec<WorkflowConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_timeout: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_timeout_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_minimal_permissions: Option<bool>,
}

impl ActionsConfig {
    pub fn required_workflows(&self) -> &[WorkflowConfig] {
        self.required_workflows.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl WorkflowConfig {
    /// The reference, with an empty string treated as absent.
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref().filter(|r| !r.is_empty())
    }
}

/// A ruleset that must exist and match the JSON document at `reference`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesetConfig {
    pub name: String,
    #[serde(default)]
    pub reference: String,
}

/// A local file that must match the content at `reference`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    pub name: String,
    #[serde(default)]
    pub reference: String,
}
