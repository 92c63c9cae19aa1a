//! Repo-scope over org-scope precedence merge.
//!
//! - Scalars: the repo value wins when set; otherwise the org value.
//! - Strings: an empty string counts as unset.
//! - Nested groups: merged field by field when both sides exist.
//! - Arrays: a repo-scope array (even empty) replaces the org array.

use crate::model::{
    ActionsConfig, ChecksConfig, Config, DependabotSettingsConfig, MergeConfig, SettingsConfig,
};

pub fn merge_configs(owner: Option<&Config>, repo: Option<&Config>) -> Option<Config> {
    match (owner, repo) {
        (None, None) => None,
        (Some(owner), None) => Some(owner.clone()),
        (None, Some(repo)) => Some(repo.clone()),
        (Some(owner), Some(repo)) => Some(Config {
            checks: merge_checks(&owner.checks, &repo.checks),
        }),
    }
}

fn merge_checks(owner: &ChecksConfig, repo: &ChecksConfig) -> ChecksConfig {
    ChecksConfig {
        settings: merge_nested(&owner.settings, &repo.settings, merge_settings),
        actions: merge_nested(&owner.actions, &repo.actions, merge_actions),
        rulesets: merge_scalar(&owner.rulesets, &repo.rulesets),
        files: merge_scalar(&owner.files, &repo.files),
    }
}

fn merge_settings(owner: &SettingsConfig, repo: &SettingsConfig) -> SettingsConfig {
    SettingsConfig {
        issues: merge_scalar(&owner.issues, &repo.issues),
        wiki: merge_scalar(&owner.wiki, &repo.wiki),
        projects: merge_scalar(&owner.projects, &repo.projects),
        discussions: merge_scalar(&owner.discussions, &repo.discussions),
        allow_actions_to_approve_prs: merge_scalar(
            &owner.allow_actions_to_approve_prs,
            &repo.allow_actions_to_approve_prs,
        ),
        pull_request_creation_policy: merge_string(
            &owner.pull_request_creation_policy,
            &repo.pull_request_creation_policy,
        ),
        merge: merge_nested(&owner.merge, &repo.merge, merge_merge),
        default_branch: merge_string(&owner.default_branch, &repo.default_branch),
        dependabot: merge_nested(&owner.dependabot, &repo.dependabot, merge_dependabot),
    }
}

fn merge_merge(owner: &MergeConfig, repo: &MergeConfig) -> MergeConfig {
    MergeConfig {
        allow_merge_commit: merge_scalar(&owner.allow_merge_commit, &repo.allow_merge_commit),
        allow_squash_merge: merge_scalar(&owner.allow_squash_merge, &repo.allow_squash_merge),
        allow_rebase_merge: merge_scalar(&owner.allow_rebase_merge, &repo.allow_rebase_merge),
        allow_auto_merge: merge_scalar(&owner.allow_auto_merge, &repo.allow_auto_merge),
        delete_branch_on_merge: merge_scalar(
            &owner.delete_branch_on_merge,
            &repo.delete_branch_on_merge,
        ),
        always_suggest_updating_pull_request_branches: merge_scalar(
            &owner.always_suggest_updating_pull_request_branches,
            &repo.always_suggest_updating_pull_request_branches,
        ),
    }
}

fn merge_dependabot(
    owner: &DependabotSettingsConfig,
    repo: &DependabotSettingsConfig,
) -> DependabotSettingsConfig {
    DependabotSettingsConfig {
        alerts: merge_scalar(&owner.alerts, &repo.alerts),
        security_updates: merge_scalar(&owner.security_updates, &repo.security_updates),
    }
}

fn merge_actions(owner: &ActionsConfig, repo: &ActionsConfig) -> ActionsConfig {
    ActionsConfig {
        require_pinned_versions: merge_scalar(
            &owner.require_pinned_versions,
            &repo.require_pinned_versions,
        ),
        required_workflows: merge_scalar(&owner.required_workflows, &repo.required_workflows),
        require_timeout: merge_scalar(&owner.require_timeout, &repo.require_timeout),
        max_timeout_minutes: merge_scalar(&owner.max_timeout_minutes, &repo.max_timeout_minutes),
        require_minimal_permissions: merge_scalar(
            &owner.require_minimal_permissions,
            &repo.require_minimal_permissions,
        ),
    }
}

fn merge_scalar<T: Clone>(owner: &Option<T>, repo: &Option<T>) -> Option<T> {
    repo.clone().or_else(|| owner.clone())
}

fn merge_string(owner: &Option<String>, repo: &Option<String>) -> Option<String> {
    let set = |s: &Option<String>| s.clone().filter(|v| !v.is_empty());
    set(repo).or_else(|| set(owner))
}

fn merge_nested<T: Clone>(owner: &Option<T>, repo: &Option<T>, merge: fn(&T, &T) -> T) -> Option<T> {
    match (owner, repo) {
        (Some(owner), Some(repo)) => Some(merge(owner, repo)),
        _ => merge_scalar(owner, repo),
    }
}
