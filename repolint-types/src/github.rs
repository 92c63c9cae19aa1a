//! REST payloads exchanged with the GitHub API.
//!
//! Response types default every field so partial payloads (and reference
//! documents exported from the API) still deserialize.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub default_branch: String,
    pub archived: bool,
    pub has_issues: bool,
    pub has_wiki: bool,
    pub has_projects: bool,
    pub has_discussions: bool,
    pub pull_request_creation_policy: String,
    pub allow_merge_commit: bool,
    pub allow_squash_merge: bool,
    pub allow_rebase_merge: bool,
    pub allow_auto_merge: bool,
    pub delete_branch_on_merge: bool,
    pub allow_update_branch: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowPermissions {
    pub default_workflow_permissions: String,
    pub can_approve_pull_request_reviews: bool,
}

/// Status of Dependabot security updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomatedSecurityFixes {
    pub enabled: bool,
    pub paused: bool,
}

/// Body of `GET /repos/{owner}/{repo}/contents/{path}` for a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub encoding: String,
    pub size: u64,
    pub name: String,
    pub path: String,
    pub content: String,
    pub sha: String,
}

/// Partial repository update. Unset fields are omitted from the PATCH body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_wiki: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_projects: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_discussions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_request_creation_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_merge_commit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_squash_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_rebase_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_auto_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_branch_on_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_update_branch: Option<bool>,
}

impl RepoUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A repository ruleset. The list endpoint returns these without `rules`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ruleset {
    pub id: u64,
    pub name: String,
    pub target: String,
    pub enforcement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<RulesetConditions>,
    pub rules: Vec<RulesetRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass_actors: Option<Vec<BypassActor>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesetConditions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_name: Option<RefNameCondition>,
}

/// Branch or tag patterns a ruleset applies to. Order is significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefNameCondition {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesetRule {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BypassActor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<i64>,
    pub actor_type: String,
    pub bypass_mode: String,
}

impl BypassActor {
    /// Identity used for set comparison: `id:type:mode`.
    pub fn key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.actor_id.unwrap_or_default(),
            self.actor_type,
            self.bypass_mode
        )
    }
}

/// Body for ruleset create (POST) and update (PUT).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesetRequest {
    pub name: String,
    pub target: String,
    pub enforcement: String,
    pub conditions: RulesetConditions,
    pub rules: Vec<RulesetRule>,
    pub bypass_actors: Vec<BypassActor>,
}

impl RulesetRequest {
    /// Builds a request from a reference ruleset under the given name.
    ///
    /// Absent include/exclude lists and bypass actors are sent as empty lists.
    pub fn from_reference(name: &str, reference: &Ruleset) -> Self {
        let ref_name = reference
            .conditions
            .as_ref()
            .and_then(|c| c.ref_name.clone())
            .unwrap_or_default();
        Self {
            name: name.to_string(),
            target: reference.target.clone(),
            enforcement: reference.enforcement.clone(),
            conditions: RulesetConditions {
                ref_name: Some(ref_name),
            },
            rules: reference.rules.clone(),
            bypass_actors: reference.bypass_actors.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn update_request_omits_unset_fields() {
        let req = RepoUpdateRequest {
            has_wiki: Some(false),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({"has_wiki": false}));
        assert!(RepoUpdateRequest::default().is_empty());
        assert!(!req.is_empty());
    }

    #[test]
    fn ruleset_request_normalizes_missing_lists() {
        let reference: Ruleset = serde_json::from_value(json!({
            "name": "org-default",
            "target": "branch",
            "enforcement": "active",
            "rules": [{"type": "deletion"}]
        }))
        .unwrap();

        let req = RulesetRequest::from_reference("main", &reference);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "name": "main",
                "target": "branch",
                "enforcement": "active",
                "conditions": {"ref_name": {"include": [], "exclude": []}},
                "rules": [{"type": "deletion"}],
                "bypass_actors": []
            })
        );
    }

    #[test]
    fn bypass_actor_key_defaults_missing_id() {
        let actor = BypassActor {
            actor_id: None,
            actor_type: "OrganizationAdmin".into(),
            bypass_mode: "always".into(),
        };
        assert_eq!(actor.key(), "0:OrganizationAdmin:always");
    }
}
