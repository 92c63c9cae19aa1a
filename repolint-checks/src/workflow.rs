//! The slice of the GitHub Actions workflow schema the checks inspect.

use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Matches `uses: owner/action@version`.
pub const USES_PATTERN: &str = r"uses:\s*([^\s@]+)@([^\s]+)";

static USES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(USES_PATTERN).expect("valid uses pattern"));

/// Prefixes of first-party actions exempt from SHA pinning.
pub const FIRST_PARTY_PREFIXES: [&str; 4] = ["actions/", "github/", "cli/", "dependabot/"];

#[derive(Debug, Default, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub permissions: Option<Value>,
    #[serde(default)]
    pub jobs: BTreeMap<String, WorkflowJob>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkflowJob {
    #[serde(default, rename = "timeout-minutes")]
    pub timeout_minutes: Option<Value>,
    #[serde(default)]
    pub permissions: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    Missing,
    Minutes(u64),
    /// Set, but not a literal integer (e.g. an `${{ }}` expression).
    Dynamic,
}

impl WorkflowJob {
    pub fn timeout(&self) -> Timeout {
        match &self.timeout_minutes {
            None => Timeout::Missing,
            Some(value) => match value.as_u64() {
                Some(0) => Timeout::Missing,
                Some(minutes) => Timeout::Minutes(minutes),
                None => Timeout::Dynamic,
            },
        }
    }
}

impl Workflow {
    pub fn parse(content: &[u8]) -> Result<Self, serde_yaml::Error> {
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_yaml::from_slice(content)
    }

    /// True when the workflow or every one of its jobs declares permissions.
    pub fn declares_permissions(&self) -> bool {
        self.permissions.is_some() || self.jobs.values().all(|job| job.permissions.is_some())
    }
}

/// A third-party `uses:` reference not pinned to a commit SHA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpinnedAction {
    pub action: String,
    pub version: String,
}

pub fn unpinned_actions(content: &str) -> Vec<UnpinnedAction> {
    USES.captures_iter(content)
        .filter_map(|caps| {
            let action = caps.get(1)?.as_str();
            let version = caps.get(2)?.as_str();
            if FIRST_PARTY_PREFIXES.iter().any(|p| action.starts_with(p)) || is_sha(version) {
                return None;
            }
            Some(UnpinnedAction {
                action: action.to_string(),
                version: version.to_string(),
            })
        })
        .collect()
}

/// 40 hexadecimal characters.
pub fn is_sha(version: &str) -> bool {
    version.len() == 40 && version.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Structural YAML equality: key order and formatting are ignored.
///
/// Unparseable input on either side compares unequal.
pub fn yaml_equivalent(a: &[u8], b: &[u8]) -> bool {
    let (Ok(a), Ok(b)) = (
        serde_yaml::from_slice::<Value>(a),
        serde_yaml::from_slice::<Value>(b),
    ) else {
        return false;
    };
    match (
        serde_yaml::to_string(&canonical(a)),
        serde_yaml::to_string(&canonical(b)),
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Recursively sorts mapping keys.
fn canonical(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut entries: Vec<(Value, Value)> =
                map.into_iter().map(|(k, v)| (k, canonical(v))).collect();
            entries.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
            Value::Mapping(entries.into_iter().collect())
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(canonical).collect()),
        Value::Tagged(mut tagged) => {
            tagged.value = canonical(std::mem::replace(&mut tagged.value, Value::Null));
            Value::Tagged(tagged)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sha_detection() {
        assert!(is_sha("8e5e7e5ab8b370d6c329ec480221332ada57f0ab"));
        assert!(!is_sha("v4"));
        assert!(!is_sha("8e5e7e5ab8b370d6c329ec480221332ada57f0a"));
        assert!(!is_sha("ze5e7e5ab8b370d6c329ec480221332ada57f0ab"));
    }

    #[test]
    fn unpinned_third_party_actions_are_reported() {
        let content = r#"
jobs:
  build:
    steps:
      - uses: actions/checkout@v4
      - uses: docker/build-push-action@v5
      - uses: codecov/codecov-action@8e5e7e5ab8b370d6c329ec480221332ada57f0ab
      - uses: github/codeql-action/init@v3
"#;
        let found = unpinned_actions(content);
        assert_eq!(
            found,
            vec![UnpinnedAction {
                action: "docker/build-push-action".into(),
                version: "v5".into(),
            }]
        );
    }

    #[test]
    fn yaml_equivalence_ignores_order_and_formatting() {
        let a = b"name: ci\non: [push]\njobs:\n  b: {runs-on: x}\n  a: {runs-on: y}\n";
        let b = b"jobs:\n  a:\n    runs-on: y\n  b:\n    runs-on: x\non:\n  - push\nname: ci # comment\n";
        assert!(yaml_equivalent(a, b));
        assert!(!yaml_equivalent(a, b"name: cd\n"));
        assert!(!yaml_equivalent(b"key: [", b"key: ["));
    }

    #[test]
    fn yaml_equivalence_sorts_non_string_keys() {
        let a = b"on:\n  push: {}\n1: one\ntrue: yes\n2: two\n";
        let b = b"2: two\ntrue: yes\n1: one\non: {push: {}}\n";
        assert!(yaml_equivalent(a, b));
        assert!(!yaml_equivalent(a, b"1: one\n2: three\ntrue: yes\non: {push: {}}\n"));
    }

    #[test]
    fn timeout_classification() {
        let wf = Workflow::parse(
            b"jobs:\n  a:\n    timeout-minutes: 10\n  b: {}\n  c:\n    timeout-minutes: ${{ inputs.t }}\n  d:\n    timeout-minutes: 0\n",
        )
        .unwrap();
        assert_eq!(wf.jobs["a"].timeout(), Timeout::Minutes(10));
        assert_eq!(wf.jobs["b"].timeout(), Timeout::Missing);
        assert_eq!(wf.jobs["c"].timeout(), Timeout::Dynamic);
        assert_eq!(wf.jobs["d"].timeout(), Timeout::Missing);
    }

    #[test]
    fn permissions_at_workflow_or_every_job() {
        let top = Workflow::parse(b"permissions: read-all\njobs:\n  a: {}\n").unwrap();
        assert!(top.declares_permissions());

        let all_jobs =
            Workflow::parse(b"jobs:\n  a:\n    permissions: {}\n  b:\n    permissions: read-all\n").unwrap();
        assert!(all_jobs.declares_permissions());

        let partial = Workflow::parse(b"jobs:\n  a:\n    permissions: {}\n  b: {}\n").unwrap();
        assert!(!partial.declares_permissions());
    }
}
