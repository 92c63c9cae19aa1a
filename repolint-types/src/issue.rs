use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category of a check; also selects the fixer for an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckType {
    Settings,
    Actions,
    Rulesets,
    Files,
}

impl CheckType {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckType::Settings => "settings",
            CheckType::Actions => "actions",
            CheckType::Rulesets => "rulesets",
            CheckType::Files => "files",
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys used in [`Issue::data`] to hand context from a check to its fixer.
pub mod data_keys {
    pub const FILE_NAME: &str = "file_name";
    pub const REFERENCE: &str = "reference";
    pub const RULESET_NAME: &str = "ruleset_name";
    pub const SETTING: &str = "setting";
}

/// A single compliance violation.
///
/// `name` is the originating check's name (e.g. `rulesets(main)`), not the
/// check type. `data` carries whatever the fixer needs to locate its config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub check_type: CheckType,
    pub name: String,
    pub message: String,
    pub fixable: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

impl Issue {
    pub fn new(check_type: CheckType, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            check_type,
            name: name.into(),
            message: message.into(),
            fixable: false,
            data: BTreeMap::new(),
        }
    }

    pub fn fixable(mut self, fixable: bool) -> Self {
        self.fixable = fixable;
        self
    }

    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    /// Looks up a data value. An empty string counts as missing.
    pub fn data(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Whether a registered check ran or was skipped by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStatus {
    pub name: String,
    pub skipped: bool,
}

pub fn fixable_count(issues: &[Issue]) -> usize {
    issues.iter().filter(|i| i.fixable).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn check_type_serializes_snake_case() {
        let json = serde_json::to_string(&CheckType::Rulesets).unwrap();
        assert_eq!(json, "\"rulesets\"");
        assert_eq!(CheckType::Files.to_string(), "files");
    }

    #[test]
    fn empty_data_value_reads_as_missing() {
        let issue = Issue::new(CheckType::Files, "files(README.md)", "File 'README.md' does not exist")
            .fixable(true)
            .with_data(data_keys::FILE_NAME, "README.md")
            .with_data(data_keys::REFERENCE, "");

        assert_eq!(issue.data(data_keys::FILE_NAME), Some("README.md"));
        assert_eq!(issue.data(data_keys::REFERENCE), None);
        assert_eq!(issue.data(data_keys::SETTING), None);
    }

    #[test]
    fn fixable_count_ignores_manual_issues() {
        let issues = vec![
            Issue::new(CheckType::Settings, "settings", "a").fixable(true),
            Issue::new(CheckType::Settings, "settings", "b"),
            Issue::new(CheckType::Actions, "actions", "c").fixable(true),
        ];
        assert_eq!(fixable_count(&issues), 2);
        assert_eq!(fixable_count(&[]), 0);
    }
}
