use crate::checks::{self, Check};
use crate::error::CheckError;
use repolint_config::Config;
use repolint_github::Client;
use repolint_types::{CheckStatus, Issue};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Runs the registered checks in order.
pub struct Runner {
    checks: Vec<Box<dyn Check>>,
}

impl Runner {
    pub fn new(config: &Config) -> Self {
        Self {
            checks: checks::builtin_checks(config),
        }
    }

    pub fn with_checks(checks: Vec<Box<dyn Check>>) -> Self {
        Self { checks }
    }

    /// Concatenates issues in check order. The first failing check aborts
    /// the run and no partial issue list is returned.
    pub fn run(&self, client: &Client, skip: &[String]) -> Result<Vec<Issue>, CheckError> {
        let skip: BTreeSet<&str> = skip.iter().map(String::as_str).collect();
        let mut issues = Vec::new();

        for check in &self.checks {
            let name = check.name();
            if skip.contains(name.as_str()) {
                debug!(check = %name, "skipped");
                continue;
            }
            let mut found = check.run(client)?;
            debug!(check = %name, issues = found.len(), "check finished");
            issues.append(&mut found);
        }

        info!(checks = self.checks.len(), issues = issues.len(), "checks complete");
        Ok(issues)
    }

    pub fn check_names(&self) -> Vec<String> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    pub fn check_statuses(&self, skip: &[String]) -> Vec<CheckStatus> {
        self.checks
            .iter()
            .map(|c| {
                let name = c.name();
                let skipped = skip.contains(&name);
                CheckStatus { name, skipped }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use repolint_config::{ChecksConfig, FileConfig, RulesetConfig};
    use repolint_github::memory::MemoryTransport;
    use repolint_types::CheckType;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        name: &'static str,
        outcome: Result<usize, ()>,
        calls: Arc<AtomicUsize>,
    }

    impl Check for Fixed {
        fn check_type(&self) -> CheckType {
            CheckType::Files
        }

        fn name(&self) -> String {
            self.name.to_string()
        }

        fn run(&self, _client: &Client) -> Result<Vec<Issue>, CheckError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Ok(n) => Ok((0..n)
                    .map(|i| Issue::new(CheckType::Files, self.name, format!("{i}")))
                    .collect()),
                Err(()) => Err(CheckError::MissingReference {
                    kind: "file",
                    name: self.name.to_string(),
                }),
            }
        }
    }

    fn fixed(name: &'static str, outcome: Result<usize, ()>, calls: &Arc<AtomicUsize>) -> Box<dyn Check> {
        Box::new(Fixed {
            name,
            outcome,
            calls: calls.clone(),
        })
    }

    fn client() -> Client {
        Client::new(MemoryTransport::new(), "acme", "widgets")
    }

    #[test]
    fn registers_settings_actions_then_rulesets_then_files() {
        let config = Config {
            checks: ChecksConfig {
                rulesets: Some(vec![RulesetConfig {
                    name: "main".into(),
                    reference: "r.json".into(),
                }]),
                files: Some(vec![FileConfig {
                    name: "LICENSE".into(),
                    reference: "acme/templates/LICENSE".into(),
                }]),
                ..Default::default()
            },
        };
        assert_eq!(
            Runner::new(&config).check_names(),
            vec!["settings", "actions", "rulesets(main)", "files(LICENSE)"]
        );
    }

    #[test]
    fn skipped_checks_do_not_run() {
        let calls = Arc::new(AtomicUsize::new(0));
        let runner = Runner::with_checks(vec![
            fixed("a", Ok(1), &calls),
            fixed("b", Err(()), &calls),
            fixed("c", Ok(2), &calls),
        ]);

        let issues = runner.run(&client(), &["b".to_string()]).unwrap();
        assert_eq!(issues.len(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let statuses = runner.check_statuses(&["b".to_string()]);
        assert_eq!(
            statuses.iter().map(|s| s.skipped).collect::<Vec<_>>(),
            vec![false, true, false]
        );
    }

    #[test]
    fn first_error_aborts_without_partial_results() {
        let calls = Arc::new(AtomicUsize::new(0));
        let runner = Runner::with_checks(vec![
            fixed("a", Ok(1), &calls),
            fixed("b", Err(()), &calls),
            fixed("c", Ok(2), &calls),
        ]);

        let err = runner.run(&client(), &[]).unwrap_err();
        assert_eq!(err.to_string(), "file 'b' missing required reference field");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unknown_skip_names_are_ignored() {
        let calls = Arc::new(AtomicUsize::new(0));
        let runner = Runner::with_checks(vec![fixed("a", Ok(1), &calls)]);
        let issues = runner.run(&client(), &["nope".to_string()]).unwrap();
        assert_eq!(issues.len(), 1);
    }
}
