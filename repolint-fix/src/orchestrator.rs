use crate::error::FixError;
use crate::fixers::{self, Fixer};
use crate::result::FixResult;
use repolint_config::Config;
use repolint_github::Client;
use repolint_types::{CheckType, Issue};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Dispatches issues to the fixer registered for their check type.
pub struct Orchestrator {
    fixers: BTreeMap<CheckType, Box<dyn Fixer>>,
}

impl Orchestrator {
    pub fn new(config: &Config) -> Self {
        Self {
            fixers: fixers::builtin_fixers(config).into_iter().collect(),
        }
    }

    /// No fixers registered; every fixable issue reports `NoFixer`.
    pub fn empty() -> Self {
        Self {
            fixers: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, check_type: CheckType, fixer: Box<dyn Fixer>) {
        self.fixers.insert(check_type, fixer);
    }

    /// One result per input issue, in input order. A failure never stops
    /// later issues from being attempted.
    pub fn fix(&self, client: &Client, issues: &[Issue]) -> Vec<FixResult> {
        issues
            .iter()
            .map(|issue| self.fix_one(client, issue))
            .collect()
    }

    fn fix_one(&self, client: &Client, issue: &Issue) -> FixResult {
        if !issue.fixable {
            return FixResult::failed(issue.clone(), FixError::NotFixable);
        }
        let Some(fixer) = self.fixers.get(&issue.check_type) else {
            return FixResult::failed(issue.clone(), FixError::NoFixer(issue.check_type));
        };

        debug!(fixer = fixer.name(), check = %issue.name, "attempting fix");
        match fixer.fix(client, issue) {
            Ok(()) => FixResult::fixed(issue.clone()),
            Err(error) => {
                warn!(check = %issue.name, error = %error, "fix failed");
                FixResult::failed(issue.clone(), error)
            }
        }
    }
}
