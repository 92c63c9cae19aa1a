use crate::error::FixError;
use repolint_types::Issue;

/// Outcome of one remediation attempt.
#[derive(Debug)]
pub struct FixResult {
    pub issue: Issue,
    pub fixed: bool,
    pub error: Option<FixError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixState {
    Fixed,
    /// The issue needs a human; no attempt was made.
    NotFixable,
    NoFixer,
    Failed,
}

impl FixResult {
    pub fn fixed(issue: Issue) -> Self {
        Self {
            issue,
            fixed: true,
            error: None,
        }
    }

    pub fn failed(issue: Issue, error: FixError) -> Self {
        Self {
            issue,
            fixed: false,
            error: Some(error),
        }
    }

    pub fn state(&self) -> FixState {
        match (&self.error, self.fixed) {
            (_, true) => FixState::Fixed,
            (Some(FixError::NotFixable), _) => FixState::NotFixable,
            (Some(FixError::NoFixer(_)), _) => FixState::NoFixer,
            _ => FixState::Failed,
        }
    }
}

/// Number of results that were not remediated.
pub fn unfixed_count(results: &[FixResult]) -> usize {
    results.iter().filter(|r| !r.fixed).count()
}
