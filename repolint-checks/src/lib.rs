//! The check engine: compares live repository state against a merged policy.
//!
//! Each [`Check`] produces structured [`Issue`](repolint_types::Issue)s whose
//! `data` carries what the matching fixer needs. The [`Runner`] executes the
//! registered checks in order and fails fast.

mod checks;
mod error;
mod runner;
pub mod workflow;

pub use checks::{
    ActionsCheck, Check, FilesCheck, RulesetsCheck, SettingsCheck, WORKFLOWS_DIR, builtin_checks,
    rulesets_match, workflow_files,
};
pub use error::CheckError;
pub use runner::Runner;
