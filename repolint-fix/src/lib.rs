//! Remediation: turns fixable issues back into compliant repository state.
//!
//! The [`Orchestrator`] routes each issue to the [`Fixer`] registered for its
//! check type and records a [`FixResult`] per issue. Each fix is applied and
//! fails independently; there is no rollback.

mod error;
mod fixers;
mod orchestrator;
mod result;

pub use error::FixError;
pub use fixers::{ActionsFixer, FilesFixer, Fixer, RulesetsFixer, SettingsFixer, builtin_fixers};
pub use orchestrator::Orchestrator;
pub use result::{FixResult, FixState, unfixed_count};
