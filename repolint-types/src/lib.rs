//! Shared DTOs for the repolint workspace.
//!
//! # Design constraints
//! - [`issue`] types flow from checks into fixers and renderers.
//! - [`github`] types mirror the REST payloads the client reads and writes.
//! - Prefer adding optional fields over changing semantics.

pub mod github;
pub mod issue;

pub use issue::{CheckStatus, CheckType, Issue, data_keys, fixable_count};
