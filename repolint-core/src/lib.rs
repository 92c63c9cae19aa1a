//! Embeddable core library for repolint.
//!
//! Clap-free and transport-agnostic: the caller builds a
//! [`Client`](repolint_github::Client) over any
//! [`Transport`](repolint_github::Transport) (an HTTP adapter in the binary,
//! the in-memory fake in tests) and passes it in with [`Settings`].
//!
//! # Entry points
//!
//! - [`run_lint`](pipeline::run_lint): load policy, run checks, optionally fix
//! - [`run_config`](pipeline::run_config): display the merged policy and
//!   validate its references

pub mod pipeline;
pub mod settings;

pub use pipeline::{ConfigOutcome, LintOutcome, ToolError, load_config, run_config, run_lint};
pub use settings::Settings;
