//! GitHub access for repolint.
//!
//! - [`Client`] wraps a [`Transport`] with a per-client read cache and
//!   rate-limit backoff, and exposes typed repository operations.
//! - [`reference`] resolves policy references (local path or
//!   `owner/repo/path`) and hydrates `{{ .owner }}`-style placeholders.
//! - [`memory`] (feature `memory`) provides scripted fakes for tests.

mod client;
mod error;
mod files;
pub mod reference;
pub mod transport;

#[cfg(feature = "memory")]
pub mod memory;

pub use client::{BackoffPolicy, Client};
pub use error::ApiError;
pub use files::hydrate;
pub use reference::{ReferenceError, RemoteRef};
pub use transport::{Method, Sleeper, ThreadSleeper, Transport, TransportError};
