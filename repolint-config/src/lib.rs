//! Policy configuration for repolint.
//!
//! - [`model`]: the policy document tree (tri-state leaves).
//! - [`merge`]: repo-scope over org-scope precedence.
//! - [`loader`]: discovery of both scopes and provenance tracking.

pub mod loader;
pub mod merge;
pub mod model;

pub use loader::{CONFIG_FILE_NAMES, ConfigError, LoadedConfig, Loader, Source, parse_config};
pub use merge::merge_configs;
pub use model::{
    ActionsConfig, ChecksConfig, Config, DependabotSettingsConfig, FileConfig, MergeConfig,
    RulesetConfig, SettingsConfig, WorkflowConfig,
};
