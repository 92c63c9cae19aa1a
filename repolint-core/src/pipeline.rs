//! Lint and config pipelines, extracted from the CLI.
//!
//! Both entry points return the rendered report alongside the verdict, so a
//! caller can print the report before surfacing the failure.

use crate::settings::Settings;
use anyhow::Context;
use repolint_checks::Runner;
use repolint_config::{LoadedConfig, Loader};
use repolint_fix::{FixResult, Orchestrator, unfixed_count};
use repolint_github::Client;
use repolint_render::{render_config, render_fix_report, render_issues, render_success};
use repolint_types::Issue;
use tracing::{debug, info};

/// Error type for pipeline verdicts. Every variant exits with code 1.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("found {0} issue(s)")]
    IssuesFound(usize),
    #[error("{0} issue(s) require manual intervention")]
    ManualIntervention(usize),
    #[error("found {0} invalid reference(s)")]
    InvalidReferences(usize),
    /// Carries the whole context chain in its message, without a source.
    #[error("{0:#}")]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ToolError {
    fn from(error: anyhow::Error) -> Self {
        ToolError::Internal(error)
    }
}

/// Outcome of `run_lint`.
#[derive(Debug)]
pub struct LintOutcome {
    pub issues: Vec<Issue>,
    /// Present only in fix mode with at least one issue.
    pub fixes: Option<Vec<FixResult>>,
    pub report: String,
}

impl LintOutcome {
    pub fn verdict(&self) -> Result<(), ToolError> {
        match &self.fixes {
            Some(fixes) => match unfixed_count(fixes) {
                0 => Ok(()),
                n => Err(ToolError::ManualIntervention(n)),
            },
            None if self.issues.is_empty() => Ok(()),
            None => Err(ToolError::IssuesFound(self.issues.len())),
        }
    }
}

/// Outcome of `run_config`.
#[derive(Debug)]
pub struct ConfigOutcome {
    pub loaded: LoadedConfig,
    pub report: String,
    pub invalid_references: Vec<String>,
}

impl ConfigOutcome {
    pub fn verdict(&self) -> Result<(), ToolError> {
        if self.invalid_references.is_empty() {
            Ok(())
        } else {
            Err(ToolError::InvalidReferences(self.invalid_references.len()))
        }
    }
}

/// An explicit `config_path` bypasses discovery; otherwise both scopes are
/// discovered and merged.
pub fn load_config(client: &Client, settings: &Settings) -> anyhow::Result<LoadedConfig> {
    let loader = Loader::new(client);
    let loaded = match &settings.config_path {
        Some(path) => loader.load_from_file(path),
        None => loader.load(),
    };
    loaded.context("configuration error")
}

/// Run the lint pipeline: permission probe, policy load, checks, and in fix
/// mode the fixers.
///
/// The first failing check aborts the run. Fix failures never do; they are
/// reported per issue and reflected in the verdict.
pub fn run_lint(client: &Client, settings: &Settings) -> Result<LintOutcome, ToolError> {
    client
        .check_permissions()
        .context("permission check failed")?;

    let loaded = load_config(client, settings)?;
    let runner = Runner::new(&loaded.config);
    debug!(checks = ?runner.check_names(), skip = ?settings.skip, "running checks");

    let issues = runner
        .run(client, &settings.skip)
        .context("check failed")?;
    info!(issues = issues.len(), "checks complete");

    if issues.is_empty() {
        let statuses = settings
            .verbose
            .then(|| runner.check_statuses(&settings.skip));
        return Ok(LintOutcome {
            issues,
            fixes: None,
            report: render_success(statuses.as_deref()),
        });
    }

    if !settings.fix {
        let report = render_issues(&issues);
        return Ok(LintOutcome {
            issues,
            fixes: None,
            report,
        });
    }

    let fixes = Orchestrator::new(&loaded.config).fix(client, &issues);
    info!(
        fixed = fixes.len() - unfixed_count(&fixes),
        unfixed = unfixed_count(&fixes),
        "fixes applied"
    );
    let report = render_fix_report(&fixes);
    Ok(LintOutcome {
        issues,
        fixes: Some(fixes),
        report,
    })
}

/// Render the merged policy with provenance, resolving every ruleset and
/// file reference.
pub fn run_config(client: &Client, settings: &Settings) -> Result<ConfigOutcome, ToolError> {
    let loaded = load_config(client, settings)?;

    let validate: &dyn Fn(&str) -> bool = &|reference| {
        let resolved = client.resolve_reference(reference);
        if let Err(error) = &resolved {
            debug!(reference, error = %error, "reference does not resolve");
        }
        resolved.is_ok()
    };
    let display = render_config(&loaded, settings.use_color, Some(validate));

    let mut report = display.text;
    if !display.invalid_references.is_empty() {
        report.push('\n');
    }
    Ok(ConfigOutcome {
        loaded,
        report,
        invalid_references: display.invalid_references,
    })
}
