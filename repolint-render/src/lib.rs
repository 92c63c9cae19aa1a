//! Rendering helpers (plain text) for terminal output.

mod config;

pub use config::{ConfigDisplay, render_config};

use repolint_fix::FixResult;
use repolint_types::{CheckStatus, Issue, fixable_count};

pub fn render_issues(issues: &[Issue]) -> String {
    let mut out = String::new();
    out.push_str("Repository validation failed:\n");
    for issue in issues {
        let fixable = if issue.fixable { " (fixable)" } else { "" };
        out.push_str(&format!("  [{}] {}{}\n", issue.name, issue.message, fixable));
    }
    out.push('\n');

    let fixable = fixable_count(issues);
    if fixable > 0 {
        out.push_str(&format!(
            "Run with --fix to automatically fix {} issue(s)\n",
            fixable
        ));
    }
    out
}

/// `statuses` is only listed in verbose mode.
pub fn render_success(statuses: Option<&[CheckStatus]>) -> String {
    let mut out = String::from("All checks passed\n");
    for status in statuses.unwrap_or_default() {
        let state = if status.skipped { "skipped" } else { "validated" };
        out.push_str(&format!("  {}: {}\n", status.name, state));
    }
    out
}

pub fn render_fix_report(results: &[FixResult]) -> String {
    let mut out = String::new();
    let mut fixed = 0;
    for r in results {
        if r.fixed {
            fixed += 1;
            out.push_str(&format!("  Fixed: [{}] {}\n", r.issue.name, r.issue.message));
            continue;
        }
        let reason = r
            .error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "requires manual intervention".to_string());
        out.push_str(&format!(
            "  Could not fix: [{}] {} ({})\n",
            r.issue.name, r.issue.message, reason
        ));
    }

    out.push('\n');
    out.push_str(&format!("Fixed {} of {} issues\n", fixed, results.len()));
    if fixed == results.len() {
        out.push_str("All checks passed\n");
    }
    out
}
