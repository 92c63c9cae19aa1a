//! Target repository discovery: `--repo owner/name`, else the `origin` remote.

use anyhow::bail;
use camino::Utf8Path;
use std::process::Command;
use tracing::debug;

pub fn resolve(explicit: Option<&str>, workdir: &Utf8Path) -> anyhow::Result<(String, String)> {
    if let Some(slug) = explicit {
        let Some(parsed) = parse_slug(slug) else {
            bail!("invalid repository '{slug}' (expected owner/name)");
        };
        return Ok(parsed);
    }

    match origin_url(workdir).as_deref().and_then(parse_remote_url) {
        Some(parsed) => Ok(parsed),
        None => bail!(
            "could not determine repository: pass --repo owner/name or run inside a git checkout with an origin remote"
        ),
    }
}

fn parse_slug(slug: &str) -> Option<(String, String)> {
    let (owner, name) = slug.trim().split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((owner.to_string(), name.to_string()))
}

/// `None` outside a git checkout or without an origin remote.
fn origin_url(workdir: &Utf8Path) -> Option<String> {
    let output = Command::new("git")
        .args(["config", "--get", "remote.origin.url"])
        .current_dir(workdir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let url = String::from_utf8(output.stdout).ok()?.trim().to_string();
    debug!(url = %url, "origin remote");
    Some(url).filter(|u| !u.is_empty())
}

/// Owner and name from an SSH (`git@host:owner/name.git`) or HTTPS remote URL.
pub fn parse_remote_url(url: &str) -> Option<(String, String)> {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let (rest, name) = trimmed.rsplit_once('/')?;
    let owner = rest.rsplit(['/', ':']).next()?;
    if owner.is_empty() || name.is_empty() || !(rest.contains("://") || rest.contains(':')) {
        return None;
    }
    Some((owner.to_string(), name.to_string()))
}
