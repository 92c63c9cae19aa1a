//! Working-directory file access and template hydration.

use crate::client::Client;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::io;
use tracing::debug;

impl Client {
    /// Resolves `path` against the working directory; absolute paths pass through.
    pub fn local_path(&self, path: impl AsRef<Utf8Path>) -> Utf8PathBuf {
        self.workdir.join(path.as_ref())
    }

    pub fn file_exists(&self, path: impl AsRef<Utf8Path>) -> bool {
        self.local_path(path).exists()
    }

    pub fn read_local_file(&self, path: impl AsRef<Utf8Path>) -> io::Result<Vec<u8>> {
        fs::read(self.local_path(path))
    }

    /// Writes `content`, creating parent directories as needed.
    pub fn write_file(&self, path: impl AsRef<Utf8Path>, content: &[u8]) -> io::Result<()> {
        let full = self.local_path(path);
        if let Some(parent) = full.parent()
            && !parent.as_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        debug!(path = %full, bytes = content.len(), "writing file");
        fs::write(&full, content)
    }

    /// Replaces `{{ .owner }}` and `{{ .repo }}` placeholders.
    pub fn hydrate_template(&self, content: &[u8]) -> Vec<u8> {
        hydrate(content, &[("owner", self.owner.as_str()), ("repo", self.repo.as_str())])
    }

    /// Workflow variant: also replaces `{{ .default_branch }}`.
    pub fn hydrate_workflow_template(&self, content: &[u8], default_branch: &str) -> Vec<u8> {
        hydrate(
            content,
            &[
                ("owner", self.owner.as_str()),
                ("repo", self.repo.as_str()),
                ("default_branch", default_branch),
            ],
        )
    }
}

/// Literal placeholder substitution.
///
/// Only the exact forms `{{ .name }}` and `{{.name}}` are replaced, so
/// GitHub Actions expressions such as `${{ github.ref }}` pass through.
pub fn hydrate(content: &[u8], vars: &[(&str, &str)]) -> Vec<u8> {
    let mut out = content.to_vec();
    for (name, value) in vars {
        for placeholder in [format!("{{{{ .{name} }}}}"), format!("{{{{.{name}}}}}")] {
            out = replace_all(&out, placeholder.as_bytes(), value.as_bytes());
        }
    }
    out
}

fn replace_all(haystack: &[u8], needle: &[u8], with: &[u8]) -> Vec<u8> {
    if needle.is_empty() {
        return haystack.to_vec();
    }
    let mut out = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some(pos) = rest.windows(needle.len()).position(|w| w == needle) {
        out.extend_from_slice(&rest[..pos]);
        out.extend_from_slice(with);
        rest = &rest[pos + needle.len()..];
    }
    out.extend_from_slice(rest);
    out
}
