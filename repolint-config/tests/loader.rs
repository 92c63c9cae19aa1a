//! Discovery tests: local repo scope, remote org scope, explicit file.

use camino::{Utf8Path, Utf8PathBuf};
use pretty_assertions::assert_eq;
use repolint_config::{ConfigError, Loader};
use repolint_github::memory::{MemoryTransport, RecordingSleeper};
use repolint_github::{Client, Method, TransportError};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn utf8(td: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(td.path().to_path_buf()).expect("utf8 path")
}

fn client(transport: &Arc<MemoryTransport>, workdir: &Utf8Path, repo: &str) -> Client {
    Client::new(transport.clone(), "acme", repo)
        .with_workdir(workdir)
        .with_sleeper(RecordingSleeper::default())
}

#[test]
fn merges_repo_over_org() {
    let td = tempfile::tempdir().unwrap();
    fs::write(
        td.path().join(".repolint.yaml"),
        "checks:\n  settings:\n    issues: false\n",
    )
    .unwrap();
    let transport = Arc::new(MemoryTransport::new());
    transport.respond_file(
        "acme",
        "acme",
        ".repolint.yaml",
        b"checks:\n  settings:\n    issues: true\n    wiki: false\n",
    );

    let client = client(&transport, &utf8(&td), "widgets");
    let loaded = Loader::new(&client).load().unwrap();

    let settings = loaded.config.checks.settings.clone().unwrap();
    assert_eq!(settings.issues, Some(false));
    assert_eq!(settings.wiki, Some(false));
    assert_eq!(loaded.repo_source.as_deref(), Some("acme/widgets/.repolint.yaml"));
    assert_eq!(loaded.owner_source.as_deref(), Some("acme/acme/.repolint.yaml"));
    assert!(loaded.repo_config.is_some());
    assert!(loaded.owner_config.is_some());
}

#[test]
fn org_lookup_tries_yml_after_yaml() {
    let td = tempfile::tempdir().unwrap();
    let transport = Arc::new(MemoryTransport::new());
    transport.respond_file(
        "acme",
        "acme",
        ".repolint.yml",
        b"checks:\n  settings:\n    wiki: true\n",
    );

    let client = client(&transport, &utf8(&td), "widgets");
    let loaded = Loader::new(&client).load().unwrap();

    assert_eq!(loaded.owner_source.as_deref(), Some("acme/acme/.repolint.yml"));
    assert_eq!(loaded.repo_config, None);
    assert_eq!(
        transport.request_count(Method::Get, "repos/acme/acme/contents/.repolint.yaml"),
        1
    );
}

#[test]
fn org_repository_skips_org_lookup() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join(".repolint.yml"), "checks: {}\n").unwrap();
    let transport = Arc::new(MemoryTransport::new());

    let client = client(&transport, &utf8(&td), "acme");
    let loaded = Loader::new(&client).load().unwrap();

    assert_eq!(loaded.repo_source.as_deref(), Some("acme/acme/.repolint.yml"));
    assert_eq!(loaded.owner_config, None);
    assert!(transport.requests().is_empty());
}

#[test]
fn finds_config_at_git_root_from_subdirectory() {
    let td = tempfile::tempdir().unwrap();
    fs::create_dir_all(td.path().join(".git")).unwrap();
    fs::create_dir_all(td.path().join("src/nested")).unwrap();
    fs::write(
        td.path().join(".repolint.yaml"),
        "checks:\n  settings:\n    projects: false\n",
    )
    .unwrap();
    let transport = Arc::new(MemoryTransport::new());

    let workdir = utf8(&td).join("src/nested");
    let client = client(&transport, &workdir, "widgets");
    let loaded = Loader::new(&client).load().unwrap();

    assert_eq!(
        loaded.config.checks.settings.unwrap().projects,
        Some(false)
    );
}

#[test]
fn nothing_found_is_a_discovery_error() {
    let td = tempfile::tempdir().unwrap();
    let transport = Arc::new(MemoryTransport::new());

    let client = client(&transport, &utf8(&td), "widgets");
    let err = Loader::new(&client).load().unwrap_err();

    assert!(matches!(err, ConfigError::NotFound { .. }));
}

#[test]
fn org_fetch_failure_other_than_not_found_propagates() {
    let td = tempfile::tempdir().unwrap();
    let transport = Arc::new(MemoryTransport::new());
    transport.fail(
        Method::Get,
        "repos/acme/acme/contents/.repolint.yaml",
        TransportError::Status {
            status: 500,
            message: "boom".into(),
        },
    );

    let client = client(&transport, &utf8(&td), "widgets");
    let err = Loader::new(&client).load().unwrap_err();

    assert!(matches!(err, ConfigError::Remote { .. }));
}

#[test]
fn explicit_file_bypasses_discovery() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join(".repolint.yaml"), "checks:\n  settings:\n    wiki: true\n").unwrap();
    fs::write(td.path().join("policy.yaml"), "checks:\n  settings:\n    wiki: false\n").unwrap();
    let transport = Arc::new(MemoryTransport::new());

    let client = client(&transport, &utf8(&td), "widgets");
    let loaded = Loader::new(&client)
        .load_from_file(Utf8Path::new("policy.yaml"))
        .unwrap();

    assert_eq!(loaded.config.checks.settings.unwrap().wiki, Some(false));
    assert_eq!(loaded.repo_source.as_deref(), Some("policy.yaml"));
    assert_eq!(loaded.owner_config, None);
    assert!(transport.requests().is_empty());
}

#[test]
fn explicit_missing_file_is_a_read_error() {
    let td = tempfile::tempdir().unwrap();
    let transport = Arc::new(MemoryTransport::new());

    let client = client(&transport, &utf8(&td), "widgets");
    let err = Loader::new(&client)
        .load_from_file(Utf8Path::new("missing.yaml"))
        .unwrap_err();

    assert!(matches!(err, ConfigError::Read { .. }));
}
