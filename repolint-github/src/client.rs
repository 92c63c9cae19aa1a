use crate::error::ApiError;
use crate::transport::{Method, Sleeper, ThreadSleeper, Transport};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use camino::Utf8PathBuf;
use repolint_types::github::{
    AutomatedSecurityFixes, FileContent, RepoUpdateRequest, Repository, Ruleset, RulesetRequest,
    WorkflowPermissions,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

/// Rate-limit retry schedule.
///
/// Waits start at `initial` and double per attempt. The sum of all waits
/// never exceeds `ceiling`; the last wait is clipped to what remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub initial: Duration,
    pub ceiling: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            ceiling: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
enum Cached {
    Repository(Repository),
    Rulesets(Vec<Ruleset>),
    Ruleset(Ruleset),
    Content(Vec<u8>),
}

/// GitHub API client bound to one repository.
///
/// Reads are memoized for the lifetime of the client; writes go straight
/// through and never touch the cache. Local file access resolves paths
/// against the client's working directory.
pub struct Client {
    transport: Box<dyn Transport>,
    sleeper: Box<dyn Sleeper>,
    pub(crate) owner: String,
    pub(crate) repo: String,
    pub(crate) workdir: Utf8PathBuf,
    backoff: BackoffPolicy,
    cache: RwLock<HashMap<String, Cached>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("workdir", &self.workdir)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(
        transport: impl Transport + 'static,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            transport: Box::new(transport),
            sleeper: Box::new(ThreadSleeper),
            owner: owner.into(),
            repo: repo.into(),
            workdir: Utf8PathBuf::from("."),
            backoff: BackoffPolicy::default(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_workdir(mut self, workdir: impl Into<Utf8PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn workdir(&self) -> &Utf8PathBuf {
        &self.workdir
    }

    /// Sends one request, retrying rate-limit failures with backoff.
    ///
    /// Any other failure is returned immediately.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, ApiError> {
        let mut backoff = self.backoff.initial;
        let mut waited = Duration::ZERO;

        loop {
            debug!(%method, path, "github request");
            let err = match self.transport.send(method, path, body) {
                Ok(response) => return Ok(response),
                Err(err) if err.is_rate_limit() => err,
                Err(err) => return Err(err.into()),
            };

            let wait = backoff.min(self.backoff.ceiling.saturating_sub(waited));
            if wait.is_zero() {
                return Err(ApiError::RateLimitExceeded { waited, error: err });
            }

            warn!(%method, path, ?wait, ?waited, "rate limited; backing off");
            self.sleeper.sleep(wait);
            waited += wait;
            backoff = backoff.saturating_mul(2);
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, what: &'static str) -> Result<T, ApiError> {
        let value = self
            .request(Method::Get, path, None)?
            .ok_or_else(|| ApiError::EmptyBody(path.to_string()))?;
        serde_json::from_value(value).map_err(|error| ApiError::Decode { what, error })
    }

    fn send_json<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Option<Value>, ApiError> {
        let body = serde_json::to_value(body).map_err(ApiError::Encode)?;
        self.request(method, path, Some(&body))
    }

    fn repo_path(&self, suffix: &str) -> String {
        format!("repos/{}/{}{}", self.owner, self.repo, suffix)
    }

    fn cached(&self, key: &str) -> Option<Cached> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        cache.get(key).cloned()
    }

    fn store(&self, key: String, value: Cached) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.insert(key, value);
    }

    /// Repository metadata. An archived repository is an error and is not cached.
    pub fn get_repository(&self) -> Result<Repository, ApiError> {
        let key = format!("repo:{}/{}", self.owner, self.repo);
        if let Some(Cached::Repository(repo)) = self.cached(&key) {
            return Ok(repo);
        }

        let repo: Repository = self.get_json(&self.repo_path(""), "repository")?;
        if repo.archived {
            return Err(ApiError::Archived {
                owner: self.owner.clone(),
                repo: self.repo.clone(),
            });
        }
        self.store(key, Cached::Repository(repo.clone()));
        Ok(repo)
    }

    pub fn get_workflow_permissions(&self) -> Result<WorkflowPermissions, ApiError> {
        self.get_json(
            &self.repo_path("/actions/permissions/workflow"),
            "workflow permissions",
        )
    }

    /// Ruleset summaries. The list endpoint omits rules; use [`Client::get_ruleset`].
    pub fn get_rulesets(&self) -> Result<Vec<Ruleset>, ApiError> {
        let key = format!("rulesets:{}/{}", self.owner, self.repo);
        if let Some(Cached::Rulesets(rulesets)) = self.cached(&key) {
            return Ok(rulesets);
        }

        let rulesets: Vec<Ruleset> = self.get_json(&self.repo_path("/rulesets"), "rulesets")?;
        self.store(key, Cached::Rulesets(rulesets.clone()));
        Ok(rulesets)
    }

    pub fn get_ruleset(&self, id: u64) -> Result<Ruleset, ApiError> {
        let key = format!("ruleset:{}/{}/{}", self.owner, self.repo, id);
        if let Some(Cached::Ruleset(ruleset)) = self.cached(&key) {
            return Ok(ruleset);
        }

        let ruleset: Ruleset = self.get_json(&self.repo_path(&format!("/rulesets/{id}")), "ruleset")?;
        self.store(key, Cached::Ruleset(ruleset.clone()));
        Ok(ruleset)
    }

    /// Decoded content of a file in this repository's default branch.
    pub fn get_file_content(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let key = format!("file:{}/{}/{}", self.owner, self.repo, path);
        if let Some(Cached::Content(content)) = self.cached(&key) {
            return Ok(content);
        }

        let file: FileContent = self.get_json(&self.repo_path(&format!("/contents/{path}")), "file content")?;
        let content = decode_content(&file)?;
        self.store(key, Cached::Content(content.clone()));
        Ok(content)
    }

    /// Decoded content of a file in any repository.
    pub fn get_remote_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Vec<u8>, ApiError> {
        let key = format!("remote-file:{owner}/{repo}/{path}");
        if let Some(Cached::Content(content)) = self.cached(&key) {
            return Ok(content);
        }

        let file: FileContent =
            self.get_json(&format!("repos/{owner}/{repo}/contents/{path}"), "file content")?;
        let content = decode_content(&file)?;
        self.store(key, Cached::Content(content.clone()));
        Ok(content)
    }

    /// 204 means enabled, 404 means disabled.
    pub fn get_vulnerability_alerts_enabled(&self) -> Result<bool, ApiError> {
        match self.request(Method::Get, &self.repo_path("/vulnerability-alerts"), None) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub fn enable_vulnerability_alerts(&self) -> Result<(), ApiError> {
        self.request(Method::Put, &self.repo_path("/vulnerability-alerts"), None)?;
        Ok(())
    }

    pub fn disable_vulnerability_alerts(&self) -> Result<(), ApiError> {
        self.request(Method::Delete, &self.repo_path("/vulnerability-alerts"), None)?;
        Ok(())
    }

    pub fn get_automated_security_fixes(&self) -> Result<AutomatedSecurityFixes, ApiError> {
        self.get_json(
            &self.repo_path("/automated-security-fixes"),
            "automated security fixes",
        )
    }

    pub fn enable_automated_security_fixes(&self) -> Result<(), ApiError> {
        self.request(Method::Put, &self.repo_path("/automated-security-fixes"), None)?;
        Ok(())
    }

    pub fn disable_automated_security_fixes(&self) -> Result<(), ApiError> {
        self.request(Method::Delete, &self.repo_path("/automated-security-fixes"), None)?;
        Ok(())
    }

    pub fn update_repository(&self, update: &RepoUpdateRequest) -> Result<(), ApiError> {
        self.send_json(Method::Patch, &self.repo_path(""), update)?;
        Ok(())
    }

    pub fn update_workflow_permissions(&self, can_approve_pull_requests: bool) -> Result<(), ApiError> {
        let body = json!({ "can_approve_pull_request_reviews": can_approve_pull_requests });
        self.request(
            Method::Put,
            &self.repo_path("/actions/permissions/workflow"),
            Some(&body),
        )?;
        Ok(())
    }

    pub fn create_ruleset(&self, request: &RulesetRequest) -> Result<(), ApiError> {
        self.send_json(Method::Post, &self.repo_path("/rulesets"), request)?;
        Ok(())
    }

    pub fn update_ruleset(&self, id: u64, request: &RulesetRequest) -> Result<(), ApiError> {
        self.send_json(Method::Put, &self.repo_path(&format!("/rulesets/{id}")), request)?;
        Ok(())
    }

    /// Probes access by fetching repository metadata.
    pub fn check_permissions(&self) -> Result<(), ApiError> {
        self.get_repository()
            .map(|_| ())
            .map_err(|err| ApiError::InsufficientPermissions(Box::new(err)))
    }
}

fn decode_content(file: &FileContent) -> Result<Vec<u8>, ApiError> {
    if file.encoding != "base64" {
        return Err(ApiError::UnexpectedEncoding(file.encoding.clone()));
    }
    let cleaned: String = file
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD.decode(cleaned).map_err(ApiError::Base64)
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use crate::memory::{MemoryTransport, RecordingSleeper};
    use crate::transport::TransportError;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn rate_limited() -> TransportError {
        TransportError::Status {
            status: 403,
            message: "API rate limit exceeded".into(),
        }
    }

    fn client(transport: &Arc<MemoryTransport>, sleeper: &Arc<RecordingSleeper>) -> Client {
        Client::new(transport.clone(), "acme", "widgets").with_sleeper(sleeper.clone())
    }

    #[test]
    fn persistent_rate_limit_stops_at_ceiling() {
        let transport = Arc::new(MemoryTransport::new());
        transport.fail(Method::Get, "repos/acme/widgets", rate_limited());
        let sleeper = Arc::new(RecordingSleeper::default());

        let err = client(&transport, &sleeper).get_repository().unwrap_err();

        assert!(err.is_rate_limited());
        assert!(err.to_string().starts_with("rate limit exceeded, waited 60s"));
        let secs: Vec<u64> = sleeper.sleeps().iter().map(Duration::as_secs).collect();
        assert_eq!(secs, vec![1, 2, 4, 8, 16, 29]);
        assert_eq!(sleeper.total(), Duration::from_secs(60));
    }

    #[test]
    fn rate_limit_then_success_retries() {
        let transport = Arc::new(MemoryTransport::new());
        transport.fail(Method::Get, "repos/acme/widgets", rate_limited());
        transport.respond(
            Method::Get,
            "repos/acme/widgets",
            json!({"name": "widgets", "default_branch": "main"}),
        );
        let sleeper = Arc::new(RecordingSleeper::default());

        let repo = client(&transport, &sleeper).get_repository().unwrap();

        assert_eq!(repo.default_branch, "main");
        assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(1)]);
        assert_eq!(transport.request_count(Method::Get, "repos/acme/widgets"), 2);
    }

    #[test]
    fn repeated_too_many_requests_backs_off_then_succeeds() {
        let transport = Arc::new(MemoryTransport::new());
        for _ in 0..2 {
            transport.fail(
                Method::Get,
                "repos/acme/widgets",
                TransportError::Status {
                    status: 429,
                    message: "Too Many Requests".into(),
                },
            );
        }
        transport.respond(
            Method::Get,
            "repos/acme/widgets",
            json!({"name": "widgets", "default_branch": "main"}),
        );
        let sleeper = Arc::new(RecordingSleeper::default());

        let repo = client(&transport, &sleeper).get_repository().unwrap();

        assert_eq!(repo.default_branch, "main");
        assert_eq!(
            sleeper.sleeps(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
        assert_eq!(transport.request_count(Method::Get, "repos/acme/widgets"), 3);
    }

    #[test]
    fn non_rate_limit_error_is_not_retried() {
        let transport = Arc::new(MemoryTransport::new());
        transport.fail(
            Method::Get,
            "repos/acme/widgets",
            TransportError::Status {
                status: 500,
                message: "boom".into(),
            },
        );
        let sleeper = Arc::new(RecordingSleeper::default());

        let err = client(&transport, &sleeper).get_repository().unwrap_err();

        assert_eq!(err.to_string(), "HTTP 500: boom");
        assert!(sleeper.sleeps().is_empty());
        assert_eq!(transport.request_count(Method::Get, "repos/acme/widgets"), 1);
    }

    #[test]
    fn repository_is_fetched_once() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond(Method::Get, "repos/acme/widgets", json!({"has_wiki": true}));
        let sleeper = Arc::new(RecordingSleeper::default());
        let client = client(&transport, &sleeper);

        assert!(client.get_repository().unwrap().has_wiki);
        assert!(client.get_repository().unwrap().has_wiki);
        assert_eq!(transport.request_count(Method::Get, "repos/acme/widgets"), 1);
    }

    #[test]
    fn archived_repository_is_rejected_and_not_cached() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond(Method::Get, "repos/acme/widgets", json!({"archived": true}));
        let sleeper = Arc::new(RecordingSleeper::default());
        let client = client(&transport, &sleeper);

        assert!(matches!(client.get_repository(), Err(ApiError::Archived { .. })));
        assert!(matches!(client.get_repository(), Err(ApiError::Archived { .. })));
        assert_eq!(transport.request_count(Method::Get, "repos/acme/widgets"), 2);
    }

    #[test]
    fn vulnerability_alert_status_maps_not_found_to_disabled() {
        let transport = Arc::new(MemoryTransport::new());
        let sleeper = Arc::new(RecordingSleeper::default());
        let client = client(&transport, &sleeper);

        assert!(!client.get_vulnerability_alerts_enabled().unwrap());

        transport.respond_empty(Method::Get, "repos/acme/widgets/vulnerability-alerts");
        assert!(client.get_vulnerability_alerts_enabled().unwrap());
    }

    #[test]
    fn file_content_decodes_wrapped_base64() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond(
            Method::Get,
            "repos/acme/acme/contents/.repolint/ruleset.json",
            json!({"encoding": "base64", "content": "eyJuYW1lIjoi\nbWFpbiJ9\n"}),
        );
        let sleeper = Arc::new(RecordingSleeper::default());
        let client = client(&transport, &sleeper);

        let content = client
            .get_remote_file_content("acme", "acme", ".repolint/ruleset.json")
            .unwrap();
        assert_eq!(content, br#"{"name":"main"}"#.to_vec());

        client
            .get_remote_file_content("acme", "acme", ".repolint/ruleset.json")
            .unwrap();
        assert_eq!(
            transport.request_count(Method::Get, "repos/acme/acme/contents/.repolint/ruleset.json"),
            1
        );
    }

    #[test]
    fn non_base64_encoding_is_rejected() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond(
            Method::Get,
            "repos/acme/widgets/contents/README.md",
            json!({"encoding": "none", "content": ""}),
        );
        let sleeper = Arc::new(RecordingSleeper::default());

        let err = client(&transport, &sleeper)
            .get_file_content("README.md")
            .unwrap_err();
        assert_eq!(err.to_string(), "unexpected encoding: none");
    }

    #[test]
    fn update_sends_only_set_fields() {
        let transport = Arc::new(MemoryTransport::new());
        transport.respond(Method::Patch, "repos/acme/widgets", json!({}));
        let sleeper = Arc::new(RecordingSleeper::default());

        client(&transport, &sleeper)
            .update_repository(&RepoUpdateRequest {
                has_issues: Some(true),
                ..Default::default()
            })
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].body, Some(json!({"has_issues": true})));
    }

    #[test]
    fn permission_probe_wraps_failure() {
        let transport = Arc::new(MemoryTransport::new());
        let sleeper = Arc::new(RecordingSleeper::default());

        let err = client(&transport, &sleeper).check_permissions().unwrap_err();
        assert!(matches!(err, ApiError::InsufficientPermissions(_)));
        assert!(err.is_not_found());
    }
}
