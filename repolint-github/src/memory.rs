//! In-memory transport and sleeper for hermetic tests.
//!
//! Responses are scripted per `(method, path)`. Each request consumes the
//! next scripted response; the last one repeats. Unscripted routes answer 404.

use crate::transport::{Method, Sleeper, Transport, TransportError};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

type Scripted = Result<Option<Value>, TransportError>;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
pub struct MemoryTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self, method: Method, path: &str, response: Scripted) {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
    }

    pub fn respond(&self, method: Method, path: &str, body: Value) {
        self.script(method, path, Ok(Some(body)));
    }

    /// Scripts a 204 No Content answer.
    pub fn respond_empty(&self, method: Method, path: &str) {
        self.script(method, path, Ok(None));
    }

    pub fn fail(&self, method: Method, path: &str, error: TransportError) {
        self.script(method, path, Err(error));
    }

    /// Scripts `GET repos/{owner}/{repo}/contents/{path}` with base64 content.
    pub fn respond_file(&self, owner: &str, repo: &str, path: &str, content: &[u8]) {
        self.respond(
            Method::Get,
            &format!("repos/{owner}/{repo}/contents/{path}"),
            json!({
                "type": "file",
                "encoding": "base64",
                "path": path,
                "content": STANDARD.encode(content),
            }),
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Every non-GET request, in order.
    pub fn writes(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != Method::Get)
            .collect()
    }
}

impl Transport for MemoryTransport {
    fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                method,
                path: path.to_string(),
                body: body.cloned(),
            });

        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(queue) = routes.get_mut(&(method, path.to_string())) else {
            return Err(TransportError::Status {
                status: 404,
                message: "Not Found".to_string(),
            });
        };
        if queue.len() > 1
            && let Some(next) = queue.pop_front()
        {
            return next;
        }
        queue.front().cloned().unwrap_or_else(|| {
            Err(TransportError::Status {
                status: 404,
                message: "Not Found".to_string(),
            })
        })
    }
}

/// Records requested sleeps instead of blocking.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn total(&self) -> Duration {
        self.sleeps().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
    }
}
