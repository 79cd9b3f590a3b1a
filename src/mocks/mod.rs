//! Mock implementations for testing.
//!
//! Provides a scripted transport and a fixed-key auth provider so services
//! can be exercised without a network.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::auth::{AuthProvider, AUTHORIZATION_HEADER};
use crate::errors::SendGridError;
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Mock HTTP transport for testing.
///
/// Responses are served in the order they were queued; once the queue is
/// empty the default response (or a 500) is returned.
pub struct MockTransport {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
    default_response: Mutex<Option<MockResponse>>,
}

/// A recorded request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request path.
    pub path: String,
    /// Request body.
    pub body: Option<Vec<u8>>,
    /// Request headers.
    pub headers: HashMap<String, String>,
}

impl RecordedRequest {
    /// Parses the body as JSON.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_ref()
            .and_then(|body| serde_json::from_slice(body).ok())
    }
}

/// A mock response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl MockResponse {
    /// Creates a response without a body.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a plain text response.
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    /// Creates a JSON response.
    pub fn json<T: serde::Serialize>(status: u16, value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        Self::empty(status)
            .with_header("content-type", "application/json")
            .with_body(body)
    }

    /// Creates a SendGrid error-list response.
    pub fn provider_errors(status: u16, messages: &[&str]) -> Self {
        Self::json(status, &fixtures::errors(messages))
    }

    /// Replaces the body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Adds a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            default_response: Mutex::new(None),
        }
    }

    /// Queues a response.
    pub fn queue(&self, response: MockResponse) {
        locked(&self.responses).push_back(response);
    }

    /// Sets the default response.
    pub fn set_default(&self, response: MockResponse) {
        *locked(&self.default_response) = Some(response);
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        locked(&self.requests).clone()
    }

    /// Gets the last recorded request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        locked(&self.requests).last().cloned()
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        locked(&self.requests).len()
    }

    fn next_response(&self) -> MockResponse {
        locked(&self.responses).pop_front().unwrap_or_else(|| {
            locked(&self.default_response)
                .clone()
                .unwrap_or_else(|| MockResponse::text(500, "No mock response configured"))
        })
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        locked(&self.requests).push(RecordedRequest {
            method: request.method,
            path: request.path,
            body: request.body,
            headers: request.headers,
        });

        let response = self.next_response();
        Ok(HttpResponse {
            status: response.status,
            headers: response.headers,
            body: response.body,
        })
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("request_count", &self.request_count())
            .finish()
    }
}

/// Mock auth provider for testing.
pub struct MockAuth {
    api_key: String,
}

impl MockAuth {
    /// Creates a new mock auth provider.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

impl Default for MockAuth {
    fn default() -> Self {
        Self::new("test-api-key")
    }
}

impl AuthProvider for MockAuth {
    fn apply_auth(&self, headers: &mut HashMap<String, String>) {
        headers.insert(
            AUTHORIZATION_HEADER.to_string(),
            format!("Bearer {}", self.api_key),
        );
    }

    fn validate(&self) -> Result<(), SendGridError> {
        Ok(())
    }
}

impl std::fmt::Debug for MockAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockAuth").finish()
    }
}

/// Test fixtures shaped like SendGrid responses.
pub mod fixtures {
    use serde_json::{json, Value};

    /// A sender record.
    pub fn sender(id: u64, nickname: &str, verified: bool) -> Value {
        json!({
            "id": id,
            "nickname": nickname,
            "from": {"email": "john.doe@mycompany.com", "name": "John Doe"},
            "reply_to": {"email": "john.doe@mycompany.com", "name": "John Doe"},
            "address": "",
            "address_2": "",
            "city": "Edmonton",
            "state": "",
            "zip": "",
            "country": "Canada",
            "verified": {"status": verified, "reason": null},
            "updated_at": 1449872165,
            "created_at": 1449872165,
            "locked": false
        })
    }

    /// An error-list body.
    pub fn errors(messages: &[&str]) -> Value {
        json!({
            "errors": messages
                .iter()
                .map(|message| json!({"field": null, "message": message}))
                .collect::<Vec<_>>()
        })
    }
}
