//! HTTP transport: a single GET per call, with outcomes classified into
//! network, status and decode failures.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::FplError;

/// GET request envelope handed to an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Raw HTTP response returned by an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failure to obtain any response at all (refused connection, timeout, DNS).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Object-safe HTTP GET executor.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Production HTTP client backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new(user_agent: &str) -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent(user_agent)
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = self.client.get(&request.url).timeout(request.timeout);
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::new(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    HttpError::new(format!("connection failed: {e}"))
                } else {
                    HttpError::new(format!("request failed: {e}"))
                }
            })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| HttpError::new(format!("failed to read response body: {e}")))?;

            Ok(HttpResponse { status, body })
        })
    }
}

/// Joins the base URL, a resource path and URL-encoded query parameters.
pub(crate) fn build_url(base_url: &str, path: &str, params: &[(&str, String)]) -> String {
    let mut url = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    if !params.is_empty() {
        let query = params
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(name),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        url.push('?');
        url.push_str(&query);
    }
    url
}

/// Stateless GET-and-parse against the configured upstream.
///
/// | Outcome | Error |
/// |---------|-------|
/// | no response | [`FplError::Network`] |
/// | non-2xx status | [`FplError::HttpStatus`] |
/// | body is not JSON | [`FplError::Decode`] |
#[derive(Clone)]
pub struct Transport {
    http: Arc<dyn HttpClient>,
    base_url: Arc<str>,
    timeout: Duration,
}

impl Transport {
    pub fn new(http: Arc<dyn HttpClient>, base_url: &str, timeout: Duration) -> Self {
        Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch(&self, path: &str, params: &[(&str, String)]) -> Result<Value, FplError> {
        if path.trim_matches('/').trim().is_empty() {
            return Err(FplError::invalid_input("resource path must not be empty"));
        }

        let url = build_url(&self.base_url, path, params);
        debug!(url = %url, "requesting upstream resource");

        let request = HttpRequest::get(&url)
            .with_header("accept", "application/json")
            .with_timeout(self.timeout);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| FplError::network(e.message()))?;

        if !response.is_success() {
            return Err(FplError::HttpStatus {
                status: response.status,
                url,
            });
        }

        serde_json::from_str(&response.body)
            .map_err(|e| FplError::decode(format!("{url}: {e}")))
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Canned reply served by [`StubHttpClient`].
#[derive(Debug, Clone)]
pub enum StubReply {
    Response(HttpResponse),
    Failure(HttpError),
}

impl StubReply {
    pub fn json(body: impl Into<String>) -> Self {
        Self::Response(HttpResponse::ok_json(body))
    }

    pub fn status(status: u16) -> Self {
        Self::Response(HttpResponse::with_status(status))
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Failure(HttpError::new(message))
    }
}

#[derive(Default)]
struct StubState {
    routes: HashMap<String, VecDeque<StubReply>>,
    calls: Vec<String>,
}

/// Offline transport for deterministic tests.
///
/// Each route holds a queue of replies; the last reply repeats once the queue
/// is drained. Unknown URLs answer 404.
pub struct StubHttpClient {
    base_url: String,
    latency: Duration,
    state: Mutex<StubState>,
}

impl StubHttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            latency: Duration::ZERO,
            state: Mutex::new(StubState::default()),
        }
    }

    /// Delay every reply, which keeps fetches in flight long enough to overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn route(self, path: &str, reply: StubReply) -> Self {
        self.route_with_params(path, &[], vec![reply])
    }

    pub fn route_sequence(self, path: &str, replies: Vec<StubReply>) -> Self {
        self.route_with_params(path, &[], replies)
    }

    pub fn route_with_params(
        self,
        path: &str,
        params: &[(&str, String)],
        replies: Vec<StubReply>,
    ) -> Self {
        let url = build_url(&self.base_url, path, params);
        self.lock().routes.insert(url, replies.into());
        self
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls_to_with_params(path, &[])
    }

    pub fn calls_to_with_params(&self, path: &str, params: &[(&str, String)]) -> usize {
        let url = build_url(&self.base_url, path, params);
        self.lock().calls.iter().filter(|call| **call == url).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_reply(&self, url: &str) -> StubReply {
        let mut state = self.lock();
        state.calls.push(url.to_string());
        match state.routes.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| StubReply::status(404)),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| StubReply::status(404)),
            None => StubReply::status(404),
        }
    }
}

impl HttpClient for StubHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let reply = self.next_reply(&request.url);
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            match reply {
                StubReply::Response(response) => Ok(response),
                StubReply::Failure(error) => Err(error),
            }
        })
    }
}
