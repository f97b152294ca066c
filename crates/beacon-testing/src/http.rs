//! Mock tracking endpoint.
//!
//! Wraps a wiremock server that accepts bulk tracking requests on
//! [`TRACKING_PATH`] and decodes what it received.

use std::time::Duration;

use anyhow::{Context, Result};
use http::{HeaderMap, StatusCode};
use serde::Deserialize;
use url::Url;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer as WiremockServer, ResponseTemplate,
};

/// Path the mock endpoint listens on.
pub const TRACKING_PATH: &str = "/matomo.php";

/// Mock tracking endpoint.
pub struct MockServer {
    server: WiremockServer,
}

impl MockServer {
    /// Starts a server on a random port. Nothing is mounted yet, so requests
    /// get a 404 until a response is configured.
    pub async fn start() -> Self {
        Self { server: WiremockServer::start().await }
    }

    /// Base URL of the server.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Full tracking endpoint URL.
    pub fn endpoint(&self) -> Url {
        // wiremock always reports a valid http://host:port base
        Url::parse(&format!("{}{TRACKING_PATH}", self.server.uri()))
            .unwrap_or_else(|e| panic!("mock server produced an invalid URL: {e}"))
    }

    /// Answers every bulk request with `response`.
    pub async fn mock_tracking(&self, response: MockResponse) {
        let template = match response {
            MockResponse::Status(status) => ResponseTemplate::new(status.as_u16()),
            MockResponse::Delayed { status, delay } => {
                ResponseTemplate::new(status.as_u16()).set_delay(delay)
            },
        };

        Mock::given(method("POST"))
            .and(path(TRACKING_PATH))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    /// Answers every bulk request with 204 No Content.
    pub async fn mock_success(&self) {
        self.mock_tracking(MockResponse::Status(StatusCode::NO_CONTENT)).await;
    }

    /// Answers every bulk request with `status`.
    pub async fn mock_failure(&self, status: StatusCode) {
        self.mock_tracking(MockResponse::Status(status)).await;
    }

    /// Bulk requests received so far, in arrival order.
    pub async fn received_bulk_requests(&self) -> Result<Vec<RecordedBulkRequest>> {
        let requests = self.server.received_requests().await.unwrap_or_default();

        requests
            .into_iter()
            .map(|request| {
                let body: BulkBody = serde_json::from_slice(&request.body)
                    .context("bulk request body is not the expected JSON")?;
                Ok(RecordedBulkRequest {
                    method: request.method.to_string(),
                    path: request.url.path().to_string(),
                    headers: request.headers.clone(),
                    requests: body.requests,
                    token_auth: body.token_auth,
                })
            })
            .collect()
    }

    /// Number of requests received so far.
    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.map_or(0, |requests| requests.len())
    }

    /// Polls until at least `expected` requests arrived or `timeout` passed.
    pub async fn wait_for_requests(&self, expected: usize, timeout: Duration) -> usize {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let count = self.request_count().await;
            if count >= expected || tokio::time::Instant::now() >= deadline {
                return count;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Asserts that exactly `expected` requests were received.
    pub async fn assert_request_count(&self, expected: usize) {
        let count = self.request_count().await;
        assert_eq!(count, expected, "Expected {expected} requests, received {count}");
    }
}

/// An endpoint on a local port nothing listens on, so connections are
/// refused.
pub fn unreachable_endpoint() -> Url {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .map(|address| address.port())
        .unwrap_or_else(|e| panic!("could not reserve a local port: {e}"));
    Url::parse(&format!("http://127.0.0.1:{port}{TRACKING_PATH}"))
        .unwrap_or_else(|e| panic!("invalid endpoint: {e}"))
}

/// Response the mock endpoint gives.
#[derive(Debug, Clone, Copy)]
pub enum MockResponse {
    /// Respond immediately with a status
    Status(StatusCode),
    /// Respond with a status after a delay
    Delayed {
        /// Response status
        status: StatusCode,
        /// Time before responding
        delay: Duration,
    },
}

#[derive(Deserialize)]
struct BulkBody {
    requests: Vec<String>,
    #[serde(default)]
    token_auth: Option<String>,
}

/// A decoded bulk request.
#[derive(Debug, Clone)]
pub struct RecordedBulkRequest {
    /// HTTP method
    pub method: String,
    /// Request path
    pub path: String,
    /// Request headers
    pub headers: HeaderMap,
    /// Queries, each prefixed with `?`
    pub requests: Vec<String>,
    /// Token sent next to the queries, if any
    pub token_auth: Option<String>,
}

impl RecordedBulkRequest {
    /// Value of a header as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}
