//! Test harness for beacon integration and unit tests.
//!
//! Provides a mock tracking endpoint, action fixtures and a [`TestEnv`]
//! that wires both together with test-friendly tracing.

pub mod fixtures;
pub mod http;

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use url::Url;

/// Short flush delay for tests that wait on real time.
pub const TEST_DELAY: Duration = Duration::from_millis(20);

/// How long tests wait for the mock endpoint before giving up.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Test environment with a running mock endpoint.
pub struct TestEnv {
    pub http_mock: http::MockServer,
}

impl TestEnv {
    /// Starts a mock endpoint that accepts every bulk request.
    pub async fn new() -> Self {
        let env = Self::without_responses().await;
        env.http_mock.mock_success().await;
        env
    }

    /// Starts a mock endpoint with no responses mounted.
    pub async fn without_responses() -> Self {
        init_tracing();
        Self { http_mock: http::MockServer::start().await }
    }

    /// Tracking endpoint URL of the mock server.
    pub fn endpoint(&self) -> Url {
        self.http_mock.endpoint()
    }

    /// Waits until `expected` bulk requests arrived, up to
    /// [`REQUEST_TIMEOUT`].
    pub async fn wait_for_requests(&self, expected: usize) -> usize {
        self.http_mock.wait_for_requests(expected, REQUEST_TIMEOUT).await
    }
}

/// Installs a tracing subscriber that writes through the test harness.
/// Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,beacon=debug")),
        )
        .with_test_writer()
        .try_init();
}
