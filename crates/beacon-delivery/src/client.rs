//! HTTP client that posts a drained batch as one bulk request.
//!
//! The body is `{"requests":["?<query>",...],"token_auth":"<token>"}`, with
//! `token_auth` present only when a default token is configured. Any status
//! below 400 counts as delivered.

use std::time::{Duration, Instant};

use reqwest::header::ACCEPT;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    config::TrackerConfig,
    error::{Result, TrackingError},
};

#[derive(Debug, Serialize)]
struct BulkRequest<'a> {
    requests: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_auth: Option<&'a str>,
}

/// Outcome of a bulk request the endpoint accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryResponse {
    /// HTTP status code (below 400)
    pub status_code: u16,
    /// Time from sending the request to receiving the status
    pub duration: Duration,
}

/// Sends bulk tracking requests to the configured endpoint.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    client: reqwest::Client,
    endpoint: Url,
    default_token_auth: Option<String>,
    log_failed_tracking: bool,
}

impl DeliveryClient {
    /// Builds the HTTP client from the tracker configuration.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError::Configuration` if the proxy or the HTTP
    /// client cannot be set up.
    pub fn new(config: &TrackerConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(&config.user_agent);

        if !config.connect_timeout.is_zero() {
            builder = builder.connect_timeout(config.connect_timeout);
        }
        if !config.read_timeout.is_zero() {
            builder = builder.read_timeout(config.read_timeout);
        }

        builder = match config.proxy_url() {
            Some(proxy_url) => {
                let mut proxy = reqwest::Proxy::all(&proxy_url).map_err(|e| {
                    TrackingError::configuration(format!("invalid proxy {proxy_url}: {e}"))
                })?;
                if let (Some(username), Some(password)) =
                    (&config.proxy_username, &config.proxy_password)
                {
                    proxy = proxy.basic_auth(username, password);
                }
                builder.proxy(proxy)
            },
            None => builder.no_proxy(),
        };

        let client = builder.build().map_err(|e| {
            TrackingError::configuration(format!("failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            endpoint: config.api_endpoint.clone(),
            default_token_auth: config.effective_default_token_auth().map(str::to_owned),
            log_failed_tracking: config.log_failed_tracking,
        })
    }

    /// Posts `queries` as one bulk request.
    ///
    /// # Errors
    ///
    /// - `ConnectionFailed` when no response was received (DNS, refused
    ///   connection, timeout, I/O)
    /// - `DeliveryFailed` for statuses of 400 and above
    pub async fn deliver(&self, queries: &[&str]) -> Result<DeliveryResponse> {
        let body = BulkRequest {
            requests: queries.iter().map(|query| format!("?{query}")).collect(),
            token_auth: self.default_token_auth.as_deref(),
        };

        let start_time = Instant::now();
        debug!(requests = body.requests.len(), "sending bulk tracking request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ACCEPT, "*/*")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(
                    duration_ms = start_time.elapsed().as_millis(),
                    error = %e,
                    "could not send tracking request"
                );
                TrackingError::connection_failed(e.to_string())
            })?;

        let duration = start_time.elapsed();
        let status_code = response.status().as_u16();

        match status_code {
            0..=399 => {
                info!(status = status_code, duration_ms = duration.as_millis(), "batch delivered");
                Ok(DeliveryResponse { status_code, duration })
            },
            _ => {
                if self.log_failed_tracking {
                    error!(
                        status = status_code,
                        endpoint = %self.endpoint,
                        "tracking endpoint rejected bulk request"
                    );
                }
                Err(TrackingError::delivery_failed(status_code))
            },
        }
    }
}
