//! Configuration for the beacon command.

use std::time::Duration;

use anyhow::{Context, Result};
use beacon_delivery::{config::DEFAULT_USER_AGENT, TrackerConfig};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use url::Url;

const CONFIG_FILE: &str = "beacon.toml";
const ENV_PREFIX: &str = "BEACON_";

/// Command configuration with defaults, file, and environment overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables prefixed with `BEACON_` (highest priority)
/// 2. Configuration file (`beacon.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// Only the endpoint has no usable default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Tracking endpoint URL.
    ///
    /// Environment variable: `BEACON_API_ENDPOINT`
    #[serde(default)]
    pub api_endpoint: String,
    /// Site id for actions without one.
    ///
    /// Environment variable: `BEACON_DEFAULT_SITE_ID`
    #[serde(default)]
    pub default_site_id: Option<i64>,
    /// Auth token for actions without one.
    ///
    /// Environment variable: `BEACON_DEFAULT_TOKEN_AUTH`
    #[serde(default)]
    pub default_token_auth: Option<String>,
    /// Send anything at all.
    ///
    /// Environment variable: `BEACON_ENABLED`
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Delay between an action and the flush it triggers, in milliseconds.
    ///
    /// Environment variable: `BEACON_DELAY_MS`
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Connect timeout in milliseconds; 0 disables it.
    ///
    /// Environment variable: `BEACON_CONNECT_TIMEOUT_MS`
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Read timeout in milliseconds; 0 disables it.
    ///
    /// Environment variable: `BEACON_READ_TIMEOUT_MS`
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// HTTP proxy host.
    ///
    /// Environment variable: `BEACON_PROXY_HOST`
    #[serde(default)]
    pub proxy_host: Option<String>,
    /// HTTP proxy port.
    ///
    /// Environment variable: `BEACON_PROXY_PORT`
    #[serde(default)]
    pub proxy_port: Option<u16>,
    /// Proxy basic auth user.
    ///
    /// Environment variable: `BEACON_PROXY_USERNAME`
    #[serde(default)]
    pub proxy_username: Option<String>,
    /// Proxy basic auth password.
    ///
    /// Environment variable: `BEACON_PROXY_PASSWORD`
    #[serde(default)]
    pub proxy_password: Option<String>,
    /// User-Agent of bulk requests.
    ///
    /// Environment variable: `BEACON_USER_AGENT`
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Log error responses from the endpoint.
    ///
    /// Environment variable: `BEACON_LOG_FAILED_TRACKING`
    #[serde(default = "default_log_failed_tracking")]
    pub log_failed_tracking: bool,
}

impl Config {
    /// Loads configuration from defaults, `beacon.toml` and `BEACON_*`
    /// environment variables, then validates it.
    pub fn load() -> Result<Self> {
        let config: Self = Self::figment().extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Converts to the tracker configuration.
    pub fn to_tracker_config(&self) -> Result<TrackerConfig> {
        let endpoint = Url::parse(&self.api_endpoint)
            .with_context(|| format!("Invalid api_endpoint {:?}", self.api_endpoint))?;

        let mut builder = TrackerConfig::builder(endpoint)
            .enabled(self.enabled)
            .delay(Duration::from_millis(self.delay_ms))
            .connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .read_timeout(Duration::from_millis(self.read_timeout_ms))
            .user_agent(&self.user_agent)
            .log_failed_tracking(self.log_failed_tracking);

        if let Some(site_id) = self.default_site_id {
            builder = builder.default_site_id(site_id);
        }
        if let Some(token) = &self.default_token_auth {
            builder = builder.default_token_auth(token);
        }
        if let (Some(host), Some(port)) = (&self.proxy_host, self.proxy_port) {
            builder = builder.proxy(host, port);
        }
        if let (Some(username), Some(password)) = (&self.proxy_username, &self.proxy_password) {
            builder = builder.proxy_credentials(username, password);
        }

        builder.build().context("Invalid tracker configuration")
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.api_endpoint.trim().is_empty() {
            anyhow::bail!("api_endpoint must be set (BEACON_API_ENDPOINT or beacon.toml)");
        }

        if self.proxy_host.is_some() != self.proxy_port.is_some() {
            anyhow::bail!("proxy_host and proxy_port must be set together");
        }

        if self.proxy_username.is_some() != self.proxy_password.is_some() {
            anyhow::bail!("proxy_username and proxy_password must be set together");
        }

        if self.user_agent.trim().is_empty() {
            anyhow::bail!("user_agent must not be empty");
        }

        self.to_tracker_config().map(|_| ())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_endpoint: String::new(),
            default_site_id: None,
            default_token_auth: None,
            enabled: default_enabled(),
            delay_ms: default_delay_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            proxy_host: None,
            proxy_port: None,
            proxy_username: None,
            proxy_password: None,
            user_agent: default_user_agent(),
            log_failed_tracking: default_log_failed_tracking(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_read_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_log_failed_tracking() -> bool {
    true
}
