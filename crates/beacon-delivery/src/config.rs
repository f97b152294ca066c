//! Tracker configuration.
//!
//! A [`TrackerConfig`] is assembled with [`TrackerConfig::builder`], checked
//! once by [`TrackerConfigBuilder::build`], and then shared read-only by the
//! tracker and its delivery client.

use std::{fmt, time::Duration};

use url::Url;

use crate::error::{Result, TrackingError};

/// Default delay between an enqueue and the flush it schedules.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent of bulk requests.
pub const DEFAULT_USER_AGENT: &str = concat!("Beacon-Tracker/", env!("CARGO_PKG_VERSION"));

/// Settings for a tracker and its delivery client.
#[derive(Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Tracking endpoint, e.g. `https://analytics.example.org/matomo.php`
    pub api_endpoint: Url,
    /// Site id used for actions without one
    pub default_site_id: Option<i64>,
    /// Auth token used for actions without one
    pub default_token_auth: Option<String>,
    /// When false, tracking calls succeed immediately without sending anything
    pub enabled: bool,
    /// Time between an enqueue and the flush it triggers
    pub delay: Duration,
    /// TCP connect timeout; zero disables it
    pub connect_timeout: Duration,
    /// Read timeout on the response; zero disables it
    pub read_timeout: Duration,
    /// HTTP proxy host
    pub proxy_host: Option<String>,
    /// HTTP proxy port
    pub proxy_port: Option<u16>,
    /// Proxy basic auth user
    pub proxy_username: Option<String>,
    /// Proxy basic auth password
    pub proxy_password: Option<String>,
    /// User-Agent sent with bulk requests
    pub user_agent: String,
    /// Log error responses from the endpoint at error level
    pub log_failed_tracking: bool,
}

impl TrackerConfig {
    /// Starts a builder for the given endpoint with default settings.
    pub fn builder(api_endpoint: Url) -> TrackerConfigBuilder {
        TrackerConfigBuilder {
            config: Self {
                api_endpoint,
                default_site_id: None,
                default_token_auth: None,
                enabled: true,
                delay: DEFAULT_DELAY,
                connect_timeout: DEFAULT_CONNECT_TIMEOUT,
                read_timeout: DEFAULT_READ_TIMEOUT,
                proxy_host: None,
                proxy_port: None,
                proxy_username: None,
                proxy_password: None,
                user_agent: DEFAULT_USER_AGENT.to_string(),
                log_failed_tracking: false,
            },
        }
    }

    /// Checks the configuration for inconsistencies.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError::Configuration` for a non-HTTP endpoint, a
    /// negative default site id, a proxy host without a port (or the other
    /// way round), a proxy port of 0, or proxy credentials without a proxy.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.api_endpoint.scheme(), "http" | "https") {
            return Err(TrackingError::configuration(format!(
                "api endpoint must use http or https, got {}",
                self.api_endpoint.scheme()
            )));
        }

        if let Some(site_id) = self.default_site_id {
            if site_id < 0 {
                return Err(TrackingError::configuration(format!(
                    "default site id must not be negative, got {site_id}"
                )));
            }
        }

        match (&self.proxy_host, self.proxy_port) {
            (Some(host), None) => {
                return Err(TrackingError::configuration(format!("proxy host {host} has no port")));
            },
            (None, Some(port)) => {
                return Err(TrackingError::configuration(format!("proxy port {port} has no host")));
            },
            (Some(host), Some(_)) if host.trim().is_empty() => {
                return Err(TrackingError::configuration("proxy host must not be blank"));
            },
            (Some(host), Some(0)) => {
                return Err(TrackingError::configuration(format!("proxy {host} has port 0")));
            },
            _ => {},
        }

        if self.proxy_host.is_none()
            && (self.proxy_username.is_some() || self.proxy_password.is_some())
        {
            return Err(TrackingError::configuration("proxy credentials given without a proxy"));
        }

        Ok(())
    }

    /// The default auth token, unless it is missing or blank.
    pub fn effective_default_token_auth(&self) -> Option<&str> {
        self.default_token_auth.as_deref().filter(|token| !token.trim().is_empty())
    }

    /// Proxy URL built from host and port, when a proxy is configured.
    pub fn proxy_url(&self) -> Option<String> {
        match (&self.proxy_host, self.proxy_port) {
            (Some(host), Some(port)) => Some(format!("http://{host}:{port}")),
            _ => None,
        }
    }
}

impl fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("api_endpoint", &self.api_endpoint.as_str())
            .field("default_site_id", &self.default_site_id)
            .field("default_token_auth", &self.default_token_auth.as_ref().map(|_| "<redacted>"))
            .field("enabled", &self.enabled)
            .field("delay", &self.delay)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("proxy_host", &self.proxy_host)
            .field("proxy_port", &self.proxy_port)
            .field("proxy_username", &self.proxy_username)
            .field("proxy_password", &self.proxy_password.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("log_failed_tracking", &self.log_failed_tracking)
            .finish()
    }
}

/// Builder for [`TrackerConfig`].
#[derive(Debug, Clone)]
pub struct TrackerConfigBuilder {
    config: TrackerConfig,
}

impl TrackerConfigBuilder {
    /// Sets the default site id.
    pub fn default_site_id(mut self, site_id: i64) -> Self {
        self.config.default_site_id = Some(site_id);
        self
    }

    /// Sets the default auth token. Blank tokens are ignored.
    pub fn default_token_auth(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.config.default_token_auth = (!token.trim().is_empty()).then_some(token);
        self
    }

    /// Enables or disables tracking.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Sets the flush delay.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.config.delay = delay;
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Sets the read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    /// Routes requests through an HTTP proxy.
    pub fn proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.config.proxy_host = Some(host.into());
        self.config.proxy_port = Some(port);
        self
    }

    /// Sets basic auth credentials for the proxy.
    pub fn proxy_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.config.proxy_username = Some(username.into());
        self.config.proxy_password = Some(password.into());
        self
    }

    /// Sets the User-Agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Logs error responses from the endpoint.
    pub fn log_failed_tracking(mut self, enabled: bool) -> Self {
        self.config.log_failed_tracking = enabled;
        self
    }

    /// Validates and returns the configuration.
    ///
    /// # Errors
    ///
    /// See [`TrackerConfig::validate`].
    pub fn build(self) -> Result<TrackerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
