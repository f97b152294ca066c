//! Error types for tracking and delivery.
//!
//! Input errors are returned synchronously from `Tracker::track`. Network
//! and endpoint errors only ever reach callers through their
//! `TrackingHandle`, which is why the type is `Clone`: one flush outcome is
//! handed to every handle of the batch.

use std::fmt;

use beacon_core::ParameterError;
use thiserror::Error;

/// Result type alias for tracking operations.
pub type Result<T> = std::result::Result<T, TrackingError>;

/// Errors raised while tracking an action or delivering a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    /// Neither the action nor the configuration supplies a site id.
    #[error("no site id set on the action and no default site id configured")]
    MissingSiteId,

    /// Site ids must not be negative.
    #[error("site id must not be negative, got {site_id}")]
    InvalidSiteId {
        /// The rejected site id
        site_id: i64,
    },

    /// A parameter failed validation during serialization.
    #[error(transparent)]
    InvalidParameter(#[from] ParameterError),

    /// The bulk request never got a response.
    #[error("could not send tracking request: {message}")]
    ConnectionFailed {
        /// Transport error description
        message: String,
    },

    /// The endpoint answered with an error status.
    #[error("tracking endpoint returned HTTP {status_code}")]
    DeliveryFailed {
        /// HTTP status code (400 or above)
        status_code: u16,
    },

    /// Invalid tracker configuration.
    #[error("invalid tracker configuration: {message}")]
    Configuration {
        /// What is wrong with the configuration
        message: String,
    },

    /// The tracker was shut down before the call.
    #[error("tracker has been shut down")]
    ShutDown,

    /// The action was queued but its batch was never sent.
    #[error("tracking request was abandoned before delivery")]
    Abandoned,
}

impl TrackingError {
    /// Creates an invalid site id error.
    pub fn invalid_site_id(site_id: i64) -> Self {
        Self::InvalidSiteId { site_id }
    }

    /// Creates a connection failure from a message.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed { message: message.into() }
    }

    /// Creates a delivery failure for an HTTP status.
    pub fn delivery_failed(status_code: u16) -> Self {
        Self::DeliveryFailed { status_code }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Returns `true` for errors raised before anything was queued.
    pub fn is_input_error(&self) -> bool {
        ErrorCategory::from(self) == ErrorCategory::Input
    }

    /// HTTP status returned by the endpoint, if the error carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::DeliveryFailed { status_code } => Some(*status_code),
            _ => None,
        }
    }
}

/// Category of tracking error for structured logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller supplied data or configuration.
    Input,
    /// Transport level failures.
    Network,
    /// Error statuses from the endpoint.
    Remote,
    /// Tracker lifecycle (shutdown, abandoned batches).
    Lifecycle,
}

impl From<&TrackingError> for ErrorCategory {
    fn from(error: &TrackingError) -> Self {
        match error {
            TrackingError::MissingSiteId
            | TrackingError::InvalidSiteId { .. }
            | TrackingError::InvalidParameter(_)
            | TrackingError::Configuration { .. } => Self::Input,
            TrackingError::ConnectionFailed { .. } => Self::Network,
            TrackingError::DeliveryFailed { .. } => Self::Remote,
            TrackingError::ShutDown | TrackingError::Abandoned => Self::Lifecycle,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Network => write!(f, "network"),
            Self::Remote => write!(f, "remote"),
            Self::Lifecycle => write!(f, "lifecycle"),
        }
    }
}
