//! Batched asynchronous delivery of tracking actions.
//!
//! Callers hand actions to a [`Tracker`]. Each action is validated and
//! serialized on the calling thread, appended to a shared pending batch, and
//! a flush is scheduled on the tokio runtime after the configured delay.
//! Actions tracked within one delay window are posted together as a single
//! bulk request, and every caller learns the outcome through its
//! [`TrackingHandle`].
//!
//! # Example
//!
//! ```no_run
//! use beacon_core::TrackingAction;
//! use beacon_delivery::{Tracker, TrackerConfig};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TrackerConfig::builder(Url::parse("https://analytics.example.org/matomo.php")?)
//!     .default_site_id(1)
//!     .build()?;
//! let tracker = Tracker::new(config)?;
//!
//! let handle = tracker.track(&TrackingAction::new().name("Home"))?;
//! handle.await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod handle;
pub mod scheduler;
pub mod tracker;

pub use client::{DeliveryClient, DeliveryResponse};
pub use config::{TrackerConfig, TrackerConfigBuilder};
pub use error::{ErrorCategory, Result, TrackingError};
pub use handle::TrackingHandle;
pub use tracker::{Tracker, TrackerStats};
