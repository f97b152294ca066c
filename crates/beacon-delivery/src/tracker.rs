//! The tracker facade.
//!
//! `track` validates and serializes an action on the caller's thread,
//! appends it to the pending batch and schedules a flush after the
//! configured delay. Every flush drains whatever has accumulated by then
//! and posts it as one bulk request, so actions tracked within one delay
//! window share a request. Failed batches are reported through their
//! handles and discarded.

use std::sync::Arc;

use beacon_core::{QuerySerializer, TrackingAction};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::{
    batch::PendingBatch,
    client::DeliveryClient,
    config::TrackerConfig,
    error::{ErrorCategory, Result, TrackingError},
    handle::TrackingHandle,
    scheduler::DelayScheduler,
};

/// Counters describing what a tracker has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    /// Actions appended to the pending batch
    pub events_enqueued: u64,
    /// Bulk requests the endpoint accepted
    pub batches_sent: u64,
    /// Bulk requests that failed
    pub batches_failed: u64,
    /// Actions in accepted bulk requests
    pub events_delivered: u64,
    /// Actions in failed bulk requests
    pub events_failed: u64,
}

impl TrackerStats {
    fn record_flush(&mut self, outcome: &Result<()>, size: usize) {
        let size = size as u64;
        if outcome.is_ok() {
            self.batches_sent += 1;
            self.events_delivered += size;
        } else {
            self.batches_failed += 1;
            self.events_failed += size;
        }
    }
}

struct TrackerInner {
    client: DeliveryClient,
    batch: PendingBatch,
    stats: Mutex<TrackerStats>,
}

/// Entry point for tracking actions.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct Tracker {
    config: Arc<TrackerConfig>,
    serializer: QuerySerializer,
    scheduler: DelayScheduler,
    inner: Arc<TrackerInner>,
}

impl Tracker {
    /// Creates a tracker that runs its flushes on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError::Configuration` when called outside a tokio
    /// runtime, when the configuration is invalid, or when the HTTP client
    /// cannot be built.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            TrackingError::configuration(format!("tracker needs a tokio runtime: {e}"))
        })?;
        Self::with_runtime(config, runtime)
    }

    /// Creates a tracker that runs its flushes on `runtime`.
    ///
    /// Use this when tracking from threads that are not part of a runtime.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError::Configuration` when the configuration is
    /// invalid or the HTTP client cannot be built.
    pub fn with_runtime(config: TrackerConfig, runtime: Handle) -> Result<Self> {
        config.validate()?;

        let client = DeliveryClient::new(&config)?;
        let serializer = QuerySerializer::new(
            config.default_site_id,
            config.effective_default_token_auth().map(str::to_owned),
        );
        let scheduler = DelayScheduler::new(runtime, config.delay);

        info!(
            endpoint = %config.api_endpoint,
            enabled = config.enabled,
            delay_ms = config.delay.as_millis(),
            "tracker started"
        );

        Ok(Self {
            config: Arc::new(config),
            serializer,
            scheduler,
            inner: Arc::new(TrackerInner {
                client,
                batch: PendingBatch::new(),
                stats: Mutex::new(TrackerStats::default()),
            }),
        })
    }

    /// Queues `action` for delivery.
    ///
    /// Returns an already completed handle when tracking is disabled.
    ///
    /// # Errors
    ///
    /// Fails synchronously, before anything is queued, with
    /// - `MissingSiteId` when neither the action nor the configuration has a
    ///   site id
    /// - `InvalidSiteId` for a negative site id
    /// - `InvalidParameter` when a value does not match its pattern
    /// - `ShutDown` after [`Tracker::shutdown`]
    pub fn track(&self, action: &TrackingAction) -> Result<TrackingHandle> {
        if !self.config.enabled {
            return Ok(TrackingHandle::completed());
        }

        match action.site_id.or(self.config.default_site_id) {
            None => return Err(TrackingError::MissingSiteId),
            Some(site_id) if site_id < 0 => return Err(TrackingError::invalid_site_id(site_id)),
            Some(_) => {},
        }

        if self.scheduler.is_shut_down() {
            return Err(TrackingError::ShutDown);
        }

        let query = self.serializer.serialize(action)?;
        let handle = self.inner.batch.push(query);
        self.inner.stats.lock().events_enqueued += 1;

        let inner = self.inner.clone();
        if let Err(error) = self.scheduler.schedule(flush(inner)) {
            // Shut down between the check above and scheduling.
            self.inner.batch.drain().abandon();
            return Err(error);
        }

        debug!(pending = self.inner.batch.len(), "tracking action queued");
        Ok(handle)
    }

    /// Stops the tracker.
    ///
    /// Flushes that have not fired yet are cancelled and the actions they
    /// would have sent fail as abandoned. Requests already in flight
    /// complete. Later calls to [`Tracker::track`] fail with `ShutDown`.
    pub fn shutdown(&self) {
        if self.scheduler.is_shut_down() {
            return;
        }
        self.scheduler.shutdown();

        let abandoned = self.inner.batch.drain();
        let abandoned_count = abandoned.len();
        abandoned.abandon();

        info!(abandoned = abandoned_count, "tracker shut down");
    }

    /// Snapshot of the tracker's counters.
    pub fn stats(&self) -> TrackerStats {
        *self.inner.stats.lock()
    }

    /// The tracker's configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("config", &self.config)
            .field("pending", &self.inner.batch.len())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

async fn flush(inner: Arc<TrackerInner>) {
    let batch = inner.batch.drain();
    if batch.is_empty() {
        return;
    }

    let batch_id = Uuid::new_v4();
    let span = info_span!("tracking_batch", %batch_id, size = batch.len());

    async move {
        debug!("flushing batch");
        let outcome = inner.client.deliver(&batch.queries()).await;

        let outcome = match outcome {
            Ok(response) => {
                debug!(
                    status = response.status_code,
                    duration_ms = response.duration.as_millis(),
                    "batch delivered"
                );
                Ok(())
            },
            Err(error) => {
                warn!(
                    error = %error,
                    category = %ErrorCategory::from(&error),
                    "batch not delivered, discarding"
                );
                Err(error)
            },
        };

        inner.stats.lock().record_flush(&outcome, batch.len());
        batch.complete(&outcome);
    }
    .instrument(span)
    .await;
}
