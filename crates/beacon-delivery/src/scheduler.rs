//! Delayed execution of flushes on the tokio worker pool.

use std::{future::Future, time::Duration};

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Result, TrackingError};

/// Runs tasks on a runtime after a fixed delay.
///
/// Each call to [`DelayScheduler::schedule`] starts its own timer. Timers
/// that have not fired yet are dropped by [`DelayScheduler::shutdown`];
/// tasks already past their delay run to completion.
#[derive(Debug)]
pub struct DelayScheduler {
    runtime: Handle,
    delay: Duration,
    cancellation_token: CancellationToken,
}

impl DelayScheduler {
    /// Creates a scheduler spawning onto `runtime`.
    pub fn new(runtime: Handle, delay: Duration) -> Self {
        Self { runtime, delay, cancellation_token: CancellationToken::new() }
    }

    /// Delay applied to every scheduled task.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `task` once the delay has elapsed.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError::ShutDown` after [`DelayScheduler::shutdown`].
    pub fn schedule<F>(&self, task: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.cancellation_token.is_cancelled() {
            return Err(TrackingError::ShutDown);
        }

        let token = self.cancellation_token.clone();
        let delay = self.delay;

        self.runtime.spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    debug!("scheduled flush cancelled");
                },
                () = tokio::time::sleep(delay) => task.await,
            }
        });

        Ok(())
    }

    /// Cancels all pending timers and refuses new tasks.
    pub fn shutdown(&self) {
        self.cancellation_token.cancel();
    }

    /// Returns `true` after [`DelayScheduler::shutdown`].
    pub fn is_shut_down(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
