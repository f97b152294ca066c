//! Reads newline-delimited JSON actions and tracks them.

use anyhow::{Context, Result};
use beacon_core::TrackingAction;
use beacon_delivery::{ErrorCategory, Tracker, TrackingHandle};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, warn};

/// What happened to the actions read from the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Non-blank lines read
    pub read: usize,
    /// Actions the endpoint accepted (or that were skipped because
    /// tracking is disabled)
    pub delivered: usize,
    /// Lines that could not be parsed, were rejected, or were not delivered
    pub failed: usize,
}

/// Tracks one action per line of `input` and waits for every handle.
///
/// Malformed or rejected lines are logged and counted; they do not stop
/// the remaining input.
pub async fn track_lines<R>(tracker: &Tracker, input: R) -> Result<Summary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = Summary::default();
    let mut pending: Vec<(usize, TrackingHandle)> = Vec::new();
    let mut lines = input.lines();
    let mut line_number = 0;

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        summary.read += 1;

        let action: TrackingAction = match serde_json::from_str(&line) {
            Ok(action) => action,
            Err(e) => {
                warn!(line = line_number, error = %e, "skipping malformed action");
                summary.failed += 1;
                continue;
            },
        };

        match tracker.track(&action) {
            Ok(handle) => {
                debug!(line = line_number, "action queued");
                pending.push((line_number, handle));
            },
            Err(e) => {
                warn!(
                    line = line_number,
                    error = %e,
                    category = %ErrorCategory::from(&e),
                    "action rejected"
                );
                summary.failed += 1;
            },
        }
    }

    for (line, handle) in pending {
        match handle.await {
            Ok(()) => summary.delivered += 1,
            Err(e) => {
                error!(line, error = %e, "action not delivered");
                summary.failed += 1;
            },
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use beacon_delivery::TrackerConfig;
    use beacon_testing::{TestEnv, TEST_DELAY};

    use super::*;

    async fn tracker(env: &TestEnv) -> Tracker {
        let config = TrackerConfig::builder(env.endpoint())
            .default_site_id(1)
            .delay(TEST_DELAY)
            .build()
            .unwrap();
        Tracker::new(config).unwrap()
    }

    #[tokio::test]
    async fn tracks_every_line() {
        let env = TestEnv::new().await;
        let tracker = tracker(&env).await;
        let input = b"{\"name\":\"First\"}\n\n{\"name\":\"Second\",\"ping\":true}\n".as_slice();

        let summary = track_lines(&tracker, input).await.unwrap();

        assert_eq!(summary, Summary { read: 2, delivered: 2, failed: 0 });
        let requests = env.http_mock.received_bulk_requests().await.unwrap();
        assert_eq!(
            requests[0].requests,
            vec![
                "?rec=1&idsite=1&action_name=First&send_image=0",
                "?rec=1&idsite=1&action_name=Second&ping=1&send_image=0",
            ]
        );
    }

    #[tokio::test]
    async fn counts_malformed_and_rejected_lines() {
        let env = TestEnv::new().await;
        let tracker = tracker(&env).await;
        let input = b"not json\n{\"site_id\":-5}\n{\"name\":\"Ok\"}\n".as_slice();

        let summary = track_lines(&tracker, input).await.unwrap();

        assert_eq!(summary, Summary { read: 3, delivered: 1, failed: 2 });
    }
}
