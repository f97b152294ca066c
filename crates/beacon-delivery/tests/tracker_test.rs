//! End-to-end tracker behavior against a mock tracking endpoint.

use std::time::Duration;

use anyhow::Result;
use beacon_core::TrackingAction;
use beacon_delivery::{Tracker, TrackerConfig, TrackingError};
use beacon_testing::{
    fixtures::{full_action, page_view, FULL_ACTION_QUERY, TEST_TOKEN},
    http::unreachable_endpoint,
    TestEnv, TEST_DELAY,
};
use http::StatusCode;

fn config(env: &TestEnv, delay: Duration) -> TrackerConfig {
    TrackerConfig::builder(env.endpoint())
        .default_site_id(42)
        .delay(delay)
        .build()
        .unwrap()
}

#[tokio::test]
async fn delivers_single_action() -> Result<()> {
    let env = TestEnv::new().await;
    let tracker = Tracker::new(config(&env, Duration::from_millis(1)))?;

    tracker.track(&page_view("Help / Feedback"))?.await?;

    let requests = env.http_mock.received_bulk_requests().await?;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].requests, vec!["?rec=1&idsite=42&action_name=Help+%2F+Feedback&send_image=0"]);
    assert_eq!(requests[0].token_auth, None);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].header("accept"), Some("*/*"));
    assert_eq!(requests[0].header("content-type"), Some("application/json"));
    Ok(())
}

#[tokio::test]
async fn actions_in_one_window_share_a_request() -> Result<()> {
    let env = TestEnv::new().await;
    let tracker = Tracker::new(config(&env, Duration::from_millis(200)))?;

    let first = tracker.track(&page_view("First"))?;
    let second = tracker.track(&page_view("Second"))?;
    let third = tracker.track(&page_view("Third"))?;

    first.await?;
    second.await?;
    third.await?;

    // The two later flushes find an empty batch.
    let count = env.http_mock.wait_for_requests(2, Duration::from_millis(400)).await;
    assert_eq!(count, 1);

    let requests = env.http_mock.received_bulk_requests().await?;
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].requests,
        vec![
            "?rec=1&idsite=42&action_name=First&send_image=0",
            "?rec=1&idsite=42&action_name=Second&send_image=0",
            "?rec=1&idsite=42&action_name=Third&send_image=0",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn separate_windows_send_separate_requests() -> Result<()> {
    let env = TestEnv::new().await;
    let tracker = Tracker::new(config(&env, TEST_DELAY))?;

    tracker.track(&page_view("First"))?.await?;
    tracker.track(&page_view("Second"))?.await?;

    env.http_mock.assert_request_count(2).await;
    assert_eq!(tracker.stats().batches_sent, 2);
    Ok(())
}

#[tokio::test]
async fn dropped_handle_still_delivers() -> Result<()> {
    let env = TestEnv::new().await;
    let tracker = Tracker::new(config(&env, TEST_DELAY))?;

    drop(tracker.track(&page_view("Fire and forget"))?);

    assert_eq!(env.wait_for_requests(1).await, 1);
    assert_eq!(
        env.http_mock.received_bulk_requests().await?[0].requests,
        vec!["?rec=1&idsite=42&action_name=Fire+and+forget&send_image=0"]
    );
    Ok(())
}

#[tokio::test]
async fn default_token_is_sent_in_body_and_queries() -> Result<()> {
    let env = TestEnv::new().await;
    let config = TrackerConfig::builder(env.endpoint())
        .default_site_id(42)
        .default_token_auth(TEST_TOKEN)
        .delay(TEST_DELAY)
        .build()?;
    let tracker = Tracker::new(config)?;

    tracker.track(&page_view("Home"))?.await?;

    let requests = env.http_mock.received_bulk_requests().await?;
    assert_eq!(requests[0].token_auth.as_deref(), Some(TEST_TOKEN));
    assert_eq!(
        requests[0].requests,
        vec![format!("?rec=1&idsite=42&token_auth={TEST_TOKEN}&action_name=Home&send_image=0")]
    );
    Ok(())
}

#[tokio::test]
async fn blank_default_token_is_sent_nowhere() -> Result<()> {
    let env = TestEnv::new().await;
    let mut config = config(&env, TEST_DELAY);
    config.default_token_auth = Some("   ".into());
    let tracker = Tracker::new(config)?;

    tracker.track(&page_view("Home"))?.await?;

    let requests = env.http_mock.received_bulk_requests().await?;
    assert_eq!(requests[0].token_auth, None);
    assert_eq!(requests[0].requests, vec!["?rec=1&idsite=42&action_name=Home&send_image=0"]);
    Ok(())
}

#[tokio::test]
async fn full_action_is_delivered_verbatim() -> Result<()> {
    let env = TestEnv::new().await;
    let tracker = Tracker::new(config(&env, TEST_DELAY))?;

    tracker.track(&full_action())?.await?;

    let requests = env.http_mock.received_bulk_requests().await?;
    assert_eq!(requests[0].requests, vec![format!("?{FULL_ACTION_QUERY}")]);
    Ok(())
}

#[tokio::test]
async fn server_error_fails_handle_without_retry() -> Result<()> {
    let env = TestEnv::without_responses().await;
    env.http_mock.mock_failure(StatusCode::INTERNAL_SERVER_ERROR).await;

    let mut config = config(&env, TEST_DELAY);
    config.log_failed_tracking = true;
    let tracker = Tracker::new(config)?;

    let mut handle = tracker.track(&page_view("Home"))?;
    let outcome = (&mut handle).await;

    assert_eq!(outcome, Err(TrackingError::delivery_failed(500)));
    assert!(handle.is_failed());

    let count = env.http_mock.wait_for_requests(2, Duration::from_millis(200)).await;
    assert_eq!(count, 1);

    let stats = tracker.stats();
    assert_eq!(stats.batches_failed, 1);
    assert_eq!(stats.events_failed, 1);
    assert_eq!(stats.batches_sent, 0);
    Ok(())
}

#[tokio::test]
async fn failed_batch_is_not_resent_with_next_window() -> Result<()> {
    let env = TestEnv::without_responses().await;
    env.http_mock.mock_failure(StatusCode::SERVICE_UNAVAILABLE).await;
    let tracker = Tracker::new(config(&env, TEST_DELAY))?;

    assert!(tracker.track(&page_view("Lost"))?.await.is_err());
    assert!(tracker.track(&page_view("Next"))?.await.is_err());

    let requests = env.http_mock.received_bulk_requests().await?;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].requests, vec!["?rec=1&idsite=42&action_name=Next&send_image=0"]);
    Ok(())
}

#[tokio::test]
async fn unreachable_endpoint_fails_handle() -> Result<()> {
    let config = TrackerConfig::builder(unreachable_endpoint())
        .default_site_id(42)
        .delay(TEST_DELAY)
        .build()?;

    let tracker = Tracker::new(config)?;
    let outcome = tracker.track(&page_view("Home"))?.await;

    assert!(matches!(outcome, Err(TrackingError::ConnectionFailed { .. })));
    Ok(())
}

#[tokio::test]
async fn disabled_tracker_sends_nothing() -> Result<()> {
    let env = TestEnv::new().await;
    let config = TrackerConfig::builder(env.endpoint()).enabled(false).delay(TEST_DELAY).build()?;
    let tracker = Tracker::new(config)?;

    // Not even the site id is checked when disabled.
    tracker.track(&TrackingAction::new())?.await?;

    tokio::time::sleep(Duration::from_millis(100)).await;
    env.http_mock.assert_request_count(0).await;
    Ok(())
}

#[tokio::test]
async fn missing_site_id_schedules_nothing() -> Result<()> {
    let env = TestEnv::new().await;
    let config = TrackerConfig::builder(env.endpoint()).delay(TEST_DELAY).build()?;
    let tracker = Tracker::new(config)?;

    let result = tracker.track(&page_view("Home"));

    assert_eq!(result.unwrap_err(), TrackingError::MissingSiteId);
    tokio::time::sleep(Duration::from_millis(100)).await;
    env.http_mock.assert_request_count(0).await;
    Ok(())
}

#[tokio::test]
async fn action_site_id_without_default() -> Result<()> {
    let env = TestEnv::new().await;
    let config = TrackerConfig::builder(env.endpoint()).delay(TEST_DELAY).build()?;
    let tracker = Tracker::new(config)?;

    tracker.track(&page_view("Home").site_id(7))?.await?;

    let requests = env.http_mock.received_bulk_requests().await?;
    assert_eq!(requests[0].requests, vec!["?rec=1&idsite=7&action_name=Home&send_image=0"]);
    Ok(())
}

#[tokio::test]
async fn shutdown_abandons_unsent_actions() -> Result<()> {
    let env = TestEnv::new().await;
    let tracker = Tracker::new(config(&env, Duration::from_secs(30)))?;

    let handle = tracker.track(&page_view("Home"))?;
    tracker.shutdown();

    assert_eq!(handle.await, Err(TrackingError::Abandoned));
    assert_eq!(tracker.track(&page_view("Late")).unwrap_err(), TrackingError::ShutDown);
    env.http_mock.assert_request_count(0).await;
    Ok(())
}

#[test]
fn blocking_wait_from_plain_thread() -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let env = runtime.block_on(TestEnv::new());
    let tracker = Tracker::with_runtime(config(&env, TEST_DELAY), runtime.handle().clone())?;

    let handle = tracker.track(&page_view("Home"))?;
    handle.wait()?;

    assert_eq!(tracker.stats().events_delivered, 1);
    Ok(())
}
