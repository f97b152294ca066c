//! Beacon batched analytics tracker.
//!
//! Reads one JSON tracking action per line from stdin, tracks each through
//! a [`Tracker`], waits until every batch has been answered and exits with
//! an error if any action was not delivered.

#![forbid(unsafe_code)]

mod config;
mod input;

use anyhow::{Context, Result};
use beacon_delivery::Tracker;
use tokio::io::BufReader;
use tracing::{error, info};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::load()?;
    let tracker_config = config.to_tracker_config()?;
    info!(
        endpoint = %tracker_config.api_endpoint,
        default_site_id = ?tracker_config.default_site_id,
        delay_ms = tracker_config.delay.as_millis(),
        "Configuration loaded"
    );

    let tracker = Tracker::new(tracker_config).context("Failed to start tracker")?;

    let summary = tokio::select! {
        summary = input::track_lines(&tracker, BufReader::new(tokio::io::stdin())) => summary?,
        () = shutdown_signal() => {
            tracker.shutdown();
            anyhow::bail!("Interrupted before all actions were delivered");
        },
    };

    tracker.shutdown();

    let stats = tracker.stats();
    info!(
        read = summary.read,
        delivered = summary.delivered,
        failed = summary.failed,
        batches_sent = stats.batches_sent,
        batches_failed = stats.batches_failed,
        "Tracking complete"
    );

    if summary.failed > 0 {
        anyhow::bail!("{} of {} actions were not delivered", summary.failed, summary.read);
    }
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,beacon=debug"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Waits for CTRL+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C signal");
        },
        () = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
