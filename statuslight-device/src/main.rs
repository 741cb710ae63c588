//! Status Light Device
//!
//! Watches one job on a CI server and shows its last build result.
//!
//! Architecture:
//! - Configuration: Load start-up settings from environment or defaults
//! - Controller: Owns poll configuration and last known status
//! - Scheduler: Ticks the controller, which polls when due
//! - API: Status page and configuration form
//!
//! Nothing is persisted: configuration and status reset on every restart.

mod api;
mod config;
mod controller;
mod scheduler;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::AppState;
use crate::config::Config;
use crate::controller::PollController;
use crate::scheduler::StatusPoller;
use statuslight_client::JobServerClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "statuslight_device=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Status Light");

    // Load configuration
    let config = load_config()?;
    info!(
        "Loaded configuration: host={}, job={}, interval={}s",
        config.poll.host(),
        config.poll.job_name(),
        config.poll.interval_secs()
    );

    // Initialize job server client
    let client = JobServerClient::with_timeouts(config.connect_timeout, config.response_timeout)
        .context("Failed to create job server client")?;

    let controller = PollController::new(config.poll.clone(), Arc::new(client)).into_shared();
    let refresh = Arc::new(Notify::new());

    // Start polling loop
    let poller = StatusPoller::new(controller.clone(), refresh.clone(), config.tick_period);
    tokio::spawn(async move { poller.run().await });

    // Build router with all endpoints
    let app = api::create_router(AppState::new(controller, refresh));

    info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Status Light stopped");
    Ok(())
}

/// Loads configuration from environment variables
///
/// Unset variables take their defaults; an invalid setting aborts start-up.
fn load_config() -> Result<Config> {
    Config::from_env().context("Invalid configuration")
}

/// Resolves when the process is asked to stop
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
