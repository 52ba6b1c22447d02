//! eventconnect-admin entry point.
//!
//! Restores the saved session, runs one dashboard load cycle against the
//! configured backend and prints the published dashboard as JSON.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use eventconnect_admin::app_state::AppState;
use eventconnect_admin::config::ClientConfig;
use eventconnect_admin::service::CycleOutcome;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ClientConfig::from_env()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("invalid configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(api = %config.api_base_url, "starting eventconnect-admin");

    // Build application state
    let state = AppState::from_config(&config).context("cannot build HTTP client")?;
    if state.session.restore().await.is_none() {
        tracing::info!(path = %config.session_path.display(), "no saved session");
    }

    // Run one dashboard cycle
    let dashboard = match state.dashboard.reload().await {
        CycleOutcome::Published(dashboard) => dashboard,
        CycleOutcome::Superseded {
            generation,
            current,
        } => anyhow::bail!("cycle {generation} superseded by {current}"),
    };
    for failure in dashboard.status.failures() {
        tracing::warn!(source = failure.source, reason = %failure.reason, "section unavailable");
    }

    let json = serde_json::to_string_pretty(dashboard.as_ref())?;
    println!("{json}");
    Ok(())
}
