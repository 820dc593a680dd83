// Scheduler binary entry point

use anyhow::{Context, Result};
use common::config::Settings;
use common::executor::{HttpPollExecutor, PollExecutor};
use common::monitors;
use common::scheduler::{SchedulerConfig, SchedulerEngine};
use common::telemetry;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::load().context("Failed to load configuration")?;
    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    // Initialize logging and metrics
    telemetry::init_logging(&settings.observability.log_level)?;
    telemetry::init_metrics(settings.observability.metrics_port)?;

    info!("Starting marketplace monitor scheduler");

    // Load the monitor configuration document.
    // Configuration errors are fatal here, before any job runs.
    let raw = tokio::fs::read_to_string(&settings.monitors.path)
        .await
        .with_context(|| {
            format!(
                "Failed to read monitor configuration from {}",
                settings.monitors.path
            )
        })?;

    let (connection, monitor_configs) = monitors::load(&raw).map_err(|e| {
        error!(error = %e, path = %settings.monitors.path, "Invalid monitor configuration");
        anyhow::anyhow!("Invalid monitor configuration: {}", e)
    })?;

    info!(
        app_base_url = %connection.app_base_url,
        monitor_count = monitor_configs.len(),
        "Monitor configuration loaded"
    );

    // Create the poll executor; its HTTP client is shared across all jobs
    let executor: Arc<dyn PollExecutor> = Arc::new(
        HttpPollExecutor::new(settings.http.timeout_seconds)
            .map_err(|e| anyhow::anyhow!("Failed to create poll executor: {}", e))?,
    );

    // Create and start the scheduler engine
    let scheduler_config = SchedulerConfig {
        shutdown_grace_seconds: settings.scheduler.shutdown_grace_seconds,
    };
    let engine = Arc::new(SchedulerEngine::new(scheduler_config, executor));

    let job_count = engine
        .start(connection, monitor_configs)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to start scheduler");
            anyhow::anyhow!("Failed to start scheduler: {}", e)
        })?;

    info!(job_count = job_count, "Scheduler running");

    // Run until SIGINT, then cancel all jobs
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    info!("Received Ctrl+C signal, initiating graceful shutdown");
    engine.stop().await;

    info!("Scheduler stopped");
    Ok(())
}
