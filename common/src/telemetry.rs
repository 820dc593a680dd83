// Telemetry module for structured logging and metrics

use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize structured logging with JSON formatting.
///
/// Log levels come from `RUST_LOG` when set, otherwise from the
/// configured level.
pub fn init_logging(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_target(true)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;

    tracing::info!(log_level = log_level, "Structured logging initialized");

    Ok(())
}

/// Initialize the Prometheus metrics exporter and register all metrics:
/// - poll_success_total: Counter for successful poll cycles
/// - poll_failed_total: Counter for failed poll cycles
/// - poll_duration_seconds: Histogram for poll cycle duration
/// - monitor_jobs_active: Gauge for currently scheduled monitor jobs
pub fn init_metrics(metrics_port: u16) -> Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", metrics_port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid metrics port: {}", e))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    describe_counter!("poll_success_total", "Total number of successful poll cycles");
    describe_counter!("poll_failed_total", "Total number of failed poll cycles");
    describe_histogram!(
        "poll_duration_seconds",
        "Duration of poll cycles in seconds"
    );
    describe_gauge!(
        "monitor_jobs_active",
        "Number of currently scheduled monitor jobs"
    );

    tracing::info!(
        metrics_port = metrics_port,
        "Prometheus metrics exporter initialized"
    );

    Ok(())
}

/// Record a successful poll cycle
#[inline]
pub fn record_poll_success(collection: &str) {
    counter!("poll_success_total", "collection" => collection.to_string()).increment(1);
}

/// Record a failed poll cycle
#[inline]
pub fn record_poll_failure(collection: &str, reason: &str) {
    counter!(
        "poll_failed_total",
        "collection" => collection.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record poll cycle duration
#[inline]
pub fn record_poll_duration(collection: &str, duration_seconds: f64) {
    histogram!("poll_duration_seconds", "collection" => collection.to_string())
        .record(duration_seconds);
}

/// Update the scheduled-jobs gauge
#[inline]
pub fn set_active_jobs(count: usize) {
    gauge!("monitor_jobs_active").set(count as f64);
}
