// HTTP poll executor implementation

use crate::errors::PollExecutionError;
use crate::executor::PollExecutor;
use crate::models::{ConnectionConfig, MonitorConfig};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Fixed sub-path of the collection-events monitoring operation on the
/// event-checking service.
pub const COLLECTION_EVENTS_MONITOR_PATH: &str = "retrieve_events";

/// Request body for one check cycle, taken verbatim from the monitor
/// config. Field names are the service's wire format.
#[derive(Debug, Serialize)]
struct EventsRequest<'a> {
    contract_address: &'a str,
    event_type: &'a str,
    limit: u32,
    max_events_to_gather: u32,
    discord_web_tokens: &'a [String],
}

/// HttpPollExecutor performs poll cycles over a shared connection pool.
///
/// The client is shared read-only across all monitor jobs; it holds no
/// per-job state beyond reusable connections.
pub struct HttpPollExecutor {
    client: Client,
    default_timeout: Duration,
}

impl HttpPollExecutor {
    /// Create a new HttpPollExecutor with the specified default timeout.
    ///
    /// TLS certificate verification is disabled: the event-checking
    /// service is an internal endpoint served with a self-signed
    /// certificate.
    pub fn new(timeout_seconds: u64) -> Result<Self, PollExecutionError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| {
                PollExecutionError::Transport(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            default_timeout: Duration::from_secs(timeout_seconds),
        })
    }

    /// Target URL for the collection-events monitoring call.
    fn monitor_url(connection: &ConnectionConfig) -> String {
        format!(
            "http://{}/{}/{}",
            connection.app_base_url, connection.monitor_path, COLLECTION_EVENTS_MONITOR_PATH
        )
    }

    /// Bound for one poll cycle: half the job's polling period, floored at
    /// one second, capped at the configured default. A hanging call frees
    /// the job around its next natural tick instead of starving it.
    fn poll_timeout(&self, interval_ms: u64) -> Duration {
        let half_period = Duration::from_millis(interval_ms / 2).max(Duration::from_secs(1));
        self.default_timeout.min(half_period)
    }
}

#[async_trait]
impl PollExecutor for HttpPollExecutor {
    #[tracing::instrument(skip(self, connection, monitor), fields(collection = %monitor.collection))]
    async fn execute(
        &self,
        connection: &ConnectionConfig,
        monitor: &MonitorConfig,
    ) -> Result<(), PollExecutionError> {
        let url = Self::monitor_url(connection);
        let body = EventsRequest {
            contract_address: &monitor.contract_address,
            event_type: &monitor.event_type,
            limit: monitor.events_limit_each_call,
            max_events_to_gather: monitor.max_events_to_gather,
            discord_web_tokens: &monitor.discord_webhook_tokens,
        };

        debug!(url = %url, event_type = %monitor.event_type, "calling monitor service");

        let response = self
            .client
            .post(&url)
            .timeout(self.poll_timeout(monitor.interval_ms))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(PollExecutionError::BadStatus {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
