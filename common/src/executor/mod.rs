// Poll executor interface

pub mod http;

pub use http::HttpPollExecutor;

use crate::errors::PollExecutionError;
use crate::models::{ConnectionConfig, MonitorConfig};
use async_trait::async_trait;

/// One bounded check-and-report cycle against the event-checking service.
///
/// Implementations hold no per-job state; every call is constructed from
/// the immutable configs it is handed. The return value is the explicit
/// tick outcome the scheduler pattern-matches on: `Ok(())` for an HTTP
/// 200, an error value for anything else.
#[async_trait]
pub trait PollExecutor: Send + Sync {
    async fn execute(
        &self,
        connection: &ConnectionConfig,
        monitor: &MonitorConfig,
    ) -> Result<(), PollExecutionError>;
}
