use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Monitor Configuration Models
// ============================================================================

/// Shared network location of the external event-checking service.
///
/// One per deployment; every monitor job reaches the same service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub app_base_url: String,
    pub monitor_path: String,
}

/// Polling parameters for one monitored collection.
///
/// Immutable for the lifetime of a scheduling epoch: jobs capture their
/// config behind an `Arc` at creation, and a configuration change means a
/// new engine with a freshly loaded set, never an in-place mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub collection: String,
    pub contract_address: String,
    pub event_type: String,
    pub interval_ms: u64,
    pub events_limit_each_call: u32,
    pub max_events_to_gather: u32,
    pub discord_webhook_tokens: Vec<String>,
    pub enabled: bool,
}

impl MonitorConfig {
    /// Stable job identity, the scheduler's observability surface.
    pub fn job_name(&self) -> String {
        format!("monitor_{}", self.collection)
    }
}

// ============================================================================
// Job Run-Status Models
// ============================================================================

/// Whether a job currently has a poll cycle in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Idle,
    Running,
}

/// Outcome of one completed poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Success,
    Failed { reason: String },
}

/// Last-known run status of a scheduled monitor job.
#[derive(Debug, Clone)]
pub struct JobState {
    pub status: JobStatus,
    pub ticks_completed: u64,
    pub last_outcome: Option<TickOutcome>,
    pub last_finished_at: Option<DateTime<Utc>>,
}

impl Default for JobState {
    fn default() -> Self {
        Self {
            status: JobStatus::Idle,
            ticks_completed: 0,
            last_outcome: None,
            last_finished_at: None,
        }
    }
}
