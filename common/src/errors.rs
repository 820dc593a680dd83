// Error handling framework

use thiserror::Error;

/// Raised when the monitor configuration document is not well-formed JSON
#[derive(Error, Debug)]
#[error("malformed monitor configuration: {0}")]
pub struct ConfigParseError(pub String);

/// Raised when a well-formed document violates the configuration contract
#[derive(Error, Debug)]
pub enum ConfigValidationError {
    #[error("invalid monitor configuration document: {0}")]
    InvalidDocument(String),

    #[error("invalid field value for {field}: {reason}")]
    InvalidFieldValue { field: String, reason: String },

    #[error("duplicate enabled collection: {0}")]
    DuplicateCollection(String),
}

/// Combined error for loading the monitor configuration document
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Parse(#[from] ConfigParseError),

    #[error(transparent)]
    Validation(#[from] ConfigValidationError),
}

/// Poll cycle errors
///
/// One of these is the outcome of a single failed check-and-report cycle.
/// The scheduler records it as that tick's failure and moves on; it is
/// never an excuse to stop the job or the process.
#[derive(Error, Debug)]
pub enum PollExecutionError {
    #[error("monitor service returned status {status}")]
    BadStatus { status: u16 },

    #[error("monitor service call timed out: {0}")]
    Timeout(String),

    #[error("monitor service call failed: {0}")]
    Transport(String),
}

impl PollExecutionError {
    /// Stable label for the failure-reason metrics dimension
    pub fn reason_label(&self) -> &'static str {
        match self {
            PollExecutionError::BadStatus { .. } => "bad_status",
            PollExecutionError::Timeout(_) => "timeout",
            PollExecutionError::Transport(_) => "transport",
        }
    }
}

impl From<reqwest::Error> for PollExecutionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PollExecutionError::Timeout(err.to_string())
        } else {
            PollExecutionError::Transport(err.to_string())
        }
    }
}

/// Scheduler lifecycle errors
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("duplicate job identity: {0}")]
    DuplicateJob(String),

    #[error("scheduler already started")]
    AlreadyStarted,
}
