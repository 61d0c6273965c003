//! Core error types for hostagent-core

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use hostagent_inventory::InventoryError;

use crate::state::JobState;

/// Errors raised by the scheduler, its jobs, and the pipeline
#[derive(Error, Debug)]
pub enum CoreError {
    /// Job registered with a zero or unrepresentable period
    #[error("job {job} has invalid period {period:?}")]
    InvalidPeriod {
        /// Job name
        job: String,
        /// Rejected period
        period: Duration,
    },

    /// Job registered without a name
    #[error("job name must not be empty")]
    EmptyJobName,

    /// Two jobs registered under the same name
    #[error("job already registered: {0}")]
    DuplicateJob(String),

    /// `start` called twice, or `register` after `start`
    #[error("scheduler already started")]
    AlreadyStarted,

    /// No tokio runtime (and so no timer) is available to drive the jobs
    #[error("scheduler timer unavailable: {0}")]
    TimerUnavailable(String),

    /// Invalid job state transition attempted
    #[error("invalid state transition from {from} to {to}")]
    InvalidTransition {
        /// Current state
        from: JobState,
        /// Attempted target state
        to: JobState,
    },

    /// The mandatory host fact could not be collected
    #[error("inventory build failed: {0}")]
    Inventory(#[from] InventoryError),
}

/// Errors raised by schedule store backends
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but does not hold a schedule
    #[error("corrupt schedule file {path}: {source}")]
    Corrupt {
        /// File being read
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// The schedule could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
