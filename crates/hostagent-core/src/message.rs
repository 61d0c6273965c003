//! Message types for job actors
//!
//! Handlers are implemented in `actor::job`.

use chrono::{DateTime, Utc};
use kameo_macros::Reply;

use crate::job::JobId;
use crate::state::JobState;

/// Run the job's action once and re-arm it
#[derive(Debug)]
pub struct Fire;

/// What happened during one fire
#[derive(Debug, Clone, Reply)]
pub struct FireReport {
    /// Job that fired
    pub job: JobId,
    /// When the action started
    pub started_at: DateTime<Utc>,
    /// When the action finished; the recorded fire time
    pub fired_at: DateTime<Utc>,
    /// `fired_at + period`
    pub next_due: DateTime<Utc>,
    /// Whether the action completed without error or panic
    pub succeeded: bool,
}

/// Get the job's current status
#[derive(Debug)]
pub struct GetJobStatus;

/// Snapshot of one job
#[derive(Debug, Clone, Reply)]
pub struct JobStatus {
    /// Job name
    pub job: JobId,
    /// Current state
    pub state: JobState,
    /// Number of completed fires
    pub fires: u64,
    /// Outcome of the most recent fire
    pub last: Option<FireReport>,
}
