//! Schedule persistence
//!
//! A store only records and reports when each job last fired and when it is
//! next due; it never schedules anything itself. Backends are internally
//! synchronized and shared by every job of a scheduler.

mod file;
mod memory;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::job::JobId;

/// Last-fired and next-due timestamps of one job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    pub last_fired: DateTime<Utc>,
    pub next_due: DateTime<Utc>,
}

impl ScheduleRecord {
    /// Record of a fire at `fired_at`, due again one `period` later
    #[must_use]
    pub fn fired(fired_at: DateTime<Utc>, period: TimeDelta) -> Self {
        Self {
            last_fired: fired_at,
            next_due: fired_at + period,
        }
    }
}

/// Persistence of schedule records keyed by job identity
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Record of `job`, `None` before its first fire
    async fn get(&self, job: &JobId) -> Result<Option<ScheduleRecord>, StoreError>;

    /// Replace the record of `job`
    async fn record_fired(&self, job: &JobId, record: ScheduleRecord) -> Result<(), StoreError>;

    /// When `job` is next due, `None` (due now) before its first fire
    async fn next_due(&self, job: &JobId) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.get(job).await?.map(|record| record.next_due))
    }

    /// Short name of the backend, used in log fields
    fn store_type(&self) -> &'static str;
}
