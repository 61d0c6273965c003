//! In-memory schedule store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ScheduleRecord, ScheduleStore};
use crate::error::StoreError;
use crate::job::JobId;

/// Non-durable store: every job is due immediately after a restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<JobId, ScheduleRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn get(&self, job: &JobId) -> Result<Option<ScheduleRecord>, StoreError> {
        Ok(self.records.read().await.get(job).copied())
    }

    async fn record_fired(&self, job: &JobId, record: ScheduleRecord) -> Result<(), StoreError> {
        self.records.write().await.insert(job.clone(), record);
        Ok(())
    }

    fn store_type(&self) -> &'static str {
        "memory"
    }
}
