//! Durable schedule store backed by a JSON file

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use super::{ScheduleRecord, ScheduleStore};
use crate::error::StoreError;
use crate::job::JobId;

/// Store persisting every record to one JSON file
///
/// The whole schedule is rewritten on each fire through a temporary file and
/// a rename, so a crash leaves either the old or the new schedule on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    records: Mutex<BTreeMap<JobId, ScheduleRecord>>,
}

impl FileStore {
    /// Open the schedule at `path`, starting empty if the file does not exist
    ///
    /// # Errors
    /// Returns an error if the parent directory cannot be created, the file
    /// cannot be read, or it does not hold a schedule.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let records: BTreeMap<JobId, ScheduleRecord> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        info!(jobs = records.len(), "opened schedule file");

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, records: &BTreeMap<JobId, ScheduleRecord>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("tmp");

        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), "schedule persisted");
        Ok(())
    }
}

#[async_trait]
impl ScheduleStore for FileStore {
    async fn get(&self, job: &JobId) -> Result<Option<ScheduleRecord>, StoreError> {
        Ok(self.records.lock().await.get(job).copied())
    }

    async fn record_fired(&self, job: &JobId, record: ScheduleRecord) -> Result<(), StoreError> {
        // Held across the write so concurrent fires of different jobs
        // cannot persist out of order.
        let mut records = self.records.lock().await;
        records.insert(job.clone(), record);
        self.persist(&records).await
    }

    fn store_type(&self) -> &'static str {
        "file"
    }
}
