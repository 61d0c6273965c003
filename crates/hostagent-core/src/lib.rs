//! hostagent-core: scheduling and the collection pipeline
//!
//! Each registered [`Job`] runs as a `JobActor` whose mailbox serializes its
//! fires, driven by a ticker task that consults the [`ScheduleStore`] for the
//! next due time. The agent registers one job, the [`Pipeline`], which builds
//! and delivers the host inventory document.

pub mod actor;
pub mod error;
pub mod job;
pub mod message;
pub mod pipeline;
pub mod scheduler;
pub mod state;
pub mod store;

pub use actor::job::{JobActor, JobActorArgs};
pub use error::{CoreError, StoreError};
pub use job::{ActionError, FnAction, Job, JobAction, JobId};
pub use message::{Fire, FireReport, GetJobStatus, JobStatus};
pub use pipeline::Pipeline;
pub use scheduler::{Scheduler, SchedulerHandle};
pub use state::JobState;
pub use store::{FileStore, MemoryStore, ScheduleRecord, ScheduleStore};
