//! Periodic job scheduler
//!
//! Every registered job gets a [`JobActor`] and a ticker task. The ticker
//! asks the store when the job is next due, sleeps until then (re-checking
//! the wall clock at least every [`MAX_SLEEP`]), and sends [`Fire`]. Because
//! the ticker awaits each fire before computing the next wait, a job never
//! overlaps with itself, and a fire that overruns its period is followed
//! by the next one right away instead of a burst of missed ticks.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use kameo::actor::ActorRef;
use kameo::prelude::*;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::actor::job::{JobActor, JobActorArgs};
use crate::error::CoreError;
use crate::job::{Job, JobId};
use crate::message::{Fire, GetJobStatus, JobStatus};
use crate::state::JobState;
use crate::store::ScheduleStore;

/// Longest single sleep of a ticker
pub const MAX_SLEEP: Duration = Duration::from_secs(60);

struct RunningJob {
    id: JobId,
    actor: ActorRef<JobActor>,
    ticker: JoinHandle<()>,
}

/// Cloneable handle used to stop a running scheduler from another task
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    shutdown: Arc<watch::Sender<bool>>,
}

impl SchedulerHandle {
    /// Stop arming new fires; in-flight actions run to completion
    pub fn stop(&self) {
        if !self.shutdown.send_replace(true) {
            info!("scheduler stopping");
        }
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *self.shutdown.borrow()
    }
}

/// Runs registered jobs at their fixed periods
pub struct Scheduler {
    store: Arc<dyn ScheduleStore>,
    jobs: Vec<Job>,
    running: Vec<RunningJob>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl Scheduler {
    /// Create a scheduler over `store`
    #[must_use]
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            store,
            jobs: Vec::new(),
            running: Vec::new(),
            shutdown: Arc::new(shutdown),
        }
    }

    /// Add a job; it is armed when the scheduler starts
    ///
    /// # Errors
    /// Returns `CoreError::DuplicateJob` if a job with the same name is
    /// already registered and `CoreError::AlreadyStarted` after `start`.
    pub fn register(&mut self, job: Job) -> Result<(), CoreError> {
        if !self.running.is_empty() {
            return Err(CoreError::AlreadyStarted);
        }
        if self.jobs.iter().any(|j| j.id() == job.id()) {
            return Err(CoreError::DuplicateJob(job.id().to_string()));
        }

        debug!(job = %job.id(), period = ?job.period(), "job registered");
        self.jobs.push(job);
        Ok(())
    }

    /// Spawn an actor and a ticker for every registered job
    ///
    /// # Errors
    /// Returns `CoreError::TimerUnavailable` outside a tokio runtime and
    /// `CoreError::AlreadyStarted` if called twice.
    pub fn start(&mut self) -> Result<(), CoreError> {
        tokio::runtime::Handle::try_current()
            .map_err(|e| CoreError::TimerUnavailable(e.to_string()))?;

        if !self.running.is_empty() {
            return Err(CoreError::AlreadyStarted);
        }

        for job in &self.jobs {
            let actor = JobActor::spawn(JobActorArgs {
                job: job.clone(),
                store: Arc::clone(&self.store),
            });

            let ticker = tokio::spawn(tick(
                actor.clone(),
                job.id().clone(),
                job.period_delta(),
                Arc::clone(&self.store),
                self.shutdown.subscribe(),
            ));

            self.running.push(RunningJob {
                id: job.id().clone(),
                actor,
                ticker,
            });
        }

        info!(jobs = self.running.len(), store = self.store.store_type(), "scheduler started");
        Ok(())
    }

    #[must_use]
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    /// Same as [`SchedulerHandle::stop`]
    pub fn stop(&self) {
        self.handle().stop();
    }

    /// Status of the job named `name`, `None` if no such job is registered
    pub async fn status(&self, name: &str) -> Option<JobStatus> {
        if let Some(running) = self.running.iter().find(|r| r.id.as_str() == name) {
            return match running.actor.ask(GetJobStatus).await {
                Ok(status) => Some(status),
                Err(e) => {
                    warn!(job = name, error = %e, "failed to get job status");
                    Some(JobStatus {
                        job: running.id.clone(),
                        state: JobState::Stopped,
                        fires: 0,
                        last: None,
                    })
                }
            };
        }

        self.jobs
            .iter()
            .find(|j| j.id().as_str() == name)
            .map(|j| JobStatus {
                job: j.id().clone(),
                state: JobState::Idle,
                fires: 0,
                last: None,
            })
    }

    /// Wait until the scheduler is stopped and every in-flight fire is done
    pub async fn wait(self) {
        for running in self.running {
            if let Err(e) = running.ticker.await {
                warn!(job = %running.id, error = %e, "ticker task ended abnormally");
            }
            if let Err(e) = running.actor.stop_gracefully().await {
                warn!(job = %running.id, error = %e, "failed to stop job actor");
            }
        }
        info!("scheduler stopped");
    }

    /// Stop and wait
    pub async fn shutdown(self) {
        self.stop();
        self.wait().await;
    }
}

async fn tick(
    actor: ActorRef<JobActor>,
    job: JobId,
    period: TimeDelta,
    store: Arc<dyn ScheduleStore>,
    mut shutdown: watch::Receiver<bool>,
) {
    // Next-due from this ticker's own last fire. A store that failed to
    // record that fire must not pull the job earlier than this.
    let mut fallback: Option<DateTime<Utc>> = None;

    loop {
        if *shutdown.borrow() {
            break;
        }

        let due = match store.next_due(&job).await {
            Ok(stored) => stored.max(fallback),
            Err(e) => {
                warn!(job = %job, error = %e, "failed to read schedule, using last known due time");
                fallback
            }
        };

        let now = Utc::now();
        if let Some(due) = due.filter(|due| *due > now) {
            let wait = (due - now).to_std().unwrap_or_default().min(MAX_SLEEP);
            debug!(job = %job, due = %due, wait = ?wait, "waiting");

            tokio::select! {
                () = tokio::time::sleep(wait) => continue,
                _ = shutdown.changed() => break,
            }
        }

        match actor.ask(Fire).await {
            Ok(report) => fallback = Some(report.next_due),
            Err(e) => {
                warn!(job = %job, error = %e, "fire failed");
                fallback = Some(Utc::now() + period);
            }
        }
    }

    debug!(job = %job, "ticker stopped");
}
