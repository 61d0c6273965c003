//! `JobActor`: one scheduled job
//!
//! The mailbox handles one message at a time, so a job's action can never
//! run concurrently with itself.

use std::sync::Arc;

use chrono::Utc;
use kameo::actor::{ActorRef, WeakActorRef};
use kameo::error::ActorStopReason;
use kameo::message::{Context, Message};
use kameo::prelude::*;
use tracing::{error, info, warn};

use crate::error::CoreError;
use crate::job::Job;
use crate::message::{Fire, FireReport, GetJobStatus, JobStatus};
use crate::state::JobState;
use crate::store::{ScheduleRecord, ScheduleStore};

/// Arguments for spawning a `JobActor`
pub struct JobActorArgs {
    /// The job to run
    pub job: Job,
    /// Store shared by every job of the scheduler
    pub store: Arc<dyn ScheduleStore>,
}

/// Actor owning one job's state machine
pub struct JobActor {
    job: Job,
    store: Arc<dyn ScheduleStore>,
    state: JobState,
    fires: u64,
    last: Option<FireReport>,
}

impl JobActor {
    fn transition_to(&mut self, new_state: JobState) -> Result<(), CoreError> {
        if !self.state.can_transition_to(new_state) {
            return Err(CoreError::InvalidTransition {
                from: self.state,
                to: new_state,
            });
        }
        self.state = new_state;
        Ok(())
    }

    /// Run the action on its own task so a panic is contained to this fire
    async fn run_action(&self) -> bool {
        let action = self.job.action();
        match tokio::spawn(async move { action.run().await }).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(job = %self.job.id(), error = %e, "job action failed");
                false
            }
            Err(e) => {
                error!(job = %self.job.id(), error = %e, "job action panicked");
                false
            }
        }
    }
}

impl Actor for JobActor {
    type Args = JobActorArgs;
    type Error = CoreError;

    async fn on_start(args: Self::Args, actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        info!(
            job = %args.job.id(),
            period = ?args.job.period(),
            store = args.store.store_type(),
            id = %actor_ref.id(),
            "job armed"
        );

        Ok(Self {
            job: args.job,
            store: args.store,
            state: JobState::Armed,
            fires: 0,
            last: None,
        })
    }

    async fn on_stop(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        reason: ActorStopReason,
    ) -> Result<(), Self::Error> {
        self.state = JobState::Stopped;
        info!(job = %self.job.id(), fires = self.fires, reason = ?reason, "job stopped");
        Ok(())
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Message<Fire> for JobActor {
    type Reply = Result<FireReport, CoreError>;

    async fn handle(&mut self, _msg: Fire, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        self.transition_to(JobState::Firing)?;

        let started_at = Utc::now();
        info!(job = %self.job.id(), "job firing");

        let succeeded = self.run_action().await;

        let fired_at = Utc::now();
        let record = ScheduleRecord::fired(fired_at, self.job.period_delta());
        if let Err(e) = self.store.record_fired(self.job.id(), record).await {
            warn!(job = %self.job.id(), error = %e, "failed to record fire");
        }

        self.transition_to(JobState::Armed)?;
        self.fires += 1;

        info!(
            job = %self.job.id(),
            succeeded,
            elapsed = ?(fired_at - started_at).to_std().unwrap_or_default(),
            next_due = %record.next_due,
            "job fired"
        );

        let report = FireReport {
            job: self.job.id().clone(),
            started_at,
            fired_at,
            next_due: record.next_due,
            succeeded,
        };
        self.last = Some(report.clone());

        Ok(report)
    }
}

impl Message<GetJobStatus> for JobActor {
    type Reply = JobStatus;

    async fn handle(
        &mut self,
        _msg: GetJobStatus,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        JobStatus {
            job: self.job.id().clone(),
            state: self.state,
            fires: self.fires,
            last: self.last.clone(),
        }
    }
}
