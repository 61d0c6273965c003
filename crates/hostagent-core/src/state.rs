//! Job state machine types

use std::fmt;

use kameo_macros::Reply;

/// States of one scheduled job
///
/// `Idle -> Armed -> Firing -> Armed -> ... -> Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reply)]
pub enum JobState {
    /// Registered, scheduler not started
    Idle,
    /// Waiting for its next due time
    Armed,
    /// Action running
    Firing,
    /// No further fires will be accepted
    Stopped,
}

impl JobState {
    /// Check whether `self -> next` is a legal transition
    ///
    /// A firing job cannot stop directly: it finishes its action and re-arms
    /// first.
    #[must_use]
    pub fn can_transition_to(self, next: JobState) -> bool {
        matches!(
            (self, next),
            (JobState::Idle, JobState::Armed | JobState::Stopped)
                | (JobState::Armed, JobState::Firing | JobState::Stopped)
                | (JobState::Firing, JobState::Armed)
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Idle => write!(f, "idle"),
            JobState::Armed => write!(f, "armed"),
            JobState::Firing => write!(f, "firing"),
            JobState::Stopped => write!(f, "stopped"),
        }
    }
}
