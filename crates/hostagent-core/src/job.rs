//! Job definitions

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Error returned by a job action; logged and swallowed by the scheduler
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Unit of work run on every fire
#[async_trait]
pub trait JobAction: Send + Sync + 'static {
    async fn run(&self) -> Result<(), ActionError>;
}

/// Adapts an async closure into a [`JobAction`]
pub struct FnAction<F>(pub F);

#[async_trait]
impl<F, Fut> JobAction for FnAction<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
{
    async fn run(&self) -> Result<(), ActionError> {
        (self.0)().await
    }
}

/// Job identity, unique within one scheduler
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// A named action bound to a fixed period
///
/// Immutable once built. The period is always positive.
#[derive(Clone)]
pub struct Job {
    id: JobId,
    period: Duration,
    delta: TimeDelta,
    action: Arc<dyn JobAction>,
}

impl Job {
    /// Create a job
    ///
    /// # Errors
    /// Returns `CoreError::EmptyJobName` for an empty name and
    /// `CoreError::InvalidPeriod` for a zero period or one too large to add
    /// to a timestamp.
    pub fn new(
        name: impl Into<String>,
        period: Duration,
        action: Arc<dyn JobAction>,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::EmptyJobName);
        }

        let invalid = || CoreError::InvalidPeriod {
            job: name.clone(),
            period,
        };
        if period.is_zero() {
            return Err(invalid());
        }
        let delta = TimeDelta::from_std(period).map_err(|_| invalid())?;

        Ok(Self {
            id: JobId(name),
            period,
            delta,
            action,
        })
    }

    /// Create a job from an async closure
    ///
    /// # Errors
    /// Same as [`Job::new`].
    pub fn from_fn<F, Fut>(
        name: impl Into<String>,
        period: Duration,
        action: F,
    ) -> Result<Self, CoreError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        Self::new(name, period, Arc::new(FnAction(action)))
    }

    #[must_use]
    pub fn id(&self) -> &JobId {
        &self.id
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Period as a wall-clock offset
    #[must_use]
    pub fn period_delta(&self) -> TimeDelta {
        self.delta
    }

    #[must_use]
    pub fn action(&self) -> Arc<dyn JobAction> {
        Arc::clone(&self.action)
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn noop() -> Result<(), ActionError> {
        Ok(())
    }

    #[test]
    fn test_zero_period_rejected() {
        let err = Job::from_fn("collect", Duration::ZERO, noop).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPeriod { ref job, .. } if job == "collect"));
    }

    #[test]
    fn test_huge_period_rejected() {
        let err = Job::from_fn("collect", Duration::MAX, noop).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPeriod { .. }));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = Job::from_fn("", Duration::from_secs(1), noop).unwrap_err();
        assert!(matches!(err, CoreError::EmptyJobName));
    }

    #[test]
    fn test_period_delta() {
        let job = Job::from_fn("collect", Duration::from_secs(3600), noop).unwrap();
        assert_eq!(job.id().as_str(), "collect");
        assert_eq!(job.period_delta(), TimeDelta::hours(1));
    }

    #[tokio::test]
    async fn test_fn_action_runs() {
        let job = Job::from_fn("collect", Duration::from_secs(1), || async {
            Err::<(), ActionError>("boom".into())
        })
        .unwrap();

        let err = job.action().run().await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
