use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::SchedulerError;
use crate::schedule::JobKey;

/// Per-fire context handed to a job.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub job: JobKey,
    pub fire_id: Uuid,
    pub fired_at: DateTime<Utc>,
    shutdown: CancellationToken,
}

impl JobContext {
    pub fn new(job: JobKey, fire_id: Uuid, shutdown: CancellationToken) -> Self {
        Self {
            job,
            fire_id,
            fired_at: Utc::now(),
            shutdown,
        }
    }

    /// True once the owning scheduler has begun shutting down.
    ///
    /// Running jobs are never aborted; long jobs may poll this to finish early.
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Resolves when the owning scheduler begins shutting down.
    pub async fn shutdown_requested(&self) {
        self.shutdown.cancelled().await;
    }
}

/// A unit of work executed once per trigger fire.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    async fn execute(&self, ctx: &JobContext) -> anyhow::Result<()>;
}

/// Produces a fresh job instance for each fire.
pub trait JobFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns [`SchedulerError::CannotInstantiateJob`] if `job_type` is unknown.
    fn create_job(&self, job_type: &str) -> Result<Box<dyn ScheduledJob>, SchedulerError>;
}
