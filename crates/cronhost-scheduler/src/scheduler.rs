use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SchedulerError;
use crate::job::JobFactory;
use crate::schedule::{JobDetail, Trigger};

/// A scheduling engine instance: holds registrations and dispatches fires on
/// its own workers.
///
/// Callers must not invoke any method after [`Scheduler::shutdown`].
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Assign the factory used to instantiate jobs on each fire.
    fn set_job_factory(&mut self, factory: Arc<dyn JobFactory>);

    /// Register a job with its trigger.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::DuplicateJob`] if the key is already registered,
    /// [`SchedulerError::InvalidSchedule`] if the engine rejects the trigger.
    async fn schedule_job(&mut self, detail: JobDetail, trigger: Trigger)
        -> Result<(), SchedulerError>;

    /// Begin firing triggers.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Engine`] if the engine fails to start.
    async fn start(&mut self) -> Result<(), SchedulerError>;

    /// Stop firing triggers. With `wait_for_jobs_to_complete`, returns only
    /// after in-flight executions have finished.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Engine`] if the engine fails to shut down.
    async fn shutdown(&mut self, wait_for_jobs_to_complete: bool) -> Result<(), SchedulerError>;
}

/// Source of scheduler instances.
#[async_trait]
pub trait SchedulerFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns [`SchedulerError::Engine`] if the engine cannot be initialised.
    async fn get_scheduler(&self) -> Result<Box<dyn Scheduler>, SchedulerError>;
}
