use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;

/// Errors raised while wiring, starting, or driving a scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A required constructor input was absent. `parameter` is the name
    /// callers know it by (`jobFactory`, `schedulerFactory`, `jobOptions`).
    #[error("missing dependency: value cannot be absent (parameter '{parameter}')")]
    MissingDependency { parameter: &'static str },

    #[error("duplicate job: '{name}' is defined more than once")]
    DuplicateJob { name: String },

    #[error("invalid schedule for job '{job}': '{expression}': {reason}")]
    InvalidSchedule {
        job: String,
        expression: String,
        reason: String,
    },

    #[error("cannot instantiate job of type '{job_type}'")]
    CannotInstantiateJob { job_type: String },

    #[error("no job factory assigned to the scheduler")]
    JobFactoryNotSet,

    #[error("scheduler has already been started")]
    AlreadyStarted,

    #[error("scheduler has been shut down")]
    ShutDown,

    #[error("scheduler engine error: {0}")]
    Engine(String),
}

impl From<JobSchedulerError> for SchedulerError {
    fn from(err: JobSchedulerError) -> Self {
        Self::Engine(err.to_string())
    }
}
