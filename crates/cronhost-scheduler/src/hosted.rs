//! Process-lifecycle adapter around a [`Scheduler`].

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use cronhost_core::JobOptions;
use tokio::sync::Mutex;

use crate::error::SchedulerError;
use crate::job::JobFactory;
use crate::schedule::{JobDetail, JobKey, Schedule, Trigger};
use crate::scheduler::{Scheduler, SchedulerFactory};

/// A unit with start/stop hooks driven by the process supervisor.
#[async_trait]
pub trait HostedService: Send + Sync {
    fn name(&self) -> &str;

    /// Called once at process startup. An error aborts startup.
    async fn on_start(&self) -> anyhow::Result<()>;

    /// Called once on graceful shutdown. Must not fail.
    async fn on_stop(&self);
}

enum Lifecycle {
    Idle,
    Running(Box<dyn Scheduler>),
    Stopped,
}

/// Starts a scheduler with the configured jobs when the process starts, and
/// shuts it down when the process stops.
pub struct SchedulerHostedService {
    job_factory: Arc<dyn JobFactory>,
    scheduler_factory: Arc<dyn SchedulerFactory>,
    job_options: Vec<JobOptions>,
    wait_for_jobs_to_complete: bool,
    state: Mutex<Lifecycle>,
}

impl SchedulerHostedService {
    /// Store the three dependencies. Nothing is created or started yet.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::MissingDependency`] naming the first absent
    /// input: `jobFactory`, `schedulerFactory`, then `jobOptions`.
    pub fn new(
        job_factory: Option<Arc<dyn JobFactory>>,
        scheduler_factory: Option<Arc<dyn SchedulerFactory>>,
        job_options: Option<Vec<JobOptions>>,
    ) -> Result<Self, SchedulerError> {
        let job_factory = job_factory.ok_or(SchedulerError::MissingDependency {
            parameter: "jobFactory",
        })?;
        let scheduler_factory = scheduler_factory.ok_or(SchedulerError::MissingDependency {
            parameter: "schedulerFactory",
        })?;
        let job_options = job_options.ok_or(SchedulerError::MissingDependency {
            parameter: "jobOptions",
        })?;

        Ok(Self {
            job_factory,
            scheduler_factory,
            job_options,
            wait_for_jobs_to_complete: true,
            state: Mutex::new(Lifecycle::Idle),
        })
    }

    #[must_use]
    pub fn builder() -> SchedulerHostedServiceBuilder {
        SchedulerHostedServiceBuilder::default()
    }

    #[must_use]
    pub fn job_options(&self) -> &[JobOptions] {
        &self.job_options
    }

    /// Check the job batch the way [`start`](Self::start) would, without
    /// touching a scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::DuplicateJob`] or [`SchedulerError::InvalidSchedule`].
    pub fn validate(&self) -> Result<(), SchedulerError> {
        plan_registrations(&self.job_options).map(|_| ())
    }

    pub async fn is_running(&self) -> bool {
        matches!(*self.state.lock().await, Lifecycle::Running(_))
    }

    /// Obtain a scheduler, register every job, and start it.
    ///
    /// The whole batch is validated before any scheduler is obtained, so a bad
    /// entry registers nothing.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::DuplicateJob`] if two entries share a name.
    /// - [`SchedulerError::InvalidSchedule`] if a trigger expression does not parse.
    /// - [`SchedulerError::AlreadyStarted`] if called more than once.
    /// - Any error from the scheduler factory or the scheduler itself.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let mut state = self.state.lock().await;
        if !matches!(*state, Lifecycle::Idle) {
            return Err(SchedulerError::AlreadyStarted);
        }

        let registrations = plan_registrations(&self.job_options)?;
        let mut scheduler = self.scheduler_factory.get_scheduler().await?;
        scheduler.set_job_factory(Arc::clone(&self.job_factory));

        if let Err(e) = register_and_start(scheduler.as_mut(), registrations).await {
            if let Err(cleanup) = scheduler.shutdown(false).await {
                tracing::warn!(error = %cleanup, "scheduler: cleanup after failed start also failed");
            }
            return Err(e);
        }

        tracing::info!(
            jobs = self.job_options.len(),
            "scheduler: started with registered jobs"
        );
        *state = Lifecycle::Running(scheduler);
        Ok(())
    }

    /// Shut the scheduler down. A no-op if it was never started or is
    /// already stopped. Shutdown failures are logged, not returned.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        let mut scheduler = match std::mem::replace(&mut *state, Lifecycle::Stopped) {
            Lifecycle::Running(scheduler) => scheduler,
            idle_or_stopped => {
                *state = idle_or_stopped;
                tracing::debug!("scheduler: stop requested but nothing is running");
                return;
            }
        };

        tracing::info!(
            wait_for_jobs = self.wait_for_jobs_to_complete,
            "scheduler: shutting down"
        );
        match scheduler.shutdown(self.wait_for_jobs_to_complete).await {
            Ok(()) => tracing::info!("scheduler: shutdown complete"),
            Err(e) => tracing::warn!(error = %e, "scheduler: shutdown failed"),
        }
    }
}

impl std::fmt::Debug for SchedulerHostedService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHostedService")
            .field("job_options", &self.job_options)
            .field("wait_for_jobs_to_complete", &self.wait_for_jobs_to_complete)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl HostedService for SchedulerHostedService {
    fn name(&self) -> &str {
        "scheduler"
    }

    async fn on_start(&self) -> anyhow::Result<()> {
        self.start().await?;
        Ok(())
    }

    async fn on_stop(&self) {
        self.stop().await;
    }
}

async fn register_and_start(
    scheduler: &mut dyn Scheduler,
    registrations: Vec<(JobDetail, Trigger)>,
) -> Result<(), SchedulerError> {
    for (detail, trigger) in registrations {
        tracing::debug!(
            job = %detail.key,
            job_type = %detail.job_type,
            schedule = %trigger.expression,
            "scheduler: registering job"
        );
        scheduler.schedule_job(detail, trigger).await?;
    }
    scheduler.start().await
}

/// Turn job options into job/trigger pairs, in order, rejecting the batch on
/// the first duplicate name or unparseable schedule.
fn plan_registrations(options: &[JobOptions]) -> Result<Vec<(JobDetail, Trigger)>, SchedulerError> {
    let mut seen = HashSet::with_capacity(options.len());
    let mut planned = Vec::with_capacity(options.len());

    for opt in options {
        if !seen.insert(opt.name.as_str()) {
            return Err(SchedulerError::DuplicateJob {
                name: opt.name.clone(),
            });
        }

        let schedule = opt.schedule.parse::<Schedule>().map_err(|e| {
            SchedulerError::InvalidSchedule {
                job: opt.name.clone(),
                expression: opt.schedule.clone(),
                reason: e.to_string(),
            }
        })?;

        let key = JobKey::new(opt.name.clone());
        planned.push((
            JobDetail {
                key: key.clone(),
                job_type: opt.job_type.clone(),
            },
            Trigger {
                key,
                expression: opt.schedule.clone(),
                schedule,
            },
        ));
    }

    Ok(planned)
}

/// Accumulates the adapter's inputs; [`build`](Self::build) applies the same
/// missing-dependency checks as [`SchedulerHostedService::new`].
pub struct SchedulerHostedServiceBuilder {
    job_factory: Option<Arc<dyn JobFactory>>,
    scheduler_factory: Option<Arc<dyn SchedulerFactory>>,
    job_options: Option<Vec<JobOptions>>,
    wait_for_jobs_to_complete: bool,
}

impl Default for SchedulerHostedServiceBuilder {
    fn default() -> Self {
        Self {
            job_factory: None,
            scheduler_factory: None,
            job_options: None,
            wait_for_jobs_to_complete: true,
        }
    }
}

impl SchedulerHostedServiceBuilder {
    #[must_use]
    pub fn job_factory(mut self, factory: Arc<dyn JobFactory>) -> Self {
        self.job_factory = Some(factory);
        self
    }

    #[must_use]
    pub fn scheduler_factory(mut self, factory: Arc<dyn SchedulerFactory>) -> Self {
        self.scheduler_factory = Some(factory);
        self
    }

    #[must_use]
    pub fn job_options(mut self, options: Vec<JobOptions>) -> Self {
        self.job_options = Some(options);
        self
    }

    #[must_use]
    pub fn wait_for_jobs_to_complete(mut self, wait: bool) -> Self {
        self.wait_for_jobs_to_complete = wait;
        self
    }

    /// # Errors
    ///
    /// Returns [`SchedulerError::MissingDependency`] if an input was never set.
    pub fn build(self) -> Result<SchedulerHostedService, SchedulerError> {
        let mut service =
            SchedulerHostedService::new(self.job_factory, self.scheduler_factory, self.job_options)?;
        service.wait_for_jobs_to_complete = self.wait_for_jobs_to_complete;
        Ok(service)
    }
}
