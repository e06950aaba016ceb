//! [`Scheduler`] implementation over `tokio-cron-scheduler`.
//!
//! The engine owns trigger evaluation and dispatch. This layer adds what the
//! engine lacks: per-fire job instantiation through a [`JobFactory`], a
//! duplicate-key check, and a shutdown that can wait for in-flight runs.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

use crate::error::SchedulerError;
use crate::job::{JobContext, JobFactory};
use crate::schedule::{JobDetail, JobKey, Schedule, Trigger};
use crate::scheduler::{Scheduler, SchedulerFactory};

type JobRun = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Creates a fresh [`CronScheduler`] per call.
#[derive(Debug, Clone, Default)]
pub struct CronSchedulerFactory {
    drain_timeout: Option<Duration>,
}

impl CronSchedulerFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound how long a waiting shutdown blocks on in-flight jobs.
    /// `None` waits until every run has finished.
    #[must_use]
    pub fn with_drain_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.drain_timeout = timeout;
        self
    }
}

#[async_trait]
impl SchedulerFactory for CronSchedulerFactory {
    async fn get_scheduler(&self) -> Result<Box<dyn Scheduler>, SchedulerError> {
        let engine = JobScheduler::new().await?;
        Ok(Box::new(CronScheduler::new(engine, self.drain_timeout)))
    }
}

pub struct CronScheduler {
    engine: JobScheduler,
    job_factory: Option<Arc<dyn JobFactory>>,
    registered: HashMap<JobKey, Uuid>,
    in_flight: TaskTracker,
    shutdown: CancellationToken,
    drain_timeout: Option<Duration>,
    shut_down: bool,
}

impl CronScheduler {
    #[must_use]
    pub fn new(engine: JobScheduler, drain_timeout: Option<Duration>) -> Self {
        Self {
            engine,
            job_factory: None,
            registered: HashMap::new(),
            in_flight: TaskTracker::new(),
            shutdown: CancellationToken::new(),
            drain_timeout,
            shut_down: false,
        }
    }

    /// Number of registered jobs.
    #[must_use]
    pub fn job_count(&self) -> usize {
        self.registered.len()
    }

    /// Number of job executions currently running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    async fn drain(&self) {
        let pending = self.in_flight.len();
        if pending > 0 {
            tracing::info!(pending, "scheduler: waiting for in-flight jobs");
        }

        match self.drain_timeout {
            Some(limit) => {
                if tokio::time::timeout(limit, self.in_flight.wait())
                    .await
                    .is_err()
                {
                    tracing::warn!(
                        remaining = self.in_flight.len(),
                        timeout_secs = limit.as_secs(),
                        "scheduler: drain timed out; leaving jobs running"
                    );
                }
            }
            None => self.in_flight.wait().await,
        }
    }
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("registered", &self.registered.keys().collect::<Vec<_>>())
            .field("in_flight", &self.in_flight.len())
            .field("shut_down", &self.shut_down)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Scheduler for CronScheduler {
    fn set_job_factory(&mut self, factory: Arc<dyn JobFactory>) {
        self.job_factory = Some(factory);
    }

    async fn schedule_job(
        &mut self,
        detail: JobDetail,
        trigger: Trigger,
    ) -> Result<(), SchedulerError> {
        if self.shut_down {
            return Err(SchedulerError::ShutDown);
        }
        let factory = self
            .job_factory
            .clone()
            .ok_or(SchedulerError::JobFactoryNotSet)?;
        if self.registered.contains_key(&detail.key) {
            return Err(SchedulerError::DuplicateJob {
                name: detail.key.to_string(),
            });
        }

        let key = detail.key.clone();
        let job_type: Arc<str> = detail.job_type.into();
        let tracker = self.in_flight.clone();
        let shutdown = self.shutdown.clone();

        let run = move |fire_id: Uuid, _engine: JobScheduler| -> JobRun {
            let ctx = JobContext::new(key.clone(), fire_id, shutdown.clone());
            let factory = Arc::clone(&factory);
            let job_type = Arc::clone(&job_type);
            Box::pin(tracker.track_future(async move {
                if ctx.is_shutting_down() {
                    tracing::debug!(job = %ctx.job, "scheduler: skipping fire during shutdown");
                    return;
                }
                run_once(factory.as_ref(), &job_type, ctx).await;
            }))
        };

        let job = match &trigger.schedule {
            Schedule::Cron(expr) => Job::new_async(expr.as_str(), run),
            Schedule::Interval(every) => Job::new_repeated_async(*every, run),
        }
        .map_err(|e| SchedulerError::InvalidSchedule {
            job: detail.key.to_string(),
            expression: trigger.expression.clone(),
            reason: e.to_string(),
        })?;

        let id = self.engine.add(job).await?;
        tracing::info!(
            job = %detail.key,
            schedule = %trigger.expression,
            "scheduler: registered job"
        );
        self.registered.insert(detail.key, id);
        Ok(())
    }

    async fn start(&mut self) -> Result<(), SchedulerError> {
        if self.shut_down {
            return Err(SchedulerError::ShutDown);
        }
        self.engine.start().await?;
        Ok(())
    }

    async fn shutdown(&mut self, wait_for_jobs_to_complete: bool) -> Result<(), SchedulerError> {
        if self.shut_down {
            return Ok(());
        }
        self.shut_down = true;

        // Fires that begin from here on return without running.
        self.shutdown.cancel();
        let stopped = self.engine.shutdown().await;
        self.in_flight.close();

        if wait_for_jobs_to_complete {
            self.drain().await;
        }

        stopped.map_err(Into::into)
    }
}

/// Instantiate and execute one job. Failures are logged and go no further.
async fn run_once(factory: &dyn JobFactory, job_type: &str, ctx: JobContext) {
    let job = match factory.create_job(job_type) {
        Ok(job) => job,
        Err(e) => {
            tracing::error!(job = %ctx.job, job_type, error = %e, "scheduler: job not executed");
            return;
        }
    };

    tracing::debug!(job = %ctx.job, fire_id = %ctx.fire_id, "scheduler: job fired");
    let started = Instant::now();
    let result = job.execute(&ctx).await;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match result {
        Ok(()) => tracing::info!(job = %ctx.job, elapsed_ms, "scheduler: job completed"),
        Err(e) => tracing::error!(job = %ctx.job, elapsed_ms, error = %e, "scheduler: job failed"),
    }
}
