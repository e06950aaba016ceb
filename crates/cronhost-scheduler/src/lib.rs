//! Hosted job scheduling for cronhost.
//!
//! [`SchedulerHostedService`] bridges a process's start/stop hooks to a
//! scheduler obtained from a [`SchedulerFactory`], registering one job and
//! trigger per [`JobOptions`] entry. The scheduling engine is pluggable; the
//! production backend is [`CronSchedulerFactory`] over `tokio-cron-scheduler`.

pub mod cron_backend;
pub mod error;
pub mod hosted;
pub mod job;
pub mod registry;
pub mod schedule;
pub mod scheduler;

pub use cron_backend::{CronScheduler, CronSchedulerFactory};
pub use cronhost_core::JobOptions;
pub use error::SchedulerError;
pub use hosted::{HostedService, SchedulerHostedService, SchedulerHostedServiceBuilder};
pub use job::{JobContext, JobFactory, ScheduledJob};
pub use registry::JobRegistry;
pub use schedule::{JobDetail, JobKey, Schedule, ScheduleError, Trigger};
pub use scheduler::{Scheduler, SchedulerFactory};
