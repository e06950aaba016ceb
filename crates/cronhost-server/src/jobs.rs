//! Job types this server knows how to run.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cronhost_scheduler::{JobContext, JobRegistry, ScheduledJob};

pub const HEARTBEAT: &str = "heartbeat";
pub const UPTIME_REPORT: &str = "uptime_report";

/// Registry of built-in job types. `started_at` anchors uptime reports.
pub fn builtin_registry(started_at: DateTime<Utc>) -> JobRegistry {
    JobRegistry::new()
        .with(HEARTBEAT, || Heartbeat)
        .with(UPTIME_REPORT, move || UptimeReport { started_at })
}

/// Logs a liveness line on every fire.
pub struct Heartbeat;

#[async_trait]
impl ScheduledJob for Heartbeat {
    async fn execute(&self, ctx: &JobContext) -> anyhow::Result<()> {
        tracing::info!(job = %ctx.job, fire_id = %ctx.fire_id, "heartbeat: alive");
        Ok(())
    }
}

/// Logs how long the process has been up.
pub struct UptimeReport {
    started_at: DateTime<Utc>,
}

impl UptimeReport {
    fn uptime_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_seconds().max(0)
    }
}

#[async_trait]
impl ScheduledJob for UptimeReport {
    async fn execute(&self, ctx: &JobContext) -> anyhow::Result<()> {
        tracing::info!(
            job = %ctx.job,
            uptime_secs = self.uptime_secs(ctx.fired_at),
            "uptime_report: process uptime"
        );
        Ok(())
    }
}
