use std::collections::HashMap;
use std::sync::Arc;

use crate::error::SchedulerError;
use crate::job::{JobFactory, ScheduledJob};

type JobConstructor = Arc<dyn Fn() -> Box<dyn ScheduledJob> + Send + Sync>;

/// A [`JobFactory`] backed by a table of named constructors.
#[derive(Clone, Default)]
pub struct JobRegistry {
    constructors: HashMap<String, JobConstructor>,
}

impl JobRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `constructor` under `job_type`, replacing any previous entry.
    pub fn register<F, J>(&mut self, job_type: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn() -> J + Send + Sync + 'static,
        J: ScheduledJob + 'static,
    {
        let job_type = job_type.into();
        let constructor: JobConstructor =
            Arc::new(move || -> Box<dyn ScheduledJob> { Box::new(constructor()) });
        if self.constructors.insert(job_type.clone(), constructor).is_some() {
            tracing::warn!(job_type = %job_type, "registry: replaced existing job type");
        }
        self
    }

    /// Builder-style [`JobRegistry::register`].
    #[must_use]
    pub fn with<F, J>(mut self, job_type: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> J + Send + Sync + 'static,
        J: ScheduledJob + 'static,
    {
        self.register(job_type, constructor);
        self
    }

    #[must_use]
    pub fn contains(&self, job_type: &str) -> bool {
        self.constructors.contains_key(job_type)
    }

    /// Registered job types, sorted.
    #[must_use]
    pub fn job_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl std::fmt::Debug for JobRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRegistry")
            .field("job_types", &self.job_types())
            .finish()
    }
}

impl JobFactory for JobRegistry {
    fn create_job(&self, job_type: &str) -> Result<Box<dyn ScheduledJob>, SchedulerError> {
        self.constructors
            .get(job_type)
            .map(|construct| construct())
            .ok_or_else(|| SchedulerError::CannotInstantiateJob {
                job_type: job_type.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;
    use uuid::Uuid;

    use super::*;
    use crate::job::JobContext;
    use crate::schedule::JobKey;

    struct Echo(&'static str);

    #[async_trait]
    impl ScheduledJob for Echo {
        async fn execute(&self, _ctx: &JobContext) -> anyhow::Result<()> {
            anyhow::ensure!(!self.0.is_empty(), "empty echo");
            Ok(())
        }
    }

    fn ctx() -> JobContext {
        JobContext::new(JobKey::new("t"), Uuid::new_v4(), CancellationToken::new())
    }

    #[tokio::test]
    async fn create_job_resolves_registered_type() {
        let registry = JobRegistry::new().with("echo", || Echo("hi"));
        let job = registry.create_job("echo").expect("registered");
        job.execute(&ctx()).await.expect("runs");
    }

    #[test]
    fn create_job_rejects_unknown_type() {
        let registry = JobRegistry::new().with("echo", || Echo("hi"));
        let err = registry.create_job("missing").err().expect("unknown type");
        assert!(
            matches!(err, SchedulerError::CannotInstantiateJob { ref job_type } if job_type == "missing")
        );
    }

    #[test]
    fn create_job_builds_a_fresh_instance_each_call() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let registry = JobRegistry::new().with("echo", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Echo("hi")
        });

        registry.create_job("echo").expect("first");
        registry.create_job("echo").expect("second");
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn job_types_are_sorted() {
        let registry = JobRegistry::new()
            .with("zeta", || Echo("z"))
            .with("alpha", || Echo("a"));
        assert_eq!(registry.job_types(), vec!["alpha", "zeta"]);
        assert!(registry.contains("alpha"));
        assert!(!registry.contains("beta"));
    }
}
