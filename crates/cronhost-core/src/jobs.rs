use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One schedulable unit: which job to run and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOptions {
    /// Logical identifier, unique within the job set.
    pub name: String,
    /// Key the job factory resolves into an executable job.
    pub job_type: String,
    /// Trigger expression: a six-field cron expression or `@every <n><unit>`.
    pub schedule: String,
}

impl JobOptions {
    pub fn new(
        name: impl Into<String>,
        job_type: impl Into<String>,
        schedule: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            job_type: job_type.into(),
            schedule: schedule.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct JobsFile {
    #[serde(default)]
    pub jobs: Vec<JobOptions>,
}

/// Load the job definitions from a YAML file.
///
/// Only field-level checks happen here. Name uniqueness and schedule syntax
/// are enforced when the scheduler service starts.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or has empty fields.
pub fn load_jobs(path: &Path) -> Result<Vec<JobOptions>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::JobsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_jobs(&content)
}

/// Parse job definitions from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text is not valid YAML or a field is empty.
pub fn parse_jobs(content: &str) -> Result<Vec<JobOptions>, ConfigError> {
    let jobs_file: JobsFile = serde_yaml::from_str(content)?;
    validate_jobs(&jobs_file.jobs)?;
    Ok(jobs_file.jobs)
}

fn validate_jobs(jobs: &[JobOptions]) -> Result<(), ConfigError> {
    for (idx, job) in jobs.iter().enumerate() {
        if job.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "job #{idx} has an empty name"
            )));
        }
        if job.job_type.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "job '{}' has an empty job_type",
                job.name
            )));
        }
        if job.schedule.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "job '{}' has an empty schedule",
                job.name
            )));
        }
    }

    Ok(())
}
