//! Shared configuration and job definitions for cronhost.
//!
//! Loads process configuration from environment variables and the declarative
//! list of scheduled jobs from a YAML file.

pub mod app_config;
pub mod config;
pub mod error;
pub mod jobs;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use jobs::{load_jobs, parse_jobs, JobOptions, JobsFile};
