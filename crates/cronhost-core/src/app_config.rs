use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub jobs_path: PathBuf,
    /// Whether shutdown waits for in-flight job executions to finish.
    pub wait_for_jobs_on_shutdown: bool,
    /// Upper bound on the shutdown drain, in seconds. `0` waits indefinitely.
    pub shutdown_timeout_secs: u64,
}

impl AppConfig {
    /// The drain bound as a [`std::time::Duration`], or `None` when unbounded.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Option<std::time::Duration> {
        (self.shutdown_timeout_secs > 0)
            .then(|| std::time::Duration::from_secs(self.shutdown_timeout_secs))
    }
}
