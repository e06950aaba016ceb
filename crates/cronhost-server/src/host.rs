//! Process lifecycle supervisor for hosted services.

use std::sync::Arc;

use anyhow::Context;
use cronhost_scheduler::HostedService;

/// Starts hosted services in registration order and stops them in reverse.
#[derive(Default)]
pub struct Host {
    services: Vec<Arc<dyn HostedService>>,
    started: usize,
}

impl Host {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, service: Arc<dyn HostedService>) -> &mut Self {
        self.services.push(service);
        self
    }

    /// Start every service in order.
    ///
    /// If one fails, the services already started are stopped in reverse
    /// order before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the first service's start error, annotated with its name.
    pub async fn start_all(&mut self) -> anyhow::Result<()> {
        while self.started < self.services.len() {
            let service = Arc::clone(&self.services[self.started]);
            tracing::info!(service = service.name(), "host: starting service");
            if let Err(e) = service.on_start().await {
                tracing::error!(service = service.name(), error = %e, "host: service failed to start");
                self.stop_all().await;
                return Err(e).with_context(|| format!("failed to start service '{}'", service.name()));
            }
            self.started += 1;
        }
        tracing::info!(services = self.started, "host: all services started");
        Ok(())
    }

    /// Stop every started service, last started first.
    pub async fn stop_all(&mut self) {
        while self.started > 0 {
            self.started -= 1;
            let service = &self.services[self.started];
            tracing::info!(service = service.name(), "host: stopping service");
            service.on_stop().await;
        }
    }
}
