mod api;
mod host;
mod jobs;
mod middleware;

use std::sync::Arc;

use clap::Parser;
use cronhost_scheduler::{CronSchedulerFactory, JobRegistry, SchedulerHostedService};
use tracing_subscriber::EnvFilter;

use crate::host::Host;

#[derive(Debug, Parser)]
#[command(name = "cronhost-server")]
#[command(about = "Runs scheduled background jobs alongside a health endpoint")]
struct Cli {
    /// Validate configuration and job definitions, then exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = cronhost_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let job_options = cronhost_core::load_jobs(&config.jobs_path)?;
    let registry = Arc::new(jobs::builtin_registry(chrono::Utc::now()));
    let scheduler_factory =
        CronSchedulerFactory::new().with_drain_timeout(config.shutdown_timeout());

    let scheduler = SchedulerHostedService::builder()
        .job_factory(registry.clone())
        .scheduler_factory(Arc::new(scheduler_factory))
        .job_options(job_options)
        .wait_for_jobs_to_complete(config.wait_for_jobs_on_shutdown)
        .build()?;

    if cli.check {
        check_jobs(&scheduler, &registry)?;
        tracing::info!(
            jobs = scheduler.job_options().len(),
            path = %config.jobs_path.display(),
            "check: job definitions are valid"
        );
        return Ok(());
    }

    let mut host = Host::new();
    host.add(Arc::new(scheduler));
    host.start_all().await?;

    tracing::info!(env = %config.env, "host: services running");
    let served = serve(config.bind_addr).await;
    host.stop_all().await;
    served
}

async fn serve(addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "host: listening");
    axum::serve(listener, api::build_app())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Fail if the batch would not start, or names a job type nobody can build.
fn check_jobs(scheduler: &SchedulerHostedService, registry: &JobRegistry) -> anyhow::Result<()> {
    scheduler.validate()?;
    if let Some(unknown) = scheduler
        .job_options()
        .iter()
        .find(|job| !registry.contains(&job.job_type))
    {
        anyhow::bail!(
            "job '{}' uses unknown job_type '{}'; known types: {}",
            unknown.name,
            unknown.job_type,
            registry.job_types().join(", ")
        );
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
