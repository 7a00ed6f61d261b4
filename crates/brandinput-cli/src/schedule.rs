//! Weekday scheduling of the batch run.

use std::sync::Arc;

use brandinput_core::AppConfig;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::runner;

/// Registers the run on `config.schedule_cron` (UTC) and blocks until Ctrl-C.
///
/// A failed run is logged; the scheduler keeps going and tries again at the
/// next slot.
pub(crate) async fn run_scheduler(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let mut scheduler = JobScheduler::new().await?;

    let cron = config.schedule_cron.clone();
    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let config = Arc::clone(&config);
        Box::pin(async move {
            tracing::info!("scheduler: starting run");
            if let Err(e) = runner::run_once(&config, false).await {
                tracing::error!(error = %format!("{e:#}"), "scheduler: run failed");
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    tracing::info!(cron = %cron, "scheduler started");

    tokio::signal::ctrl_c().await?;
    tracing::info!("received shutdown signal, stopping scheduler");
    scheduler.shutdown().await?;
    Ok(())
}
