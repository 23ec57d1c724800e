//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! Alert checks run on two schedules:
//! - every 30 minutes: disease outbreaks and severe malnutrition
//! - every hour: capacity, vaccination coverage and document expiry
//!
//! Each check logs its own failure; one failing check never stops the others.

use std::sync::Arc;

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::alerts::{run_frequent_checks, run_hourly_checks};
use crate::kernel::ServerDeps;

/// Start all scheduled tasks
pub async fn start_scheduler(deps: Arc<ServerDeps>) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let frequent_deps = deps.clone();
    let frequent_job = Job::new_async("0 */30 * * * *", move |_uuid, _lock| {
        let deps = frequent_deps.clone();
        Box::pin(async move {
            let report = run_frequent_checks(&deps).await;
            tracing::debug!(created = report.total_created(), "Frequent alert checks done");
        })
    })?;

    scheduler.add(frequent_job).await?;

    let hourly_deps = deps.clone();
    let hourly_job = Job::new_async("0 0 * * * *", move |_uuid, _lock| {
        let deps = hourly_deps.clone();
        Box::pin(async move {
            let report = run_hourly_checks(&deps).await;
            tracing::debug!(created = report.total_created(), "Hourly alert checks done");
        })
    })?;

    scheduler.add(hourly_job).await?;
    scheduler.start().await?;

    tracing::info!("Scheduled tasks started (alert checks every 30 minutes and every hour)");
    Ok(scheduler)
}
