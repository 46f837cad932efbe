//! Startup recovery sweep.
//!
//! In-memory queues do not survive a restart, so every persisted
//! non-terminal job is re-enqueued. A transition that already holds a remote
//! job-set id goes straight to the poll queue and is never resubmitted;
//! everything else is retried from scratch, relying on handler idempotency
//! (proxy existence checks, the submit-path job-set-id check).

use tracing::info;

use vedit_models::JobType;

use crate::context::ProcessingContext;
use crate::error::WorkerResult;

/// Re-enqueue unfinished jobs. Returns (work, poll) counts.
pub async fn recover_jobs(ctx: &ProcessingContext) -> WorkerResult<(usize, usize)> {
    let unfinished = ctx.jobs.list_unfinished_jobs().await?;

    let mut to_work = 0;
    let mut to_poll = 0;
    for job in unfinished {
        let has_remote = job.remote_job_id.is_some()
            || job
                .payload
                .get("hailuo_job_set_id")
                .and_then(|v| v.as_str())
                .is_some();
        if job.job_type == JobType::HailuoTransition && has_remote {
            info!(
                "Recovering waiting transition {} to the poll queue",
                job.id
            );
            ctx.poll_queue.enqueue(job.id)?;
            to_poll += 1;
        } else {
            info!("Recovering job {} ({}) to the work queue", job.id, job.job_type);
            ctx.work_queue.enqueue(job.id)?;
            to_work += 1;
        }
    }

    info!(
        "Recovery sweep re-enqueued {} work and {} poll jobs",
        to_work, to_poll
    );
    Ok((to_work, to_poll))
}
