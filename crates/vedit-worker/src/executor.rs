//! Worker and poll pools plus the per-job dispatch routine.

use std::sync::Arc;

use metrics::counter;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use vedit_models::{FailureLog, JobId, JobPayload, JobStatus};
use vedit_queue::JobQueue;
use vedit_store::JobPatch;

use crate::context::ProcessingContext;
use crate::error::WorkerResult;
use crate::handlers;

/// The two consumer pools over the shared context.
pub struct WorkerPool {
    ctx: Arc<ProcessingContext>,
}

impl WorkerPool {
    pub fn new(ctx: Arc<ProcessingContext>) -> Self {
        Self { ctx }
    }

    /// Run both pools until shutdown is signalled or the queues close.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) {
        let mut handles = Vec::new();
        for index in 0..self.ctx.config.worker_threads {
            handles.push(tokio::spawn(consume_loop(
                self.ctx.clone(),
                self.ctx.work_queue.clone(),
                shutdown.clone(),
                index,
            )));
        }
        for index in 0..self.ctx.config.poll_worker_threads {
            handles.push(tokio::spawn(consume_loop(
                self.ctx.clone(),
                self.ctx.poll_queue.clone(),
                shutdown.clone(),
                index,
            )));
        }
        for handle in handles {
            handle.await.ok();
        }
    }
}

async fn consume_loop(
    ctx: Arc<ProcessingContext>,
    queue: JobQueue,
    mut shutdown: watch::Receiver<bool>,
    index: usize,
) {
    info!("Consumer {} started on {} queue", index, queue.name());
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            job_id = queue.recv() => match job_id {
                Some(job_id) => {
                    if let Err(e) = process_job(ctx.clone(), &job_id).await {
                        error!("Job {} processing error: {}", job_id, e);
                    }
                }
                None => break,
            }
        }
    }
    info!("Consumer {} stopped on {} queue", index, queue.name());
}

/// Process one dequeued job id.
///
/// The job is re-read from the store at every pickup; a terminal or unknown
/// job is dropped silently, which makes double-enqueueing harmless. Handler
/// errors fail the job with a structured log rather than bubbling out of the
/// consumer loop.
pub async fn process_job(ctx: Arc<ProcessingContext>, job_id: &JobId) -> WorkerResult<()> {
    let Some(job) = ctx.jobs.get_job(job_id).await? else {
        warn!("Dequeued unknown job {}, dropping", job_id);
        return Ok(());
    };
    if !job.status.is_claimable() {
        debug!(
            "Dropping job {} in terminal state {} at dispatch",
            job.id, job.status
        );
        return Ok(());
    }

    let payload = match JobPayload::decode(job.job_type, &job.payload) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Job {} payload does not decode: {}", job.id, e);
            let log = FailureLog::new(format!("Invalid job payload: {e}"));
            ctx.jobs
                .update_job(
                    &job.id,
                    JobPatch::new().status(JobStatus::Failed).logs(log.to_value()),
                )
                .await?;
            counter!("vedit_jobs_failed_total", "type" => job.job_type.as_str()).increment(1);
            return Ok(());
        }
    };

    let job = ctx
        .jobs
        .update_job(&job.id, JobPatch::new().status(JobStatus::Running))
        .await?;
    debug!("Dispatching job {} ({})", job.id, job.job_type);

    match handlers::dispatch(ctx.clone(), &job, payload).await {
        Ok(()) => {
            counter!("vedit_jobs_processed_total", "type" => job.job_type.as_str()).increment(1);
            Ok(())
        }
        Err(e) => {
            warn!("Job {} failed: {}", job.id, e);
            let log = FailureLog::new(e.detail());
            ctx.jobs
                .update_job(
                    &job.id,
                    JobPatch::new().status(JobStatus::Failed).logs(log.to_value()),
                )
                .await?;
            counter!("vedit_jobs_failed_total", "type" => job.job_type.as_str()).increment(1);
            Ok(())
        }
    }
}
