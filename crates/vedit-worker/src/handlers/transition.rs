//! Hailuo transition handler.
//!
//! Two entry points share one routine: a fresh job prepares and publishes
//! its boundary frames, submits, and parks itself in `waiting`; a job that
//! already carries a remote job-set id runs a bounded poll cycle instead and
//! never resubmits. Protocol failures are absorbed here so the failure
//! record keeps the submitted request and the remote correlation id.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use vedit_hailuo::TransitionRequest;
use vedit_models::{Asset, FailureLog, Job, JobId, JobStatus, TransitionPayload};
use vedit_store::JobPatch;

use crate::context::ProcessingContext;
use crate::error::WorkerResult;
use crate::frames;

pub async fn handle(
    ctx: Arc<ProcessingContext>,
    job: &Job,
    payload: TransitionPayload,
) -> WorkerResult<()> {
    match payload.hailuo_job_set_id.clone() {
        Some(job_set_id) => poll_cycle(&ctx, job, payload, &job_set_id).await,
        None => submit(&ctx, job, payload).await,
    }
}

async fn submit(
    ctx: &ProcessingContext,
    job: &Job,
    mut payload: TransitionPayload,
) -> WorkerResult<()> {
    let from = ctx.require_asset(&payload.from_asset_id).await?;
    let to = ctx.require_asset(&payload.to_asset_id).await?;

    let frames_dir = ctx.config.frames_dir();
    let start_frame = frames::transition_start_frame(&from, &frames_dir, job.id.as_str()).await?;
    let end_frame = frames::transition_end_frame(&to, &frames_dir, job.id.as_str()).await?;

    let start_url = ctx.publisher.publish(&start_frame).await?;
    let end_url = ctx.publisher.publish(&end_frame).await?;

    let request = TransitionRequest {
        start_image_url: start_url,
        end_image_url: end_url,
        prompt: payload.prompt.clone(),
        duration: payload.duration,
        motion_id: payload.motion_id.clone(),
        resolution: payload.resolution.clone(),
        enhance_prompt: payload.enhance_prompt,
    };
    payload.hailuo_request = serde_json::to_value(&request).ok();

    match ctx.hailuo.submit(&request).await {
        Ok(job_set_id) => {
            payload.hailuo_job_set_id = Some(job_set_id.clone());
            ctx.jobs
                .update_job(
                    &job.id,
                    JobPatch::new()
                        .status(JobStatus::Waiting)
                        .progress(10)
                        .payload(serde_json::to_value(&payload)?)
                        .remote_job_id(&job_set_id),
                )
                .await?;
            ctx.poll_queue.enqueue(job.id.clone())?;
            info!(
                "Transition job {} submitted as job set {}, now waiting",
                job.id, job_set_id
            );
            Ok(())
        }
        Err(e) => fail(ctx, &job.id, &payload, e.to_string()).await,
    }
}

async fn poll_cycle(
    ctx: &ProcessingContext,
    job: &Job,
    mut payload: TransitionPayload,
    job_set_id: &str,
) -> WorkerResult<()> {
    match ctx
        .hailuo
        .poll_existing_job(job_set_id, &ctx.config.poll_options())
        .await
    {
        // Post-poll steps fail with the same correlated record as the poll
        // itself; only the store write inside `fail` may still bubble.
        Ok(outcome) => match complete(ctx, job, &mut payload, &outcome.result_url).await {
            Ok(()) => Ok(()),
            Err(e) => fail(ctx, &job.id, &payload, e.detail()).await,
        },
        Err(e) if e.is_transient() => {
            info!(
                "Transition job {} still pending ({}), re-entering poll queue",
                job.id, e
            );
            ctx.jobs
                .update_job(&job.id, JobPatch::new().status(JobStatus::Waiting))
                .await?;
            ctx.poll_queue
                .enqueue_after(job.id.clone(), ctx.config.poll_requeue_delay);
            Ok(())
        }
        Err(e) => fail(ctx, &job.id, &payload, e.to_string()).await,
    }
}

/// Store the downloaded result as a new asset and finish the job.
async fn complete(
    ctx: &ProcessingContext,
    job: &Job,
    payload: &mut TransitionPayload,
    result_url: &str,
) -> WorkerResult<()> {
    let dest = ctx
        .config
        .assets_dir()
        .join(format!("{}_hailuo_transition.mp4", job.id));
    download(ctx, result_url, &dest).await?;

    let filename = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{}.mp4", job.id));
    let asset = ctx
        .assets
        .create_asset(Asset::new(filename, dest.to_string_lossy()))
        .await?;
    payload.asset_id = Some(asset.id.clone());

    ctx.jobs
        .update_job(
            &job.id,
            JobPatch::new()
                .status(JobStatus::Completed)
                .progress(100)
                .payload(serde_json::to_value(&payload)?)
                .result_path(dest.to_string_lossy()),
        )
        .await?;
    info!(
        "Transition job {} completed, result stored as asset {}",
        job.id, asset.id
    );
    Ok(())
}

async fn fail(
    ctx: &ProcessingContext,
    job_id: &JobId,
    payload: &TransitionPayload,
    error: String,
) -> WorkerResult<()> {
    warn!("Transition job {} failed: {}", job_id, error);
    let log = FailureLog::new(error)
        .with_request(payload.hailuo_request.clone())
        .with_job_set_id(payload.hailuo_job_set_id.clone());
    ctx.jobs
        .update_job(
            job_id,
            JobPatch::new()
                .status(JobStatus::Failed)
                .payload(serde_json::to_value(payload)?)
                .logs(log.to_value()),
        )
        .await?;
    Ok(())
}

async fn download(ctx: &ProcessingContext, url: &str, dest: &Path) -> WorkerResult<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let response = ctx.http.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    tokio::fs::write(dest, &bytes).await?;
    info!("Downloaded transition result ({} bytes) to {:?}", bytes.len(), dest);
    Ok(())
}
