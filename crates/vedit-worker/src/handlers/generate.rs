//! Higgsfield generate handler.

use std::sync::Arc;

use tracing::info;

use vedit_models::{GeneratePayload, Job, JobStatus};
use vedit_store::JobPatch;

use crate::context::ProcessingContext;
use crate::error::WorkerResult;

pub async fn handle(
    ctx: Arc<ProcessingContext>,
    job: &Job,
    mut payload: GeneratePayload,
) -> WorkerResult<()> {
    let result = ctx
        .higgsfield
        .generate(&payload.input_url, &payload.params)
        .await?;
    payload.result = Some(result);

    ctx.jobs
        .update_job(
            &job.id,
            JobPatch::new()
                .status(JobStatus::Completed)
                .progress(100)
                .payload(serde_json::to_value(&payload)?),
        )
        .await?;
    info!("Generate job {} completed", job.id);
    Ok(())
}
