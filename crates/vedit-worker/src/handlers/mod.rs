//! Job handlers, one per job type.

pub mod generate;
pub mod proxy;
pub mod render;
pub mod transition;

use std::sync::Arc;

use vedit_models::{Job, JobPayload};

use crate::context::ProcessingContext;
use crate::error::WorkerResult;

/// Route a decoded payload to its handler.
pub async fn dispatch(
    ctx: Arc<ProcessingContext>,
    job: &Job,
    payload: JobPayload,
) -> WorkerResult<()> {
    match payload {
        JobPayload::Proxy(p) => proxy::handle(ctx, job, p).await,
        JobPayload::Render(p) => render::handle(ctx, job, p, false).await,
        JobPayload::PreviewRender(p) => render::handle(ctx, job, p, true).await,
        JobPayload::HailuoTransition(p) => transition::handle(ctx, job, p).await,
        JobPayload::HiggsfieldGenerate(p) => generate::handle(ctx, job, p).await,
    }
}
