//! Proxy generation handler.
//!
//! Fans out one transcode per asset with bounded concurrency. Re-running
//! after a crash is cheap: an existing proxy file is recorded without
//! re-transcoding.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use vedit_media::create_proxy;
use vedit_models::{AssetId, Job, JobId, JobStatus, ProxyPayload};
use vedit_store::JobPatch;

use crate::context::ProcessingContext;
use crate::error::{WorkerError, WorkerResult};

/// Proxy path for a master: `/assets/foo.mp4` becomes `/assets/proxy_foo.mp4`.
/// Masters outside an assets directory get a `proxy_` filename prefix.
pub fn proxy_path_for(master: &str) -> String {
    if master.contains("/assets/") {
        master.replace("/assets/", "/assets/proxy_")
    } else {
        let path = Path::new(master);
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(master);
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent
                .join(format!("proxy_{filename}"))
                .to_string_lossy()
                .into_owned(),
            _ => format!("proxy_{filename}"),
        }
    }
}

pub async fn handle(ctx: Arc<ProcessingContext>, job: &Job, payload: ProxyPayload) -> WorkerResult<()> {
    let total = payload.assets.len();
    if total == 0 {
        ctx.jobs
            .update_job(
                &job.id,
                JobPatch::new().status(JobStatus::Completed).progress(100),
            )
            .await?;
        return Ok(());
    }

    let semaphore = Arc::new(Semaphore::new(ctx.config.max_proxy_parallel));
    let done = Arc::new(AtomicUsize::new(0));
    let mut tasks: JoinSet<WorkerResult<()>> = JoinSet::new();

    for asset_id in payload.assets {
        let ctx = ctx.clone();
        let semaphore = semaphore.clone();
        let done = done.clone();
        let job_id = job.id.clone();
        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| WorkerError::Io(std::io::Error::other(e)))?;
            proxy_one(&ctx, &job_id, &asset_id, &done, total).await
        });
    }

    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                first_error.get_or_insert(e);
            }
            Err(e) => {
                first_error.get_or_insert(WorkerError::Io(std::io::Error::other(e)));
            }
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }

    ctx.jobs
        .update_job(
            &job.id,
            JobPatch::new().status(JobStatus::Completed).progress(100),
        )
        .await?;
    info!("Proxy job {} completed for {} assets", job.id, total);
    Ok(())
}

async fn proxy_one(
    ctx: &ProcessingContext,
    job_id: &JobId,
    asset_id: &AssetId,
    done: &AtomicUsize,
    total: usize,
) -> WorkerResult<()> {
    let asset = ctx.require_asset(asset_id).await?;
    let proxy_path = proxy_path_for(&asset.master_path);

    if Path::new(&proxy_path).exists() {
        debug!("Proxy already exists for asset {}, skipping", asset_id);
    } else {
        create_proxy(&asset.master_path, &proxy_path, ctx.config.proxy_height).await?;
    }
    ctx.assets.set_proxy_path(asset_id, proxy_path).await?;

    let completed = done.fetch_add(1, Ordering::SeqCst) + 1;
    let progress = ((completed * 100) / total) as u8;
    ctx.jobs
        .update_job(job_id, JobPatch::new().progress(progress))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_path_substitutes_assets_segment() {
        assert_eq!(
            proxy_path_for("/data/storage/assets/clip.mp4"),
            "/data/storage/assets/proxy_clip.mp4"
        );
    }

    #[test]
    fn proxy_path_prefixes_filename_elsewhere() {
        assert_eq!(proxy_path_for("/tmp/clip.mp4"), "/tmp/proxy_clip.mp4");
        assert_eq!(proxy_path_for("clip.mp4"), "proxy_clip.mp4");
    }
}
