//! Render and preview-render handlers.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use vedit_media::{build_render_command, concat_reencode, probe_media, ClipSource};
use vedit_models::{Job, JobStatus, RenderPayload, SequenceItem, Timeline};
use vedit_store::JobPatch;

use crate::context::ProcessingContext;
use crate::error::{WorkerError, WorkerResult};

pub async fn handle(
    ctx: Arc<ProcessingContext>,
    job: &Job,
    payload: RenderPayload,
    prefer_proxy: bool,
) -> WorkerResult<()> {
    match payload {
        RenderPayload::Timeline(timeline) => {
            render_timeline(&ctx, job, &timeline, prefer_proxy).await
        }
        RenderPayload::Sequence { timeline } => {
            render_sequence(&ctx, job, &timeline, prefer_proxy).await
        }
    }
}

async fn render_timeline(
    ctx: &ProcessingContext,
    job: &Job,
    timeline: &Timeline,
    prefer_proxy: bool,
) -> WorkerResult<()> {
    let clips = timeline.video_clips();

    let mut sources = Vec::with_capacity(clips.len());
    // Probe each distinct source once; repeated clips of one asset share it.
    let mut audio_cache: HashMap<PathBuf, bool> = HashMap::new();
    for clip in &clips {
        let asset = ctx.require_asset(&clip.asset_id).await?;
        let path = if prefer_proxy {
            PathBuf::from(asset.preview_path())
        } else {
            PathBuf::from(&asset.master_path)
        };
        let has_audio = match audio_cache.get(&path) {
            Some(has_audio) => *has_audio,
            None => {
                let has_audio = probe_media(&path).await.has_audio;
                audio_cache.insert(path.clone(), has_audio);
                has_audio
            }
        };
        sources.push(ClipSource {
            path,
            source_in: clip.source_in,
            source_out: clip.source_out,
            has_audio,
        });
    }

    let plan = build_render_command(
        &timeline.output_settings,
        &sources,
        &ctx.config.renders_dir(),
        job.id.as_str(),
    )?;

    ctx.jobs
        .update_job(&job.id, JobPatch::new().progress(10))
        .await?;

    info!("Rendering job {} ({} clips)", job.id, sources.len());
    plan.command.run().await?;

    ctx.jobs
        .update_job(
            &job.id,
            JobPatch::new()
                .status(JobStatus::Completed)
                .progress(100)
                .result_path(plan.output_path.to_string_lossy()),
        )
        .await?;
    Ok(())
}

/// Legacy flat-sequence render: concatenate the resolved inputs with a
/// single re-encode.
async fn render_sequence(
    ctx: &ProcessingContext,
    job: &Job,
    items: &[SequenceItem],
    prefer_proxy: bool,
) -> WorkerResult<()> {
    let mut paths = Vec::with_capacity(items.len());
    for item in items {
        let path = match (&item.asset_id, &item.path) {
            (Some(asset_id), _) => {
                let asset = ctx.require_asset(asset_id).await?;
                if item.use_proxy || prefer_proxy {
                    PathBuf::from(asset.preview_path())
                } else {
                    PathBuf::from(&asset.master_path)
                }
            }
            (None, Some(path)) => PathBuf::from(path),
            (None, None) => {
                return Err(WorkerError::AssetNotFound(
                    "sequence item without asset_id or path".to_string(),
                ))
            }
        };
        paths.push(path);
    }

    let output = ctx.config.renders_dir().join(format!("{}.mp4", job.id));
    ctx.jobs
        .update_job(&job.id, JobPatch::new().progress(10))
        .await?;

    info!("Concat-rendering job {} ({} inputs)", job.id, paths.len());
    concat_reencode(&paths, &output).await?;

    ctx.jobs
        .update_job(
            &job.id,
            JobPatch::new()
                .status(JobStatus::Completed)
                .progress(100)
                .result_path(output.to_string_lossy()),
        )
        .await?;
    Ok(())
}
