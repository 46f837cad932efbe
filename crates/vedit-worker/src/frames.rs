//! Transition frame preparation.
//!
//! The transition start image is the *last* frame of the outgoing asset and
//! the end image is the *first* frame of the incoming one. Video assets go
//! through frame extraction; image assets are copied verbatim; anything else
//! cannot feed a transition.

use std::path::{Path, PathBuf};

use tracing::debug;

use vedit_media::{extract_first_frame, extract_last_frame, FIRST_FRAME_OFFSET, LAST_FRAME_OFFSET};
use vedit_models::{Asset, AssetKind};

use crate::error::{WorkerError, WorkerResult};

/// Prepare the start image for a transition out of `asset`.
pub async fn transition_start_frame(
    asset: &Asset,
    frames_dir: &Path,
    job_id: &str,
) -> WorkerResult<PathBuf> {
    let dest = frames_dir.join(format!("{job_id}_start.jpg"));
    prepare(asset, dest, true).await
}

/// Prepare the end image for a transition into `asset`.
pub async fn transition_end_frame(
    asset: &Asset,
    frames_dir: &Path,
    job_id: &str,
) -> WorkerResult<PathBuf> {
    let dest = frames_dir.join(format!("{job_id}_end.jpg"));
    prepare(asset, dest, false).await
}

async fn prepare(asset: &Asset, dest: PathBuf, from_end: bool) -> WorkerResult<PathBuf> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    match asset.kind {
        AssetKind::Video => {
            if from_end {
                extract_last_frame(&asset.master_path, &dest, LAST_FRAME_OFFSET).await?;
            } else {
                extract_first_frame(&asset.master_path, &dest, FIRST_FRAME_OFFSET).await?;
            }
        }
        AssetKind::Image => {
            debug!("Copying image asset {} as frame {:?}", asset.id, dest);
            tokio::fs::copy(&asset.master_path, &dest).await?;
        }
        AssetKind::Other => {
            return Err(WorkerError::UnsupportedAsset(asset.id.to_string()));
        }
    }
    Ok(dest)
}
