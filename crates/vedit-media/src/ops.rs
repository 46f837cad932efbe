//! Fixed media pipeline operations: proxy generation, re-encode
//! concatenation and still-frame extraction.
//!
//! Each operation is a blocking subprocess invocation with a checked exit
//! status; the command builders are separate from execution so argument
//! construction stays testable.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};

/// Default proxy height in pixels.
pub const DEFAULT_PROXY_HEIGHT: u32 = 480;

/// Default offset for first-frame extraction, in seconds. Biased slightly
/// past zero to avoid black lead-in frames while staying visually
/// representative.
pub const FIRST_FRAME_OFFSET: f64 = 0.04;

/// Default offset before end-of-stream for last-frame extraction.
pub const LAST_FRAME_OFFSET: f64 = 0.08;

/// Build the proxy transcode command: downscale to `height` with a fixed
/// quality preset.
pub fn proxy_command(master: &Path, dest: &Path, height: u32) -> FfmpegCommand {
    FfmpegCommand::new(dest)
        .input(master)
        .video_filter(format!("scale=-2:{height}"))
        .video_codec("libx264")
        .preset("fast")
        .crf(23)
        .audio_codec("aac")
        .audio_bitrate("128k")
}

/// Downscale and re-encode a master file into a preview proxy.
pub async fn create_proxy(
    master: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    height: u32,
) -> MediaResult<String> {
    let master = master.as_ref();
    let dest = dest.as_ref();
    info!("Creating proxy for {:?} -> {:?}", master, dest);
    proxy_command(master, dest, height).run().await
}

/// Build the concat command: each input's first video and audio stream,
/// re-encoded into a single output.
pub fn concat_command(paths: &[PathBuf], dest: &Path) -> MediaResult<FfmpegCommand> {
    if paths.is_empty() {
        return Err(MediaError::NoConcatInputs);
    }

    let n = paths.len();
    let mut filter = String::new();
    for i in 0..n {
        filter.push_str(&format!("[{i}:v:0][{i}:a:0]"));
    }
    filter.push_str(&format!("concat=n={n}:v=1:a=1[outv][outa]"));

    let mut cmd = FfmpegCommand::new(dest);
    for path in paths {
        cmd = cmd.input(path);
    }
    Ok(cmd
        .filter_complex(filter)
        .map("[outv]")
        .map("[outa]")
        .video_codec("libx264")
        .preset("medium")
        .crf(22))
}

/// Re-encode-concatenate N inputs into one output (legacy non-timeline
/// render path).
pub async fn concat_reencode(paths: &[PathBuf], dest: impl AsRef<Path>) -> MediaResult<String> {
    let dest = dest.as_ref();
    info!("Concatenating {} inputs -> {:?}", paths.len(), dest);
    concat_command(paths, dest)?.run().await
}

/// Build the single-frame extraction command. `from_end` seeks with
/// `-sseof`; otherwise `-ss` from the start.
pub fn frame_command(video: &Path, dest: &Path, from_end: bool, offset: f64) -> FfmpegCommand {
    let seek: Vec<String> = if from_end {
        vec!["-sseof".to_string(), format!("-{:.3}", offset.abs())]
    } else {
        vec!["-ss".to_string(), format!("{:.3}", offset.max(0.0))]
    };
    FfmpegCommand::new(dest)
        .input_with_args(seek, video)
        .single_frame()
}

/// Grab a single still frame near the start or end of a video.
pub async fn extract_frame(
    video: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    from_end: bool,
    offset: f64,
) -> MediaResult<String> {
    frame_command(video.as_ref(), dest.as_ref(), from_end, offset)
        .run()
        .await
}

/// Extract a frame `offset` seconds into the video.
pub async fn extract_first_frame(
    video: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    offset: f64,
) -> MediaResult<String> {
    extract_frame(video, dest, false, offset).await
}

/// Extract a frame `offset` seconds before end-of-stream.
pub async fn extract_last_frame(
    video: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    offset: f64,
) -> MediaResult<String> {
    extract_frame(video, dest, true, offset).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_command_args() {
        let args = proxy_command(
            Path::new("storage/assets/a.mp4"),
            Path::new("storage/assets/proxy_a.mp4"),
            480,
        )
        .build_args();
        let joined = args.join(" ");
        assert!(joined.contains("-vf scale=-2:480"));
        assert!(joined.contains("-c:v libx264"));
        assert!(joined.contains("-crf 23"));
        assert!(joined.contains("-b:a 128k"));
    }

    #[test]
    fn concat_command_builds_pairwise_filter() {
        let paths = vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")];
        let cmd = concat_command(&paths, Path::new("out.mp4")).unwrap();
        let joined = cmd.build_args().join(" ");
        assert!(joined.contains("[0:v:0][0:a:0][1:v:0][1:a:0]concat=n=2:v=1:a=1[outv][outa]"));
        assert!(joined.contains("-map [outv]"));
        assert!(joined.contains("-map [outa]"));
    }

    #[test]
    fn concat_rejects_empty_input() {
        assert!(matches!(
            concat_command(&[], Path::new("out.mp4")),
            Err(MediaError::NoConcatInputs)
        ));
    }

    #[test]
    fn frame_command_seeks_from_either_end() {
        let start = frame_command(Path::new("v.mp4"), Path::new("f.jpg"), false, 0.04);
        let joined = start.build_args().join(" ");
        assert!(joined.contains("-ss 0.040"));
        assert!(joined.contains("-frames:v 1"));
        assert!(joined.contains("-q:v 2"));

        let end = frame_command(Path::new("v.mp4"), Path::new("f.jpg"), true, 0.08);
        let joined = end.build_args().join(" ");
        assert!(joined.contains("-sseof -0.080"));
    }
}
