//! Render command synthesis from a timeline.
//!
//! Pure construction: the caller resolves asset paths and probes audio
//! presence; this module only turns that into a filter graph and an output
//! path. Per-clip filtering (rather than a global pre-scale) lets
//! mixed-resolution sources be normalized independently, and every clip gets
//! its timestamps reset for correct concatenation.

use std::path::{Path, PathBuf};

use vedit_models::OutputSettings;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};

/// One resolved clip feeding the render: a concrete file path, trim points
/// and whether the source carries an audio stream.
#[derive(Debug, Clone)]
pub struct ClipSource {
    pub path: PathBuf,
    pub source_in: f64,
    pub source_out: f64,
    pub has_audio: bool,
}

impl ClipSource {
    fn duration(&self) -> f64 {
        (self.source_out - self.source_in).max(0.0)
    }
}

/// A fully built render command and its output location.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub command: FfmpegCommand,
    pub output_path: PathBuf,
}

/// Build the FFmpeg invocation for a timeline render.
///
/// Audio presence is tracked per clip: when at least one clip has audio the
/// audio chain covers every clip, and silent clips contribute
/// anullsrc-generated stereo trimmed to the clip duration so the audio and
/// video concat chains stay index-aligned.
pub fn build_render_command(
    settings: &OutputSettings,
    clips: &[ClipSource],
    renders_dir: &Path,
    job_id: &str,
) -> MediaResult<RenderPlan> {
    if clips.is_empty() {
        return Err(MediaError::EmptyTimeline);
    }

    let (width, height) = settings
        .dimensions()
        .ok_or_else(|| MediaError::InvalidResolution(settings.resolution.clone()))?;

    let any_audio = clips.iter().any(|c| c.has_audio);
    let n = clips.len();

    let mut stages = Vec::new();
    for (i, clip) in clips.iter().enumerate() {
        stages.push(format!(
            "[{i}:v]scale={width}:{height},trim=start={:.3}:duration={:.3},setpts=PTS-STARTPTS[v{i}]",
            clip.source_in,
            clip.duration(),
        ));
        if any_audio {
            if clip.has_audio {
                stages.push(format!(
                    "[{i}:a]atrim=start={:.3}:duration={:.3},asetpts=PTS-STARTPTS[a{i}]",
                    clip.source_in,
                    clip.duration(),
                ));
            } else {
                stages.push(format!(
                    "anullsrc=channel_layout=stereo:sample_rate=44100,atrim=duration={:.3},asetpts=PTS-STARTPTS[a{i}]",
                    clip.duration(),
                ));
            }
        }
    }

    let video_chain: String = (0..n).map(|i| format!("[v{i}]")).collect();
    stages.push(format!("{video_chain}concat=n={n}:v=1:a=0[vout]"));

    if any_audio {
        let audio_chain: String = (0..n).map(|i| format!("[a{i}]")).collect();
        stages.push(format!("{audio_chain}concat=n={n}:v=0:a=1[aout]"));
    }

    let output_filename = settings
        .output_filename
        .clone()
        .unwrap_or_else(|| format!("{job_id}.mp4"));
    let output_path = renders_dir.join(output_filename);

    let mut cmd = FfmpegCommand::new(&output_path);
    for clip in clips {
        cmd = cmd.input(&clip.path);
    }
    cmd = cmd.filter_complex(stages.join(";")).map("[vout]");
    if any_audio {
        cmd = cmd.map("[aout]").audio_codec(&settings.audio_codec);
    }
    cmd = cmd
        .frame_rate(settings.framerate)
        .video_codec(&settings.video_codec);
    if let Some(bitrate) = &settings.bitrate {
        cmd = cmd.video_bitrate(bitrate);
    }

    Ok(RenderPlan {
        command: cmd,
        output_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_720p() -> OutputSettings {
        OutputSettings {
            resolution: "1280x720".to_string(),
            framerate: 24,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            bitrate: None,
            output_filename: Some("final_cut.mp4".to_string()),
        }
    }

    fn clip(path: &str, has_audio: bool) -> ClipSource {
        ClipSource {
            path: PathBuf::from(path),
            source_in: 1.0,
            source_out: 3.5,
            has_audio,
        }
    }

    #[test]
    fn two_clips_mixed_audio() {
        let plan = build_render_command(
            &settings_720p(),
            &[clip("a.mp4", true), clip("b.mp4", false)],
            Path::new("storage/renders"),
            "job_abc",
        )
        .unwrap();

        let args = plan.command.build_args();
        let filter = {
            let pos = args.iter().position(|a| a == "-filter_complex").unwrap();
            args[pos + 1].clone()
        };

        // Video concat references exactly the two labeled video streams.
        assert!(filter.contains("[v0][v1]concat=n=2:v=1:a=0[vout]"));
        // Audio chain covers both clips; the silent one is anullsrc-backed.
        assert!(filter.contains("[a0][a1]concat=n=2:v=0:a=1[aout]"));
        assert!(filter.contains("anullsrc=channel_layout=stereo"));
        // The silent clip never references its (missing) audio stream.
        assert!(!filter.contains("[1:a]"));

        // Per-clip normalization.
        assert!(filter.contains("[0:v]scale=1280:720,trim=start=1.000:duration=2.500,setpts=PTS-STARTPTS[v0]"));

        let joined = args.join(" ");
        assert!(joined.contains("-r 24"));
        assert!(joined.contains("-c:v libx264"));
        assert!(joined.contains("-map [vout]"));
        assert!(joined.contains("-map [aout]"));
        assert!(plan.output_path.ends_with("final_cut.mp4"));
    }

    #[test]
    fn all_silent_clips_skip_audio_chain() {
        let plan = build_render_command(
            &settings_720p(),
            &[clip("a.mp4", false), clip("b.mp4", false)],
            Path::new("storage/renders"),
            "job_abc",
        )
        .unwrap();

        let joined = plan.command.build_args().join(" ");
        assert!(!joined.contains("[aout]"));
        assert!(!joined.contains("anullsrc"));
        assert!(!joined.contains("-c:a"));
    }

    #[test]
    fn empty_timeline_is_rejected() {
        let err = build_render_command(&settings_720p(), &[], Path::new("r"), "j").unwrap_err();
        assert!(matches!(err, MediaError::EmptyTimeline));
    }

    #[test]
    fn output_path_defaults_to_job_id() {
        let mut settings = settings_720p();
        settings.output_filename = None;
        let plan = build_render_command(
            &settings,
            &[clip("a.mp4", true)],
            Path::new("storage/renders"),
            "job_xyz",
        )
        .unwrap();
        assert!(plan.output_path.ends_with("job_xyz.mp4"));
    }

    #[test]
    fn bad_resolution_is_rejected() {
        let mut settings = settings_720p();
        settings.resolution = "widescreen".to_string();
        let err = build_render_command(&settings, &[clip("a.mp4", true)], Path::new("r"), "j")
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidResolution(_)));
    }
}
