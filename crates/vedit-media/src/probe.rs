//! Lenient FFprobe wrapper.
//!
//! Probing is best-effort: any failure degrades to an empty probe rather
//! than an error, so callers treat absent duration/frame-rate as "unknown".

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Probe result. All fields are optional except `has_audio`, which defaults
/// to false when no audio stream was seen (or probing failed).
#[derive(Debug, Clone, Default)]
pub struct MediaProbe {
    /// Container duration in seconds
    pub duration: Option<f64>,
    /// Frame rate of the first video stream
    pub fps: Option<f64>,
    /// Whether any audio stream is present
    pub has_audio: bool,
    /// Raw ffprobe document, for callers that need stream metadata
    pub raw: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// Probe a media file. Never fails; a missing binary, a bad file or
/// unparseable output all yield an empty probe.
pub async fn probe_media(path: impl AsRef<Path>) -> MediaProbe {
    let path = path.as_ref();

    if which::which("ffprobe").is_err() {
        debug!("ffprobe not found, returning empty probe for {:?}", path);
        return MediaProbe::default();
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await;

    let output = match output {
        Ok(o) if o.status.success() => o,
        _ => {
            debug!("ffprobe failed for {:?}, returning empty probe", path);
            return MediaProbe::default();
        }
    };

    let raw: serde_json::Value = match serde_json::from_slice(&output.stdout) {
        Ok(v) => v,
        Err(_) => return MediaProbe::default(),
    };
    let probe: FfprobeOutput = match serde_json::from_value(raw.clone()) {
        Ok(p) => p,
        Err(_) => return MediaProbe::default(),
    };

    let duration = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|d| d.parse::<f64>().ok());

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));

    let fps = video_stream.and_then(|s| {
        s.avg_frame_rate
            .as_ref()
            .or(s.r_frame_rate.as_ref())
            .and_then(|r| parse_frame_rate(r))
    });

    let has_audio = probe
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    MediaProbe {
        duration,
        fps,
        has_audio,
        raw: Some(raw),
    }
}

/// Parse a frame rate expression (e.g. "30000/1001" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_frame_rate_expressions() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("23.976").unwrap() - 23.976).abs() < 0.001);
        assert!(parse_frame_rate("30/0").is_none());
        assert!(parse_frame_rate("n/a").is_none());
    }

    #[tokio::test]
    async fn probe_of_missing_file_is_empty_not_error() {
        let probe = probe_media("/nonexistent/definitely-missing.mp4").await;
        assert!(probe.duration.is_none());
        assert!(probe.fps.is_none());
        assert!(!probe.has_audio);
    }
}
