//! Timeline description driving renders.

use serde::{Deserialize, Serialize};

use crate::asset::AssetId;

/// Output encoding settings for a render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Target resolution as "WxH"
    #[serde(default = "default_resolution")]
    pub resolution: String,
    /// Target frame rate
    #[serde(default = "default_framerate")]
    pub framerate: u32,
    #[serde(default = "default_video_codec")]
    pub video_codec: String,
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
    /// Video bitrate, e.g. "5M"; encoder default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,
    /// Output file name; falls back to "<job_id>.mp4"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,
}

fn default_resolution() -> String {
    "1920x1080".to_string()
}

fn default_framerate() -> u32 {
    30
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            framerate: default_framerate(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            bitrate: None,
            output_filename: None,
        }
    }
}

impl OutputSettings {
    /// Parse the "WxH" resolution string into (width, height).
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        let (w, h) = self.resolution.split_once(['x', 'X'])?;
        Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
    }
}

/// Track kind within a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Video,
    Audio,
}

/// One clip on a track, trimmed to `[source_in, source_out)` seconds of the
/// referenced asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    pub asset_id: AssetId,
    #[serde(default)]
    pub source_in: f64,
    pub source_out: f64,
}

impl Clip {
    /// Clip duration in seconds.
    pub fn duration(&self) -> f64 {
        (self.source_out - self.source_in).max(0.0)
    }
}

/// An ordered set of clips of one kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    #[serde(rename = "type")]
    pub kind: TrackKind,
    #[serde(default)]
    pub clips: Vec<Clip>,
}

/// The ordered, multi-track description of clips and output settings that
/// drives a render. Trimming and clip ordering are taken as given; the only
/// cross-clip requirement is that referenced assets exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(default)]
    pub output_settings: OutputSettings,
    pub tracks: Vec<Track>,
}

impl Timeline {
    /// All clips on video tracks, in track order then clip order.
    pub fn video_clips(&self) -> Vec<&Clip> {
        self.tracks
            .iter()
            .filter(|t| t.kind == TrackKind::Video)
            .flat_map(|t| t.clips.iter())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_defaults_apply() {
        let tl: Timeline = serde_json::from_str(r#"{"tracks": []}"#).unwrap();
        assert_eq!(tl.output_settings.resolution, "1920x1080");
        assert_eq!(tl.output_settings.framerate, 30);
        assert_eq!(tl.output_settings.video_codec, "libx264");
        assert!(tl.output_settings.bitrate.is_none());
    }

    #[test]
    fn dimensions_parse() {
        let settings = OutputSettings {
            resolution: "1280x720".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.dimensions(), Some((1280, 720)));

        let bad = OutputSettings {
            resolution: "wide".to_string(),
            ..Default::default()
        };
        assert_eq!(bad.dimensions(), None);
    }

    #[test]
    fn video_clips_skip_audio_tracks() {
        let tl: Timeline = serde_json::from_value(serde_json::json!({
            "tracks": [
                {"type": "video", "clips": [
                    {"asset_id": "a1", "source_in": 0.0, "source_out": 2.0},
                    {"asset_id": "a2", "source_in": 1.0, "source_out": 4.0}
                ]},
                {"type": "audio", "clips": [
                    {"asset_id": "a3", "source_in": 0.0, "source_out": 6.0}
                ]}
            ]
        }))
        .unwrap();

        let clips = tl.video_clips();
        assert_eq!(clips.len(), 2);
        assert!((clips[1].duration() - 3.0).abs() < f64::EPSILON);
    }
}
