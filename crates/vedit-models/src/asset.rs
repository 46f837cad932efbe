//! Media asset records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// Unique identifier for an asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    /// Generate a new random asset ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse media kind, used by frame preparation to decide between frame
/// extraction (video) and a verbatim copy (image).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    #[default]
    Video,
    Image,
    Other,
}

impl AssetKind {
    /// Guess the kind from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mp4" | "mov" | "mkv" | "webm" | "avi" | "m4v" => AssetKind::Video,
            "jpg" | "jpeg" | "png" | "webp" | "bmp" | "gif" => AssetKind::Image,
            _ => AssetKind::Other,
        }
    }
}

/// A media file reference.
///
/// `master_path` points at the uploaded original; `proxy_path` is filled in
/// by a completed proxy job. Duration and frame rate come from probing and
/// may be absent when probing failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub filename: String,
    pub master_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_path: Option<String>,
    #[serde(default)]
    pub kind: AssetKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    /// Create a new asset record for an uploaded file.
    pub fn new(filename: impl Into<String>, master_path: impl Into<String>) -> Self {
        let master_path = master_path.into();
        Self {
            id: AssetId::new(),
            filename: filename.into(),
            kind: AssetKind::from_path(&master_path),
            master_path,
            proxy_path: None,
            duration: None,
            fps: None,
            created_at: Utc::now(),
        }
    }

    /// Path a preview render should read from: the proxy when present,
    /// otherwise the master.
    pub fn preview_path(&self) -> &str {
        self.proxy_path.as_deref().unwrap_or(&self.master_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension() {
        assert_eq!(AssetKind::from_path("clip.mp4"), AssetKind::Video);
        assert_eq!(AssetKind::from_path("frame.JPG"), AssetKind::Image);
        assert_eq!(AssetKind::from_path("notes.txt"), AssetKind::Other);
        assert_eq!(AssetKind::from_path("noext"), AssetKind::Other);
    }

    #[test]
    fn preview_path_prefers_proxy() {
        let mut asset = Asset::new("a.mp4", "storage/assets/a.mp4");
        assert_eq!(asset.preview_path(), "storage/assets/a.mp4");
        asset.proxy_path = Some("storage/assets/proxy_a.mp4".to_string());
        assert_eq!(asset.preview_path(), "storage/assets/proxy_a.mp4");
    }
}
