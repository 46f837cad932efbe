//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        logs: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("No video clips found in the timeline")]
    EmptyTimeline,

    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    #[error("No inputs given for concatenation")]
    NoConcatInputs,

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        logs: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            logs,
            exit_code,
        }
    }

    /// Captured process output, when the failure has any.
    pub fn logs(&self) -> Option<&str> {
        match self {
            Self::FfmpegFailed { logs, .. } => logs.as_deref(),
            _ => None,
        }
    }
}
