//! Worker error types.

use thiserror::Error;

use vedit_hailuo::HailuoError;
use vedit_media::MediaError;
use vedit_queue::QueueError;
use vedit_store::StoreError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Hailuo(#[from] HailuoError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("Invalid job payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Cannot prepare a transition frame from asset {0}: unsupported media kind")]
    UnsupportedAsset(String),

    #[error("Download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    /// Human-readable failure detail, including the tail of captured
    /// subprocess output when the failure has any.
    pub fn detail(&self) -> String {
        match self {
            Self::Media(e) => match e.logs() {
                Some(logs) => format!("{e}: {}", tail(logs, 1000)),
                None => e.to_string(),
            },
            other => other.to_string(),
        }
    }
}

fn tail(text: &str, max: usize) -> &str {
    let mut start = text.len().saturating_sub(max);
    while start < text.len() && !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}
