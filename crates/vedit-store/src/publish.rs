//! Artifact publishing seam.
//!
//! Handlers that need a remotely fetchable URL for a local file (frame
//! images handed to the transition protocol) depend on this trait only.
//! Object-storage backends implement it out of tree; the bundled fallback
//! serves the scratch path under a public base URL.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Publish a local file somewhere a third party can fetch it from.
#[async_trait]
pub trait ArtifactPublisher: Send + Sync {
    /// Returns a fetchable URL for the given local file.
    async fn publish(&self, local: &Path) -> StoreResult<String>;
}

/// Fallback publisher: assumes the frames scratch directory is mounted under
/// `<public_base_url>/frames/` by the HTTP layer.
pub struct LocalPublisher {
    public_base_url: String,
}

impl LocalPublisher {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        let mut public_base_url = public_base_url.into();
        while public_base_url.ends_with('/') {
            public_base_url.pop();
        }
        Self { public_base_url }
    }
}

#[async_trait]
impl ArtifactPublisher for LocalPublisher {
    async fn publish(&self, local: &Path) -> StoreResult<String> {
        if !local.exists() {
            return Err(StoreError::publish_failed(format!(
                "local file does not exist: {}",
                local.display()
            )));
        }
        let filename = local
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                StoreError::publish_failed(format!("unusable file name: {}", local.display()))
            })?;
        let url = format!("{}/frames/{}", self.public_base_url, filename);
        debug!("Published {} as {}", local.display(), url);
        Ok(url)
    }
}
