//! Shared processing context.
//!
//! Every external dependency a handler touches is injected here, so tests
//! swap stores, publishers and remote endpoints without global state.

use std::sync::Arc;

use vedit_hailuo::{HailuoClient, HiggsfieldClient};
use vedit_models::{Asset, AssetId};
use vedit_queue::JobQueue;
use vedit_store::{ArtifactPublisher, AssetStore, JobStore};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};

pub struct ProcessingContext {
    pub jobs: Arc<dyn JobStore>,
    pub assets: Arc<dyn AssetStore>,
    pub publisher: Arc<dyn ArtifactPublisher>,
    pub hailuo: HailuoClient,
    pub higgsfield: HiggsfieldClient,
    /// Plain HTTP client for result downloads
    pub http: reqwest::Client,
    pub config: WorkerConfig,
    pub work_queue: JobQueue,
    pub poll_queue: JobQueue,
}

impl ProcessingContext {
    /// Load an asset that a handler cannot proceed without.
    pub async fn require_asset(&self, id: &AssetId) -> WorkerResult<Asset> {
        self.assets
            .get_asset(id)
            .await?
            .ok_or_else(|| WorkerError::AssetNotFound(id.to_string()))
    }
}
