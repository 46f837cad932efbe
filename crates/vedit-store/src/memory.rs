//! In-memory store backend.
//!
//! Used by tests and the default binary wiring; a relational backend slots
//! in behind the same traits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use vedit_models::{Asset, AssetId, Job, JobId};

use crate::error::{StoreError, StoreResult};
use crate::store::{AssetStore, JobPatch, JobStore};

/// Thread-safe in-memory job and asset store.
#[derive(Default, Clone)]
pub struct MemoryStore {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
    assets: Arc<RwLock<HashMap<AssetId, Asset>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create_job(&self, job: Job) -> StoreResult<Job> {
        let mut jobs = self.jobs.write().await;
        info!("Created job {} ({})", job.id, job.job_type);
        jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    async fn get_job(&self, id: &JobId) -> StoreResult<Option<Job>> {
        Ok(self.jobs.read().await.get(id).cloned())
    }

    async fn update_job(&self, id: &JobId, patch: JobPatch) -> StoreResult<Job> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::JobNotFound(id.to_string()))?;
        patch.apply_to(job);
        Ok(job.clone())
    }

    async fn list_unfinished_jobs(&self) -> StoreResult<Vec<Job>> {
        let jobs = self.jobs.read().await;
        let mut unfinished: Vec<Job> = jobs
            .values()
            .filter(|j| !j.status.is_terminal())
            .cloned()
            .collect();
        unfinished.sort_by_key(|j| j.created_at);
        Ok(unfinished)
    }
}

#[async_trait]
impl AssetStore for MemoryStore {
    async fn create_asset(&self, asset: Asset) -> StoreResult<Asset> {
        let mut assets = self.assets.write().await;
        info!("Created asset {} ({})", asset.id, asset.filename);
        assets.insert(asset.id.clone(), asset.clone());
        Ok(asset)
    }

    async fn get_asset(&self, id: &AssetId) -> StoreResult<Option<Asset>> {
        Ok(self.assets.read().await.get(id).cloned())
    }

    async fn set_proxy_path(&self, id: &AssetId, proxy_path: String) -> StoreResult<()> {
        let mut assets = self.assets.write().await;
        let asset = assets
            .get_mut(id)
            .ok_or_else(|| StoreError::AssetNotFound(id.to_string()))?;
        asset.proxy_path = Some(proxy_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vedit_models::{JobStatus, JobType};

    #[tokio::test]
    async fn job_roundtrip_and_patch() {
        let store = MemoryStore::new();
        let job = store
            .create_job(Job::new(JobType::Proxy, serde_json::json!({"assets": []})))
            .await
            .unwrap();

        let updated = store
            .update_job(
                &job.id,
                JobPatch::new().status(JobStatus::Running).progress(40),
            )
            .await
            .unwrap();
        assert_eq!(updated.status, JobStatus::Running);
        assert_eq!(updated.progress, 40);

        let loaded = store.get_job(&job.id).await.unwrap().unwrap();
        assert_eq!(loaded.progress, 40);
    }

    #[tokio::test]
    async fn update_of_missing_job_errors() {
        let store = MemoryStore::new();
        let err = store
            .update_job(&JobId::from_string("job_missing"), JobPatch::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::JobNotFound(_)));
    }

    #[tokio::test]
    async fn unfinished_excludes_terminal_jobs() {
        let store = MemoryStore::new();
        let queued = store
            .create_job(Job::new(JobType::Render, serde_json::json!({})))
            .await
            .unwrap();
        let done = store
            .create_job(Job::new(JobType::Render, serde_json::json!({})))
            .await
            .unwrap();
        store
            .update_job(&done.id, JobPatch::new().status(JobStatus::Completed))
            .await
            .unwrap();

        let unfinished = store.list_unfinished_jobs().await.unwrap();
        assert_eq!(unfinished.len(), 1);
        assert_eq!(unfinished[0].id, queued.id);
    }

    #[tokio::test]
    async fn proxy_path_updates() {
        let store = MemoryStore::new();
        let asset = store
            .create_asset(Asset::new("a.mp4", "storage/assets/a.mp4"))
            .await
            .unwrap();
        store
            .set_proxy_path(&asset.id, "storage/assets/proxy_a.mp4".to_string())
            .await
            .unwrap();
        let loaded = store.get_asset(&asset.id).await.unwrap().unwrap();
        assert_eq!(
            loaded.proxy_path.as_deref(),
            Some("storage/assets/proxy_a.mp4")
        );
    }
}
