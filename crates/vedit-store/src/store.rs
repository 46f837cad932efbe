//! Job and asset store traits.
//!
//! The core never caches a Job beyond one handler invocation: every pickup
//! re-reads from the store, so pool members cannot race on stale state. The
//! store is the sole owner of Job records; workers mutate them only through
//! patches.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use vedit_models::{Asset, AssetId, Job, JobId, JobStatus};

use crate::error::StoreResult;

/// Partial update of a Job record.
///
/// `progress` never regresses once advanced and `result_path` is write-once;
/// both rules are enforced in [`JobPatch::apply_to`] so every store backend
/// inherits them.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub progress: Option<u8>,
    pub payload: Option<Value>,
    pub result_path: Option<String>,
    pub logs: Option<Value>,
    pub remote_job_id: Option<String>,
}

impl JobPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress.min(100));
        self
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn result_path(mut self, path: impl Into<String>) -> Self {
        self.result_path = Some(path.into());
        self
    }

    pub fn logs(mut self, logs: Value) -> Self {
        self.logs = Some(logs);
        self
    }

    pub fn remote_job_id(mut self, id: impl Into<String>) -> Self {
        self.remote_job_id = Some(id.into());
        self
    }

    /// Apply the patch in place, stamping `updated_at`.
    pub fn apply_to(&self, job: &mut Job) {
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(progress) = self.progress {
            if progress > job.progress {
                job.progress = progress;
            } else if progress < job.progress {
                debug!(
                    "Ignoring progress regression {} -> {} for job {}",
                    job.progress, progress, job.id
                );
            }
        }
        if let Some(payload) = &self.payload {
            job.payload = payload.clone();
        }
        if let Some(path) = &self.result_path {
            if job.result_path.is_none() {
                job.result_path = Some(path.clone());
            }
        }
        if let Some(logs) = &self.logs {
            job.logs = Some(logs.clone());
        }
        if let Some(id) = &self.remote_job_id {
            job.remote_job_id = Some(id.clone());
        }
        job.updated_at = Utc::now();
    }
}

/// Read/write access to Job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a new job.
    async fn create_job(&self, job: Job) -> StoreResult<Job>;

    /// Load a job by id.
    async fn get_job(&self, id: &JobId) -> StoreResult<Option<Job>>;

    /// Apply a partial update; errors if the job does not exist.
    async fn update_job(&self, id: &JobId, patch: JobPatch) -> StoreResult<Job>;

    /// All jobs in a non-terminal state, for the recovery sweep.
    async fn list_unfinished_jobs(&self) -> StoreResult<Vec<Job>>;
}

/// Read/write access to Asset records.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Persist a new asset.
    async fn create_asset(&self, asset: Asset) -> StoreResult<Asset>;

    /// Load an asset by id.
    async fn get_asset(&self, id: &AssetId) -> StoreResult<Option<Asset>>;

    /// Record a generated proxy path; errors if the asset does not exist.
    async fn set_proxy_path(&self, id: &AssetId, proxy_path: String) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use vedit_models::JobType;

    #[test]
    fn progress_never_regresses() {
        let mut job = Job::new(JobType::Proxy, serde_json::json!({}));
        JobPatch::new().progress(60).apply_to(&mut job);
        assert_eq!(job.progress, 60);
        JobPatch::new().progress(30).apply_to(&mut job);
        assert_eq!(job.progress, 60);
        JobPatch::new().progress(100).apply_to(&mut job);
        assert_eq!(job.progress, 100);
    }

    #[test]
    fn result_path_is_write_once() {
        let mut job = Job::new(JobType::Render, serde_json::json!({}));
        JobPatch::new().result_path("renders/a.mp4").apply_to(&mut job);
        JobPatch::new().result_path("renders/b.mp4").apply_to(&mut job);
        assert_eq!(job.result_path.as_deref(), Some("renders/a.mp4"));
    }

    #[test]
    fn patch_stamps_updated_at() {
        let mut job = Job::new(JobType::Render, serde_json::json!({}));
        let before = job.updated_at;
        JobPatch::new().status(JobStatus::Running).apply_to(&mut job);
        assert_eq!(job.status, JobStatus::Running);
        assert!(job.updated_at >= before);
    }
}
