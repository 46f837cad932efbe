//! Job record and lifecycle states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("job_{}", &hex[..12]))
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

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job lifecycle state.
///
/// `Waiting` means "submitted to a remote system, awaiting asynchronous
/// completion" and anchors crash-resumable polling; it is distinct from
/// locally running work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is waiting in queue
    #[default]
    Queued,
    /// Job is being processed by a worker
    Running,
    /// Job has been submitted remotely and is being polled
    Waiting,
    /// Job completed successfully
    Completed,
    /// Job failed
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Waiting => "waiting",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// States a worker may legally pick the job up in. Anything else is
    /// silently dropped at dispatch, so double-enqueueing is harmless.
    pub fn is_claimable(&self) -> bool {
        matches!(
            self,
            JobStatus::Queued | JobStatus::Waiting | JobStatus::Running
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of job. The set is closed; an unknown type is a handling error at
/// dispatch, not a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    /// Generate low-resolution proxies for a set of assets
    #[serde(rename = "proxy")]
    Proxy,
    /// Render a timeline to a final mp4
    #[serde(rename = "render")]
    Render,
    /// Render a timeline using proxies where available
    #[serde(rename = "preview-render")]
    PreviewRender,
    /// AI-generated transition via the Hailuo protocol
    #[serde(rename = "hailuo-transition")]
    HailuoTransition,
    /// Generic Higgsfield generate call
    #[serde(rename = "higgsfield-generate")]
    HiggsfieldGenerate,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Proxy => "proxy",
            JobType::Render => "render",
            JobType::PreviewRender => "preview-render",
            JobType::HailuoTransition => "hailuo-transition",
            JobType::HiggsfieldGenerate => "higgsfield-generate",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of asynchronous work tracked through a status lifecycle.
///
/// The job store owns these records; workers re-read a job from the store at
/// every pickup and never cache it beyond one handler invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job ID, assigned at creation
    pub id: JobId,

    /// Job type
    #[serde(rename = "type")]
    pub job_type: JobType,

    /// Lifecycle state
    #[serde(default)]
    pub status: JobStatus,

    /// Progress 0-100, non-decreasing within an execution attempt
    #[serde(default)]
    pub progress: u8,

    /// Type-dependent payload document, mutated as the job advances
    #[serde(default)]
    pub payload: serde_json::Value,

    /// Location of the produced artifact, set once on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_path: Option<String>,

    /// Structured failure record or informational log
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<serde_json::Value>,

    /// External correlation id for the transition protocol
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_job_id: Option<String>,

    /// Creation timestamp, immutable
    pub created_at: DateTime<Utc>,

    /// Last update timestamp, set on every mutation
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new queued job with the given payload document.
    pub fn new(job_type: JobType, payload: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            job_type,
            status: JobStatus::Queued,
            progress: 0,
            payload,
            result_path: None,
            logs: None,
            remote_job_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_has_prefix() {
        let id = JobId::new();
        assert!(id.as_str().starts_with("job_"));
        assert_eq!(id.as_str().len(), "job_".len() + 12);
    }

    #[test]
    fn status_classification() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Waiting.is_terminal());

        assert!(JobStatus::Queued.is_claimable());
        assert!(JobStatus::Waiting.is_claimable());
        assert!(JobStatus::Running.is_claimable());
        assert!(!JobStatus::Completed.is_claimable());
    }

    #[test]
    fn job_type_serde_uses_wire_names() {
        let json = serde_json::to_string(&JobType::HailuoTransition).unwrap();
        assert_eq!(json, "\"hailuo-transition\"");
        let back: JobType = serde_json::from_str("\"preview-render\"").unwrap();
        assert_eq!(back, JobType::PreviewRender);
    }

    #[test]
    fn new_job_starts_queued() {
        let job = Job::new(JobType::Proxy, serde_json::json!({"assets": []}));
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 0);
        assert!(job.result_path.is_none());
        assert_eq!(job.created_at, job.updated_at);
    }
}
