//! Typed job payloads.
//!
//! Each job type carries one concrete payload schema, decoded once at
//! dispatch time from the job's stored JSON document. Transition payloads
//! are re-persisted as the job advances so that polling survives restarts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::asset::AssetId;
use crate::job::JobType;
use crate::timeline::Timeline;

/// Payload of a `proxy` job: the assets to generate proxies for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyPayload {
    #[serde(default)]
    pub assets: Vec<AssetId>,
}

/// One entry of a legacy sequence render: either an asset reference or a raw
/// file path, concatenated in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<AssetId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub use_proxy: bool,
}

/// Payload of a `render`/`preview-render` job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RenderPayload {
    /// Full timeline description
    Timeline(Timeline),
    /// Legacy flat sequence, concatenated with a single re-encode
    Sequence { timeline: Vec<SequenceItem> },
}

/// Payload of a `hailuo-transition` job.
///
/// The optional fields are written back in place as the job advances:
/// `hailuo_request` and `hailuo_job_set_id` after submission, `asset_id`
/// once the downloaded result has been registered as a new asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionPayload {
    pub from_asset_id: AssetId,
    pub to_asset_id: AssetId,
    #[serde(default)]
    pub prompt: String,
    pub motion_id: String,
    #[serde(default = "default_transition_duration")]
    pub duration: u32,
    #[serde(default = "default_transition_resolution")]
    pub resolution: String,
    #[serde(default = "default_enhance_prompt")]
    pub enhance_prompt: bool,

    /// Last submitted request, kept for diagnostics and manual recovery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hailuo_request: Option<Value>,
    /// Remote job-set id; presence means "already submitted, poll instead"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hailuo_job_set_id: Option<String>,
    /// Asset created from the downloaded result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<AssetId>,
}

fn default_transition_duration() -> u32 {
    5
}

fn default_transition_resolution() -> String {
    "768".to_string()
}

fn default_enhance_prompt() -> bool {
    true
}

/// Payload of a `higgsfield-generate` job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePayload {
    pub input_url: String,
    #[serde(default)]
    pub params: Value,
    /// Raw remote response, written back on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// Tagged union of all payload schemas, keyed by the job's type.
#[derive(Debug, Clone)]
pub enum JobPayload {
    Proxy(ProxyPayload),
    Render(RenderPayload),
    PreviewRender(RenderPayload),
    HailuoTransition(TransitionPayload),
    HiggsfieldGenerate(GeneratePayload),
}

impl JobPayload {
    /// Decode a job's stored payload document according to its type.
    pub fn decode(job_type: JobType, payload: &Value) -> Result<Self, serde_json::Error> {
        Ok(match job_type {
            JobType::Proxy => JobPayload::Proxy(serde_json::from_value(payload.clone())?),
            JobType::Render => JobPayload::Render(serde_json::from_value(payload.clone())?),
            JobType::PreviewRender => {
                JobPayload::PreviewRender(serde_json::from_value(payload.clone())?)
            }
            JobType::HailuoTransition => {
                JobPayload::HailuoTransition(serde_json::from_value(payload.clone())?)
            }
            JobType::HiggsfieldGenerate => {
                JobPayload::HiggsfieldGenerate(serde_json::from_value(payload.clone())?)
            }
        })
    }
}

/// Structured failure record stored on a failed job's `logs` field.
///
/// For transition jobs it keeps the last submitted request and the remote
/// job-set id so the correlation needed for manual recovery is never lost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureLog {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hailuo_request: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hailuo_job_set_id: Option<String>,
}

impl FailureLog {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            hailuo_request: None,
            hailuo_job_set_id: None,
        }
    }

    pub fn with_request(mut self, request: Option<Value>) -> Self {
        self.hailuo_request = request;
        self
    }

    pub fn with_job_set_id(mut self, id: Option<String>) -> Self {
        self.hailuo_job_set_id = id;
        self
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::String(self.error.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_proxy_payload() {
        let payload = json!({"assets": ["a1", "a2"]});
        match JobPayload::decode(JobType::Proxy, &payload).unwrap() {
            JobPayload::Proxy(p) => assert_eq!(p.assets.len(), 2),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn decode_render_timeline_vs_legacy_sequence() {
        let timeline = json!({
            "output_settings": {"resolution": "1280x720"},
            "tracks": [{"type": "video", "clips": [
                {"asset_id": "a1", "source_in": 0.0, "source_out": 1.0}
            ]}]
        });
        match JobPayload::decode(JobType::Render, &timeline).unwrap() {
            JobPayload::Render(RenderPayload::Timeline(tl)) => {
                assert_eq!(tl.video_clips().len(), 1)
            }
            other => panic!("unexpected payload: {other:?}"),
        }

        let legacy = json!({"timeline": [
            {"asset_id": "a1", "use_proxy": true},
            {"path": "/tmp/extra.mp4"}
        ]});
        match JobPayload::decode(JobType::Render, &legacy).unwrap() {
            JobPayload::Render(RenderPayload::Sequence { timeline }) => {
                assert_eq!(timeline.len(), 2);
                assert!(timeline[0].use_proxy);
                assert_eq!(timeline[1].path.as_deref(), Some("/tmp/extra.mp4"));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn transition_payload_roundtrips_resume_state() {
        let payload = json!({
            "from_asset_id": "a1",
            "to_asset_id": "a2",
            "prompt": "smooth morph",
            "motion_id": "m-1",
        });
        let mut decoded: TransitionPayload = serde_json::from_value(payload).unwrap();
        assert_eq!(decoded.duration, 5);
        assert_eq!(decoded.resolution, "768");
        assert!(decoded.enhance_prompt);
        assert!(decoded.hailuo_job_set_id.is_none());

        decoded.hailuo_job_set_id = Some("js-9".to_string());
        let value = serde_json::to_value(&decoded).unwrap();
        let again: TransitionPayload = serde_json::from_value(value).unwrap();
        assert_eq!(again.hailuo_job_set_id.as_deref(), Some("js-9"));
    }

    #[test]
    fn failure_log_keeps_correlation() {
        let log = FailureLog::new("remote job failed")
            .with_job_set_id(Some("js-1".to_string()))
            .to_value();
        assert_eq!(log["error"], "remote job failed");
        assert_eq!(log["hailuo_job_set_id"], "js-1");
        assert!(log.get("hailuo_request").is_none());
    }
}
