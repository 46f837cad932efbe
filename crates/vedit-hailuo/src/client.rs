//! Hailuo transition client: submit, status fetch, polling.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{HailuoError, HailuoResult};
use crate::job_set::{JobSet, JobSetStatus};

/// Default delay between status fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Client configuration. Both header credentials are required at call time;
/// their absence is a configuration error, never retried.
#[derive(Debug, Clone)]
pub struct HailuoConfig {
    /// Platform base URL
    pub platform_base: String,
    /// Submit endpoint path
    pub submit_endpoint: String,
    /// `hf-api-key` header value
    pub api_key: String,
    /// `hf-secret` header value
    pub api_secret: String,
    /// Optional model override sent at the top level of a submission
    pub model: Option<String>,
}

impl Default for HailuoConfig {
    fn default() -> Self {
        Self {
            platform_base: "https://platform.higgsfield.ai".to_string(),
            submit_endpoint: "/v1/image2video/minimax-hailuo".to_string(),
            api_key: String::new(),
            api_secret: String::new(),
            model: None,
        }
    }
}

impl HailuoConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            platform_base: std::env::var("HIGGSFIELD_PLATFORM_BASE")
                .unwrap_or_else(|_| "https://platform.higgsfield.ai".to_string()),
            submit_endpoint: std::env::var("HAILUO_ENDPOINT")
                .unwrap_or_else(|_| "/v1/image2video/minimax-hailuo".to_string()),
            api_key: std::env::var("HIGGSFIELD_API_KEY").unwrap_or_default(),
            api_secret: std::env::var("HIGGSFIELD_API_SECRET").unwrap_or_default(),
            model: std::env::var("HAILUO_MODEL_ID").ok().filter(|m| !m.is_empty()),
        }
    }
}

/// One transition submission. Persisted verbatim into the job payload so a
/// failed or resumed job keeps the exact request that was sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub start_image_url: String,
    pub end_image_url: String,
    pub prompt: String,
    pub duration: u32,
    pub motion_id: String,
    pub resolution: String,
    pub enhance_prompt: bool,
}

#[derive(Debug, Serialize)]
struct ImageRef<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    image_url: &'a str,
}

#[derive(Debug, Serialize)]
struct SubmitParams<'a> {
    prompt: &'a str,
    duration: u32,
    resolution: &'a str,
    enhance_prompt: bool,
    motion_id: &'a str,
    input_image: ImageRef<'a>,
    input_image_end: ImageRef<'a>,
}

#[derive(Debug, Serialize)]
struct SubmitBody<'a> {
    params: SubmitParams<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

/// Bounds for a polling run. A zero `max_polls` or zero `timeout` disables
/// that bound; with both disabled the loop polls until the remote resolves.
#[derive(Debug, Clone)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_polls: u32,
    pub timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_polls: 0,
            timeout: Duration::ZERO,
        }
    }
}

/// A completed transition: the final job-set and its downloadable result.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub job_set_id: String,
    pub job_set: JobSet,
    pub result_url: String,
}

/// Client driving the three-step remote protocol: submit, fetch status,
/// extract result. Constructed once at process start and shared.
#[derive(Debug, Clone)]
pub struct HailuoClient {
    http: Client,
    config: HailuoConfig,
}

impl HailuoClient {
    pub fn new(config: HailuoConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(HailuoConfig::from_env())
    }

    fn check_credentials(&self) -> HailuoResult<()> {
        if self.config.api_key.is_empty() || self.config.api_secret.is_empty() {
            return Err(HailuoError::MissingCredentials);
        }
        Ok(())
    }

    fn credentialed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("hf-api-key", &self.config.api_key)
            .header("hf-secret", &self.config.api_secret)
            .header("content-type", "application/json")
    }

    /// Submit a transition, returning the remote job-set id.
    ///
    /// Accepts either `job_set_id` or `id` in the response.
    pub async fn submit(&self, request: &TransitionRequest) -> HailuoResult<String> {
        self.check_credentials()?;
        if request.motion_id.is_empty() {
            return Err(HailuoError::MissingMotionId);
        }

        let body = SubmitBody {
            params: SubmitParams {
                prompt: &request.prompt,
                duration: request.duration,
                resolution: &request.resolution,
                enhance_prompt: request.enhance_prompt,
                motion_id: &request.motion_id,
                input_image: ImageRef {
                    kind: "image_url",
                    image_url: &request.start_image_url,
                },
                input_image_end: ImageRef {
                    kind: "image_url",
                    image_url: &request.end_image_url,
                },
            },
            model: self.config.model.as_deref(),
        };

        let url = format!("{}{}", self.config.platform_base, self.config.submit_endpoint);
        let response = self.credentialed(self.http.post(&url)).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HailuoError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = response.json().await?;
        let job_set_id = data
            .get("job_set_id")
            .or_else(|| data.get("id"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| HailuoError::UnexpectedResponse(data.to_string()))?;

        info!("Submitted Hailuo transition, job set {}", job_set_id);
        Ok(job_set_id)
    }

    /// Fetch the current job-set state.
    pub async fn fetch_job_set(&self, job_set_id: &str) -> HailuoResult<JobSet> {
        self.check_credentials()?;

        let url = format!("{}/v1/job-sets/{}", self.config.platform_base, job_set_id);
        let response = self.credentialed(self.http.get(&url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HailuoError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(JobSet::new(response.json().await?))
    }

    /// Poll an already-submitted job-set until it resolves or a bound trips.
    ///
    /// Completed without a downloadable result is itself an error. With both
    /// bounds disabled this polls indefinitely.
    pub async fn poll_existing_job(
        &self,
        job_set_id: &str,
        opts: &PollOptions,
    ) -> HailuoResult<TransitionOutcome> {
        let started = Instant::now();
        let mut polls: u32 = 0;

        loop {
            let job_set = self.fetch_job_set(job_set_id).await?;
            polls += 1;

            match job_set.status() {
                JobSetStatus::Completed => {
                    let result_url = job_set.result_url().ok_or(HailuoError::MissingResult)?;
                    info!(
                        "Hailuo job set {} completed after {} polls",
                        job_set_id, polls
                    );
                    return Ok(TransitionOutcome {
                        job_set_id: job_set_id.to_string(),
                        job_set,
                        result_url,
                    });
                }
                JobSetStatus::Failed => {
                    return Err(HailuoError::RemoteFailure(job_set.summary()));
                }
                JobSetStatus::Pending(status) => {
                    debug!(
                        "Hailuo job set {} still {}, poll {}",
                        job_set_id, status, polls
                    );
                }
            }

            if opts.max_polls > 0 && polls >= opts.max_polls {
                return Err(HailuoError::PollExhausted(polls));
            }
            if !opts.timeout.is_zero() && started.elapsed() >= opts.timeout {
                return Err(HailuoError::Timeout(opts.timeout.as_secs()));
            }

            tokio::time::sleep(opts.interval).await;
        }
    }

    /// One-shot synchronous path: submit and wait for completion.
    pub async fn run_transition(
        &self,
        request: &TransitionRequest,
        opts: &PollOptions,
    ) -> HailuoResult<TransitionOutcome> {
        let job_set_id = self.submit(request).await?;
        self.poll_existing_job(&job_set_id, opts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base: &str) -> HailuoConfig {
        HailuoConfig {
            platform_base: base.to_string(),
            submit_endpoint: "/v1/image2video/minimax-hailuo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            model: None,
        }
    }

    fn test_request() -> TransitionRequest {
        TransitionRequest {
            start_image_url: "http://host/frames/start.jpg".to_string(),
            end_image_url: "http://host/frames/end.jpg".to_string(),
            prompt: "smooth morph".to_string(),
            duration: 5,
            motion_id: "m-1".to_string(),
            resolution: "768".to_string(),
            enhance_prompt: true,
        }
    }

    #[tokio::test]
    async fn submit_requires_credentials() {
        let mut config = test_config("http://unused");
        config.api_key = String::new();
        let client = HailuoClient::new(config);
        let err = client.submit(&test_request()).await.unwrap_err();
        assert!(matches!(err, HailuoError::MissingCredentials));
    }

    #[tokio::test]
    async fn submit_requires_motion_id() {
        let client = HailuoClient::new(test_config("http://unused"));
        let mut request = test_request();
        request.motion_id = String::new();
        let err = client.submit(&request).await.unwrap_err();
        assert!(matches!(err, HailuoError::MissingMotionId));
    }

    #[tokio::test]
    async fn submit_accepts_id_field_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/image2video/minimax-hailuo"))
            .and(header("hf-api-key", "key"))
            .and(header("hf-secret", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "js-42"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = HailuoClient::new(test_config(&server.uri()));
        let id = client.submit(&test_request()).await.unwrap();
        assert_eq!(id, "js-42");
    }

    #[tokio::test]
    async fn submit_surfaces_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(402).set_body_string("payment required"))
            .mount(&server)
            .await;

        let client = HailuoClient::new(test_config(&server.uri()));
        match client.submit(&test_request()).await.unwrap_err() {
            HailuoError::Api { status, body } => {
                assert_eq!(status, 402);
                assert!(body.contains("payment required"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn poll_with_max_polls_one_fetches_exactly_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/job-sets/js-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"jobs": [{"status": "queued"}], "status": "queued"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = HailuoClient::new(test_config(&server.uri()));
        let opts = PollOptions {
            interval: Duration::from_millis(5),
            max_polls: 1,
            timeout: Duration::ZERO,
        };
        let err = client.poll_existing_job("js-1", &opts).await.unwrap_err();
        assert!(matches!(err, HailuoError::PollExhausted(1)));
        assert!(err.to_string().to_lowercase().contains("maximum poll attempts"));
    }

    #[tokio::test]
    async fn poll_with_bounds_disabled_waits_for_resolution() {
        let server = MockServer::start().await;
        // Two pending fetches, then completion: the unbounded loop must not
        // error out on its own.
        Mock::given(method("GET"))
            .and(path("/v1/job-sets/js-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "queued"})))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/job-sets/js-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jobs": [{"status": "completed", "results": {"raw": [{"url": "http://r/video.mp4"}]}}]
            })))
            .mount(&server)
            .await;

        let client = HailuoClient::new(test_config(&server.uri()));
        let opts = PollOptions {
            interval: Duration::from_millis(5),
            max_polls: 0,
            timeout: Duration::ZERO,
        };
        let outcome = client.poll_existing_job("js-2", &opts).await.unwrap();
        assert_eq!(outcome.result_url, "http://r/video.mp4");
    }

    #[tokio::test]
    async fn completed_without_result_url_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"jobs": [{"status": "completed"}]})),
            )
            .mount(&server)
            .await;

        let client = HailuoClient::new(test_config(&server.uri()));
        let err = client
            .poll_existing_job("js-3", &PollOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HailuoError::MissingResult));
        assert!(err.to_string().contains("did not return a downloadable result"));
    }

    #[tokio::test]
    async fn remote_failure_is_fatal_not_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"jobs": [{"status": "error"}]})),
            )
            .mount(&server)
            .await;

        let client = HailuoClient::new(test_config(&server.uri()));
        let err = client
            .poll_existing_job("js-4", &PollOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HailuoError::RemoteFailure(_)));
        assert!(!err.is_transient());
    }
}
