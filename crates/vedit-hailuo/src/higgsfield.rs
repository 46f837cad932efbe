//! Generic Higgsfield generation call.
//!
//! Unlike the transition protocol this is a single synchronous POST: the
//! remote responds with the finished generation document.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::{HailuoError, HailuoResult};

#[derive(Debug, Clone)]
pub struct HiggsfieldConfig {
    pub api_base: String,
    /// Optional bearer token; omitted when empty
    pub api_token: String,
}

impl Default for HiggsfieldConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.higgsfield.ai".to_string(),
            api_token: String::new(),
        }
    }
}

impl HiggsfieldConfig {
    pub fn from_env() -> Self {
        Self {
            api_base: std::env::var("HIGGSFIELD_API_BASE")
                .unwrap_or_else(|_| "https://api.higgsfield.ai".to_string()),
            api_token: std::env::var("HIGGSFIELD_API_TOKEN").unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    input: &'a str,
    params: &'a Value,
}

#[derive(Debug, Clone)]
pub struct HiggsfieldClient {
    http: Client,
    config: HiggsfieldConfig,
}

impl HiggsfieldClient {
    pub fn new(config: HiggsfieldConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(HiggsfieldConfig::from_env())
    }

    /// Run a generation against the input URL and return the raw response
    /// document.
    pub async fn generate(&self, input_url: &str, params: &Value) -> HailuoResult<Value> {
        let url = format!("{}/v1/generate", self.config.api_base);
        let mut request = self
            .http
            .post(&url)
            .json(&GenerateBody {
                input: input_url,
                params,
            });
        if !self.config.api_token.is_empty() {
            request = request.bearer_auth(&self.config.api_token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HailuoError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let result: Value = response.json().await?;
        info!("Higgsfield generation finished for {}", input_url);
        Ok(result)
    }
}
