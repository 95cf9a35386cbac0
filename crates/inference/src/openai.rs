use std::time::Instant;

use async_trait::async_trait;
use protocol::Turn;
use reqwest::redirect::Policy;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::http_utils::join_base_path;
use crate::{InferenceClient, InferenceConfig, InferenceError};

/// Non-streaming client for OpenAI-compatible `/chat/completions` endpoints.
pub struct OpenAiClient {
    config: InferenceConfig,
    url: String,
    http_client: Client,
}

impl OpenAiClient {
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        let url = join_base_path(&config.base_url, &config.chat_path)?;
        let http_client = Client::builder()
            .redirect(Policy::none())
            .timeout(config.timeout())
            .user_agent("zapchat-server")
            .build()
            .map_err(|err| InferenceError::Request(err.to_string()))?;
        Ok(Self {
            config,
            url,
            http_client,
        })
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_send_error(&self, err: reqwest::Error) -> InferenceError {
        if err.is_timeout() {
            InferenceError::Timeout(self.config.timeout_ms)
        } else {
            InferenceError::Request(err.to_string())
        }
    }
}

#[async_trait]
impl InferenceClient for OpenAiClient {
    async fn complete(&self, turns: &[Turn]) -> Result<Turn, InferenceError> {
        let payload = build_payload(&self.config, turns);
        debug!(
            url = %self.url,
            model = %self.config.model,
            turns = turns.len(),
            "inference request"
        );

        let started = Instant::now();
        let response = self
            .http_client
            .post(&self.url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| self.map_send_error(err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.map_send_error(err))?;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        if !status.is_success() {
            warn!(
                status = %status,
                elapsed_ms,
                body = %body,
                "inference request rejected"
            );
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let content = parse_completion(&body)?;
        info!(
            model = %self.config.model,
            turns = turns.len(),
            elapsed_ms,
            content_len = content.len(),
            "inference completed"
        );
        Ok(Turn::assistant(content))
    }
}

fn build_payload(config: &InferenceConfig, turns: &[Turn]) -> Value {
    let mut body = json!({
        "model": config.model,
        "messages": turns,
    });
    if let Some(temperature) = config.temperature {
        body["temperature"] = json!(temperature);
    }
    body
}

fn parse_completion(body: &str) -> Result<String, InferenceError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| InferenceError::Decode(err.to_string()))?;
    let content = value
        .pointer("/choices/0/message/content")
        .and_then(|val| val.as_str())
        .unwrap_or("");
    if content.trim().is_empty() {
        return Err(InferenceError::MissingContent);
    }
    Ok(content.to_string())
}
