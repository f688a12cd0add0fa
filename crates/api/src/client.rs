//! reqwest-backed completion client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use ghostfill_util::redact_sensitive;
use reqwest::{Client, header};
use tracing::debug;

use crate::config::CompletionConfig;
use crate::wire::{ChatRequest, ChatResponse};
use crate::{CompletionError, CompletionService};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "api-key";

/// Thin wrapper around a configured `reqwest::Client` that posts prompts to
/// the completion endpoint.
///
/// Each call issues exactly one request and never retries; callers decide what
/// a failure means for them.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    endpoint: String,
    http: Client,
}

impl CompletionClient {
    /// Construct a client from an explicit configuration.
    pub fn new(config: CompletionConfig) -> Result<Self> {
        let mut default_headers = header::HeaderMap::new();
        let mut api_key = header::HeaderValue::from_str(&config.api_key).context("api key is not a valid header value")?;
        api_key.set_sensitive(true);
        default_headers.insert(API_KEY_HEADER, api_key);
        default_headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(config.timeout)
            .build()
            .context("build http client")?;

        Ok(Self {
            endpoint: config.endpoint,
            http,
        })
    }

    /// Construct a client from `AI_COMPLETIONS_ENDPOINT` and `AI_COMPLETIONS_API_KEY`.
    pub fn from_environment() -> Result<Self> {
        Self::new(CompletionConfig::from_environment()?)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionService for CompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        debug!(endpoint = %self.endpoint, prompt_len = prompt.len(), "completion request started");
        let response = self
            .http
            .post(&self.endpoint)
            .json(&ChatRequest::for_prompt(prompt))
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: redact_sensitive(&text),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| CompletionError::MalformedBody(e.to_string()))?;
        let content = parsed
            .first_content()
            .ok_or_else(|| CompletionError::MalformedBody("response carried no completion choice".to_string()))?;

        debug!(status = status.as_u16(), completion_len = content.len(), "completion request finished");
        Ok(content.trim().to_string())
    }
}
