//! HTTP client for the `generateContent` endpoint

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::GeminiConfig;
use crate::error::{GeminiError, Result};
use crate::wire::{GenerateRequest, GenerateResponse};

const USER_AGENT: &str = concat!("repoforge-gemini/", env!("CARGO_PKG_VERSION"));

/// Client for structured (JSON) generation requests
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new client. No request timeout is set.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GeminiError::ClientSetup(e.to_string()))?;

        Ok(GeminiClient {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env())
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Send `prompt` constrained to `schema` and decode the answer as `T`.
    pub async fn generate_json<T: DeserializeOwned>(&self, prompt: &str, schema: Value) -> Result<T> {
        let text = self.generate_text(GenerateRequest::json(prompt, schema)).await?;
        Ok(serde_json::from_str(strip_code_fence(&text))?)
    }

    async fn generate_text(&self, request: GenerateRequest) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GeminiError::MissingApiKey)?;

        let url = self.config.endpoint();
        info!(model = %self.config.model, "Requesting generateContent");

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = response.json().await?;
        let text = body.text().ok_or(GeminiError::EmptyResponse)?;
        debug!(chars = text.len() as u64, "Received candidate text");
        Ok(text)
    }
}

/// Drop a surrounding Markdown code fence, if the model added one.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
