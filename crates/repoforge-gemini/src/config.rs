//! Service configuration
//!
//! Defaults come from the environment so the CLI works with nothing more
//! than an exported API key.

use serde::{Deserialize, Serialize};

/// Model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// API root used when `GEMINI_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

/// Generative-language service configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API root, without a trailing slash
    pub base_url: String,
    /// Model name used in the `generateContent` path
    pub model: String,
    /// API key; requests fail with a missing-credential error without it
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            api_key: API_KEY_VARS
                .iter()
                .filter_map(|var| std::env::var(var).ok())
                .find(|key| !key.trim().is_empty()),
        }
    }
}

impl GeminiConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific endpoint, ignoring the environment
    pub fn new(base_url: &str) -> Self {
        GeminiConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    /// Set the model name
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Full `generateContent` endpoint for the configured model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_path() {
        let config = GeminiConfig::new("https://example.test/v1beta/");
        assert_eq!(
            config.endpoint(),
            "https://example.test/v1beta/models/gemini-3-flash-preview:generateContent"
        );
        let config = config.with_model("gemini-pro");
        assert!(config.endpoint().ends_with("/models/gemini-pro:generateContent"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = GeminiConfig::new(DEFAULT_BASE_URL).with_api_key("secret-key");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_key_not_serialized() {
        let config = GeminiConfig::new(DEFAULT_BASE_URL).with_api_key("secret-key");
        let json = serde_json::to_string(&config).expect("serialize");
        assert!(!json.contains("secret-key"));
    }
}
