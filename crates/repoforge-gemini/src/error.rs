//! Error types for repoforge-gemini

use repoforge_core::CollaboratorError;
use thiserror::Error;

/// Errors that can occur talking to the generative-language service
#[derive(Error, Debug)]
pub enum GeminiError {
    /// No API key configured
    #[error("no API key configured (set API_KEY or GEMINI_API_KEY)")]
    MissingApiKey,

    /// HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),

    /// Request never produced a response
    #[error("HTTP error: {0}")]
    Http(String),

    /// Service answered with a non-success status
    #[error("service returned status {code}: {body}")]
    Status { code: u16, body: String },

    /// Response carried no candidate text
    #[error("response contained no text")]
    EmptyResponse,

    /// Candidate text did not match the requested schema
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for GeminiError {
    fn from(err: reqwest::Error) -> Self {
        GeminiError::Http(err.to_string())
    }
}

impl From<GeminiError> for CollaboratorError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::MissingApiKey => CollaboratorError::MissingCredential("API_KEY"),
            GeminiError::ClientSetup(msg) | GeminiError::Http(msg) => {
                CollaboratorError::Transport(msg)
            }
            GeminiError::Status { code, body } => CollaboratorError::Status { code, body },
            GeminiError::EmptyResponse => CollaboratorError::EmptyResponse,
            GeminiError::Json(e) => CollaboratorError::Malformed(e.to_string()),
        }
    }
}

/// Result type for service calls
pub type Result<T> = std::result::Result<T, GeminiError>;
