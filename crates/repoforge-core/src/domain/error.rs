//! Error taxonomy for RepoForge.

/// Pre-flight input rejection. Raised before any session state changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a valid GitHub repository URL")]
    MissingHostMarker { repo_url: String },

    #[error("Please select an icon for your app before starting")]
    MissingIcon,
}

/// Problems loading the user's icon image.
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("icon data too short for format detection ({0} bytes)")]
    TooShort(usize),

    #[error("unsupported icon format (expected PNG, JPEG, GIF or WebP)")]
    UnsupportedFormat,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of a remote collaborator. Absorbed by the fallback wrappers.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("service returned status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("missing API credential (set {0})")]
    MissingCredential(&'static str),

    #[error("service returned no content")]
    EmptyResponse,

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for CollaboratorError {
    fn from(err: serde_json::Error) -> Self {
        CollaboratorError::Malformed(err.to_string())
    }
}

/// Failure raised while a stage is running. Ends the attempt as failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    #[error("stage interrupted: {0}")]
    Interrupted(String),
}

/// RepoForge errors.
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("icon error: {0}")]
    Icon(#[from] IconError),

    #[error("collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("stage error: {0}")]
    Stage(#[from] StageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for RepoForge operations.
pub type Result<T> = std::result::Result<T, ForgeError>;
