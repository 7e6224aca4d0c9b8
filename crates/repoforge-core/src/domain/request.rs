//! Trigger input and its pre-flight checks.

use super::error::ValidationError;
use super::icon::AppIcon;

/// Substring a repository URL must contain to be accepted.
pub const HOST_MARKER: &str = "github.com";

/// Reject a repository URL that does not name the accepted host.
pub fn check_repo_url(repo_url: &str) -> Result<(), ValidationError> {
    if repo_url.contains(HOST_MARKER) {
        Ok(())
    } else {
        Err(ValidationError::MissingHostMarker {
            repo_url: repo_url.to_string(),
        })
    }
}

/// Inputs collected from the user for one attempt.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub repo_url: String,
    pub icon: Option<AppIcon>,
}

impl BuildRequest {
    pub fn new(repo_url: impl Into<String>, icon: Option<AppIcon>) -> Self {
        Self {
            repo_url: repo_url.into(),
            icon,
        }
    }

    /// Check the preconditions of a build trigger. Nothing is retried.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_repo_url(&self.repo_url)?;
        if self.icon.is_none() {
            return Err(ValidationError::MissingIcon);
        }
        Ok(())
    }
}
