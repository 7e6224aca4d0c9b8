//! Synthetic package described on the success screen.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::analysis::RepoAnalysis;

/// Target platform label shown in the analysis summary.
pub const TARGET_PLATFORM: &str = "Android SDK 34";

/// Description of the (fabricated) debug package produced by an attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApkArtifact {
    pub file_name: String,
    pub app_name: String,
    pub package_id: String,
    pub estimated_size: String,
    pub platform: String,
    pub signature: String,
}

impl ApkArtifact {
    pub fn describe(analysis: &RepoAnalysis, signature: &str) -> Self {
        let slug = slugify(&analysis.project_name);
        Self {
            file_name: format!("{slug}-debug.apk"),
            app_name: analysis.project_name.clone(),
            package_id: format!("com.repoforge.{}", slug.replace('-', "_")),
            estimated_size: analysis.estimated_size.clone(),
            platform: TARGET_PLATFORM.to_string(),
            signature: signature.to_string(),
        }
    }
}

/// Debug-keystore style fingerprint over the repository URL and icon bytes.
pub fn signing_fingerprint(repo_url: &str, icon: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(repo_url.as_bytes());
    hasher.update(icon);
    hex::encode(hasher.finalize())
}

/// Lowercase, dash-separated ASCII form of a project name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "app".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Acme App"), "acme-app");
        assert_eq!(slugify("  my__cool  APP!! "), "my-cool-app");
        assert_eq!(slugify("???"), "app");
    }

    #[test]
    fn test_describe_artifact() {
        let analysis = RepoAnalysis::fallback();
        let artifact = ApkArtifact::describe(&analysis, "abc123");
        assert_eq!(artifact.file_name, "unknown-project-debug.apk");
        assert_eq!(artifact.package_id, "com.repoforge.unknown_project");
        assert_eq!(artifact.platform, TARGET_PLATFORM);
        assert_eq!(artifact.signature, "abc123");
    }

    #[test]
    fn test_fingerprint_depends_on_both_inputs() {
        let a = signing_fingerprint("https://github.com/acme/app", b"icon");
        let b = signing_fingerprint("https://github.com/acme/app", b"other");
        let c = signing_fingerprint("https://github.com/acme/web", b"icon");
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
