//! Collaborator seams: the repository analyzer and the log synthesizer.
//!
//! Both are best-effort. The choreographer never sees their errors: the
//! `*_or_fallback` helpers substitute the fixed fallback values and report
//! the upstream error through tracing only.

pub mod offline;

use async_trait::async_trait;

use crate::domain::{fallback_build_logs, CollaboratorError, RepoAnalysis};
use crate::obs;

pub use offline::{OfflineAnalyzer, OfflineSynthesizer};

/// Produces descriptive metadata for a repository URL.
#[async_trait]
pub trait RepoAnalyzer: Send + Sync {
    async fn analyze(&self, repo_url: &str) -> Result<RepoAnalysis, CollaboratorError>;
}

/// Produces a build-tool console transcript for an analysis.
#[async_trait]
pub trait LogSynthesizer: Send + Sync {
    async fn synthesize(&self, analysis: &RepoAnalysis) -> Result<Vec<String>, CollaboratorError>;
}

/// Analyze `repo_url`, substituting [`RepoAnalysis::fallback`] on any error.
pub async fn analyze_or_fallback(analyzer: &dyn RepoAnalyzer, repo_url: &str) -> RepoAnalysis {
    match analyzer.analyze(repo_url).await {
        Ok(analysis) => analysis,
        Err(err) => {
            obs::emit_collaborator_fallback("repo_analyzer", &err);
            RepoAnalysis::fallback()
        }
    }
}

/// Synthesize build lines, substituting [`fallback_build_logs`] on any error.
pub async fn synthesize_or_fallback(
    synthesizer: &dyn LogSynthesizer,
    analysis: &RepoAnalysis,
) -> Vec<String> {
    match synthesizer.synthesize(analysis).await {
        Ok(lines) => lines,
        Err(err) => {
            obs::emit_collaborator_fallback("log_synthesizer", &err);
            fallback_build_logs()
        }
    }
}
