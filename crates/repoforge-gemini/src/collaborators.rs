//! Remote implementations of the analyzer and synthesizer seams.

use async_trait::async_trait;
use tracing::info;

use repoforge_core::{CollaboratorError, LogSynthesizer, RepoAnalysis, RepoAnalyzer};

use crate::client::GeminiClient;
use crate::wire::{analysis_schema, log_lines_schema};

/// Number of console lines requested from the model.
pub const REQUESTED_LOG_LINES: usize = 15;

/// Instruction sent for a repository analysis.
pub fn analysis_prompt(repo_url: &str) -> String {
    format!(
        "Analyze this GitHub repository URL and predict its properties as an Android project. \
         Assume it is an Android project for the purposes of a build simulation. URL: {repo_url}."
    )
}

/// Instruction sent for a build transcript.
pub fn build_log_prompt(analysis: &RepoAnalysis) -> String {
    format!(
        "Generate {REQUESTED_LOG_LINES} lines of realistic Android build logs for a project named \
         \"{}\" using {}. Include Gradle tasks such as :app:preBuild and :app:compileDebugKotlin, \
         and finish with BUILD SUCCESSFUL. Use technical console formatting.",
        analysis.project_name, analysis.detected_framework
    )
}

/// Repository analyzer backed by the generative-language service.
#[derive(Debug, Clone)]
pub struct GeminiAnalyzer {
    client: GeminiClient,
}

impl GeminiAnalyzer {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RepoAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, repo_url: &str) -> Result<RepoAnalysis, CollaboratorError> {
        let analysis: RepoAnalysis = self
            .client
            .generate_json(&analysis_prompt(repo_url), analysis_schema())
            .await?;
        info!(
            project = %analysis.project_name,
            framework = %analysis.detected_framework,
            "Repository analyzed"
        );
        Ok(analysis)
    }
}

/// Build-log synthesizer backed by the generative-language service.
#[derive(Debug, Clone)]
pub struct GeminiSynthesizer {
    client: GeminiClient,
}

impl GeminiSynthesizer {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LogSynthesizer for GeminiSynthesizer {
    async fn synthesize(&self, analysis: &RepoAnalysis) -> Result<Vec<String>, CollaboratorError> {
        let lines: Vec<String> = self
            .client
            .generate_json(&build_log_prompt(analysis), log_lines_schema())
            .await?;
        info!(lines = lines.len() as u64, "Build transcript synthesized");
        Ok(lines)
    }
}
