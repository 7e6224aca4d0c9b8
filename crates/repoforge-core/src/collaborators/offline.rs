//! Deterministic collaborators that need no remote service.
//!
//! Values are derived from the URL alone, so the same repository always
//! produces the same analysis and transcript.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{LogSynthesizer, RepoAnalyzer};
use crate::domain::{BuildComplexity, CollaboratorError, RepoAnalysis};

/// Analyzer that fabricates an analysis from the URL path.
#[derive(Debug, Default, Clone)]
pub struct OfflineAnalyzer;

impl OfflineAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RepoAnalyzer for OfflineAnalyzer {
    async fn analyze(&self, repo_url: &str) -> Result<RepoAnalysis, CollaboratorError> {
        Ok(analyze_url(repo_url))
    }
}

/// Synthesizer that emits a fixed-shape Gradle transcript.
#[derive(Debug, Default, Clone)]
pub struct OfflineSynthesizer;

impl OfflineSynthesizer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LogSynthesizer for OfflineSynthesizer {
    async fn synthesize(&self, analysis: &RepoAnalysis) -> Result<Vec<String>, CollaboratorError> {
        Ok(gradle_transcript(analysis))
    }
}

/// Last non-empty path segment of a URL, without a `.git` suffix.
fn repo_segment(repo_url: &str) -> &str {
    repo_url
        .trim_end_matches('/')
        .rsplit('/')
        .find(|s| !s.is_empty())
        .map(|s| s.trim_end_matches(".git"))
        .unwrap_or(repo_url)
}

/// `my-cool_app` -> `My Cool App`
fn title_case(segment: &str) -> String {
    segment
        .split(|c: char| c == '-' || c == '_' || c == '.' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn guess_framework(segment: &str) -> &'static str {
    let lower = segment.to_ascii_lowercase();
    if lower.contains("flutter") || lower.contains("dart") {
        "Flutter"
    } else if lower.contains("react") || lower.contains("-rn") || lower.contains("expo") {
        "React Native"
    } else if lower.contains("java") {
        "Native Java"
    } else {
        "Native Kotlin"
    }
}

fn dependencies_for(framework: &str) -> Vec<String> {
    let deps: &[&str] = match framework {
        "Flutter" => &[
            "io.flutter:flutter_embedding_debug",
            "androidx.window:window",
            "com.google.firebase:firebase-core",
            "androidx.lifecycle:lifecycle-runtime",
        ],
        "React Native" => &[
            "com.facebook.react:react-android",
            "com.facebook.react:hermes-android",
            "androidx.swiperefreshlayout:swiperefreshlayout",
            "com.google.android.material:material",
        ],
        "Native Java" => &[
            "androidx.appcompat:appcompat",
            "com.google.android.material:material",
            "com.squareup.retrofit2:retrofit",
        ],
        _ => &[
            "androidx.core:core-ktx",
            "androidx.compose.ui:ui",
            "androidx.lifecycle:lifecycle-runtime-ktx",
            "org.jetbrains.kotlinx:kotlinx-coroutines-android",
            "com.squareup.okhttp3:okhttp",
        ],
    };
    deps.iter().map(|d| d.to_string()).collect()
}

/// Fabricate an analysis for `repo_url`.
pub fn analyze_url(repo_url: &str) -> RepoAnalysis {
    let segment = repo_segment(repo_url);
    let digest = Sha256::digest(repo_url.as_bytes());

    let project_name = match title_case(segment) {
        name if name.is_empty() => "Android App".to_string(),
        name => name,
    };
    let detected_framework = guess_framework(segment).to_string();
    let dependencies = dependencies_for(&detected_framework);
    let estimated_size = format!("{}.{} MB", 8 + digest[0] % 40, digest[1] % 10);
    let build_complexity = match digest[2] % 3 {
        0 => BuildComplexity::Low,
        1 => BuildComplexity::Medium,
        _ => BuildComplexity::High,
    };

    RepoAnalysis {
        project_name,
        detected_framework,
        dependencies,
        estimated_size,
        build_complexity,
    }
}

/// Fifteen console lines ending in `BUILD SUCCESSFUL`.
pub fn gradle_transcript(analysis: &RepoAnalysis) -> Vec<String> {
    let compile_task = match analysis.detected_framework.as_str() {
        "Flutter" => "> Task :app:compileFlutterBuildDebug",
        "React Native" => "> Task :app:createBundleDebugJsAndAssets",
        "Native Java" => "> Task :app:compileDebugJavaWithJavac",
        _ => "> Task :app:compileDebugKotlin",
    };
    let seconds = match analysis.build_complexity {
        BuildComplexity::Low => 28,
        BuildComplexity::Medium => 45,
        BuildComplexity::High => 73,
    };

    vec![
        format!("> Configure project :app ({})", analysis.project_name),
        "Executing tasks: [:app:assembleDebug]".to_string(),
        "> Task :app:preBuild UP-TO-DATE".to_string(),
        "> Task :app:preDebugBuild UP-TO-DATE".to_string(),
        "> Task :app:generateDebugBuildConfig".to_string(),
        "> Task :app:checkDebugAarMetadata".to_string(),
        "> Task :app:processDebugResources".to_string(),
        compile_task.to_string(),
        "> Task :app:compileDebugKotlin".to_string(),
        "> Task :app:dexBuilderDebug".to_string(),
        "> Task :app:mergeDexDebug".to_string(),
        "> Task :app:packageDebug".to_string(),
        "> Task :app:assembleDebug".to_string(),
        "42 actionable tasks: 42 executed".to_string(),
        format!("BUILD SUCCESSFUL in {seconds}s"),
    ]
}
