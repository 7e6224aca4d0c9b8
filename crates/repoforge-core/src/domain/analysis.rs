//! Repository analysis snapshot returned by the analyzer collaborator.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Build complexity classification.
///
/// Wire labels follow the remote service schema (`Baja`, `Media`, `Alta`).
/// English labels are accepted on input in any case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildComplexity {
    Low,
    Medium,
    High,
}

impl BuildComplexity {
    /// Labels accepted by the remote response schema.
    pub const WIRE_LABELS: [&'static str; 3] = ["Baja", "Media", "Alta"];

    pub fn wire_label(&self) -> &'static str {
        match self {
            BuildComplexity::Low => "Baja",
            BuildComplexity::Medium => "Media",
            BuildComplexity::High => "Alta",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "baja" | "low" => Some(BuildComplexity::Low),
            "media" | "medium" => Some(BuildComplexity::Medium),
            "alta" | "high" => Some(BuildComplexity::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for BuildComplexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BuildComplexity::Low => "Low",
            BuildComplexity::Medium => "Medium",
            BuildComplexity::High => "High",
        })
    }
}

impl Serialize for BuildComplexity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_label())
    }
}

impl<'de> Deserialize<'de> for BuildComplexity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        BuildComplexity::parse(&label).ok_or_else(|| {
            serde::de::Error::unknown_variant(&label, &BuildComplexity::WIRE_LABELS)
        })
    }
}

/// Descriptive metadata fabricated for a repository URL.
///
/// Produced once per attempt and replaced wholesale by the next attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RepoAnalysis {
    pub project_name: String,
    pub detected_framework: String,
    pub dependencies: Vec<String>,
    pub estimated_size: String,
    pub build_complexity: BuildComplexity,
}

impl RepoAnalysis {
    /// Fixed record substituted when the analyzer fails.
    pub fn fallback() -> Self {
        Self {
            project_name: "Unknown Project".to_string(),
            detected_framework: "Native Android".to_string(),
            dependencies: vec![
                "androidx.appcompat".to_string(),
                "com.google.material".to_string(),
            ],
            estimated_size: "15.4 MB".to_string(),
            build_complexity: BuildComplexity::Medium,
        }
    }

    /// Up to the first three dependencies joined for the console.
    pub fn dependency_preview(&self) -> String {
        self.dependencies
            .iter()
            .take(3)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Fixed transcript substituted when the log synthesizer fails.
pub fn fallback_build_logs() -> Vec<String> {
    vec![
        "Executing tasks: [:app:assembleDebug]".to_string(),
        "BUILD SUCCESSFUL in 45s".to_string(),
    ]
}
