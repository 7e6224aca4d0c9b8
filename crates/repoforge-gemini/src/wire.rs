//! Request and response bodies of the `generateContent` call.
//!
//! Only the fields this crate reads or writes are modelled; unknown response
//! fields are ignored.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use repoforge_core::domain::BuildComplexity;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateRequest {
    /// Single-turn prompt constrained to JSON matching `schema`.
    pub fn json(prompt: impl Into<String>, schema: Value) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.into()),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: schema,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Content,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, if any.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Response schema for a repository analysis.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "projectName": { "type": "STRING" },
            "detectedFramework": {
                "type": "STRING",
                "description": "e.g. React Native, Flutter, Native Kotlin, Native Java"
            },
            "dependencies": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "estimatedSize": { "type": "STRING" },
            "buildComplexity": {
                "type": "STRING",
                "enum": BuildComplexity::WIRE_LABELS
            }
        },
        "required": [
            "projectName",
            "detectedFramework",
            "dependencies",
            "estimatedSize",
            "buildComplexity"
        ]
    })
}

/// Response schema for a list of console lines.
pub fn log_lines_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": { "type": "STRING" }
    })
}
