//! RepoForge Gemini: remote collaborators for the build choreography
//!
//! This crate talks to the generative-language `generateContent` endpoint
//! and implements the core `RepoAnalyzer` and `LogSynthesizer` seams on top
//! of it. Every failure is reported as a `CollaboratorError`; substituting
//! fallback values is left to the core.
//!
//! ## Key Components
//!
//! - `GeminiConfig`: endpoint, model and API key, read from the environment
//! - `GeminiClient`: structured JSON generation over `reqwest`
//! - `GeminiAnalyzer` / `GeminiSynthesizer`: the two collaborators

pub mod client;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod wire;

pub use client::GeminiClient;
pub use collaborators::{analysis_prompt, build_log_prompt, GeminiAnalyzer, GeminiSynthesizer};
pub use config::{GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::{GeminiError, Result};
