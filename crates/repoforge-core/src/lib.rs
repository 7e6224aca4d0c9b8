//! RepoForge Core Library
//!
//! Simulated "repository to APK" build sessions: a six-step choreography
//! that streams logs, steps and progress into a single-writer session.
//!
//! ## Key Components
//!
//! - `BuildChoreographer`: runs one attempt through the six steps
//! - `Session`: owns the visible state and publishes every change
//! - `RepoAnalyzer` / `LogSynthesizer`: collaborator seams with fallbacks
//! - `Pacer`: the suspension points between stages

pub mod choreographer;
pub mod collaborators;
pub mod domain;
pub mod fakes;
pub mod obs;
pub mod session;
pub mod telemetry;
pub mod timing;

pub use choreographer::{AttemptOutcome, BuildChoreographer};

pub use collaborators::offline::{OfflineAnalyzer, OfflineSynthesizer};
pub use collaborators::{
    analyze_or_fallback, synthesize_or_fallback, LogSynthesizer, RepoAnalyzer,
};

pub use domain::{
    check_repo_url, fallback_build_logs, initial_steps, is_well_formed, signing_fingerprint,
    ApkArtifact, AppIcon, BuildComplexity, BuildLog, BuildRequest, BuildStatus, BuildStep,
    CollaboratorError, ForgeError, IconError, IconFormat, LogLevel, RepoAnalysis, Result,
    StageError, StepId, StepStatus, ValidationError,
};

pub use session::{Session, SessionEvent, SessionState, PROGRESS_MAX};

pub use timing::{Pacer, Pause, StageTimings, TokioPacer};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
