//! Domain model for a RepoForge build session.

pub mod analysis;
pub mod artifact;
pub mod error;
pub mod icon;
pub mod log;
pub mod request;
pub mod status;
pub mod step;

pub use analysis::{fallback_build_logs, BuildComplexity, RepoAnalysis};
pub use artifact::{signing_fingerprint, slugify, ApkArtifact, TARGET_PLATFORM};
pub use error::{
    CollaboratorError, ForgeError, IconError, Result, StageError, ValidationError,
};
pub use icon::{AppIcon, IconFormat};
pub use log::{BuildLog, LogLevel, ERROR_MARKER};
pub use request::{check_repo_url, BuildRequest, HOST_MARKER};
pub use status::{BuildStatus, StepStatus};
pub use step::{initial_steps, is_well_formed, BuildStep, StepId};
