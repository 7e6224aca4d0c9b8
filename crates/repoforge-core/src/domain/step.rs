//! The fixed six-stage build timeline.

use serde::{Deserialize, Serialize};

use super::status::StepStatus;

/// Identity of one of the six stages, in timeline order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    SourceControl,
    AiAnalysis,
    GradleSync,
    Compilation,
    Optimization,
    Signing,
}

impl StepId {
    /// All stages in timeline order.
    pub const ALL: [StepId; 6] = [
        StepId::SourceControl,
        StepId::AiAnalysis,
        StepId::GradleSync,
        StepId::Compilation,
        StepId::Optimization,
        StepId::Signing,
    ];

    /// One-based position in the timeline.
    pub fn number(&self) -> usize {
        self.index() + 1
    }

    /// Zero-based position in the timeline.
    pub fn index(&self) -> usize {
        match self {
            StepId::SourceControl => 0,
            StepId::AiAnalysis => 1,
            StepId::GradleSync => 2,
            StepId::Compilation => 3,
            StepId::Optimization => 4,
            StepId::Signing => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StepId::SourceControl => "Source Control",
            StepId::AiAnalysis => "AI Analysis",
            StepId::GradleSync => "Gradle Sync",
            StepId::Compilation => "Compilation",
            StepId::Optimization => "Optimization",
            StepId::Signing => "Artifact Signing",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StepId::SourceControl => "Cloning repository and verifying branch...",
            StepId::AiAnalysis => "Detecting framework and dependencies...",
            StepId::GradleSync => "Resolving artifacts and project structure...",
            StepId::Compilation => "Transforming source code into DEX files...",
            StepId::Optimization => "Running ProGuard/R8 to shrink the package...",
            StepId::Signing => "Applying the debug keystore signature...",
        }
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of the timeline: immutable identity plus mutable status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildStep {
    pub id: StepId,
    pub status: StepStatus,
}

impl BuildStep {
    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    pub fn description(&self) -> &'static str {
        self.id.description()
    }
}

/// The six steps, all pending, in timeline order.
pub fn initial_steps() -> Vec<BuildStep> {
    StepId::ALL
        .iter()
        .map(|&id| BuildStep {
            id,
            status: StepStatus::Pending,
        })
        .collect()
}

/// Check the timeline shape: a prefix of completed steps, then at most one
/// running or failed step, then only pending steps.
pub fn is_well_formed(steps: &[BuildStep]) -> bool {
    let mut iter = steps.iter().map(|s| s.status).peekable();

    while iter.next_if_eq(&StepStatus::Completed).is_some() {}
    iter.next_if(|s| matches!(s, StepStatus::Running | StepStatus::Failed));
    iter.all(|s| s == StepStatus::Pending)
}
