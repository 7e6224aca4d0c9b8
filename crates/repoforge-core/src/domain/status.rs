//! Attempt-level and step-level status values.

use serde::{Deserialize, Serialize};

/// Status of a build session.
///
/// Exactly one value is active at a time. The happy path moves forward
/// through `Cloning -> Analyzing -> Building -> Signing -> Completed`;
/// any non-terminal value may jump to `Failed`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    #[default]
    Idle,
    Cloning,
    Analyzing,
    Building,
    Signing,
    Completed,
    Failed,
}

impl BuildStatus {
    /// Whether a new attempt may be triggered from this status.
    pub fn accepts_trigger(&self) -> bool {
        matches!(
            self,
            BuildStatus::Idle | BuildStatus::Completed | BuildStatus::Failed
        )
    }

    /// Whether an attempt has ended in this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildStatus::Completed | BuildStatus::Failed)
    }

    /// Position along the happy path, used to check forward-only moves.
    fn rank(&self) -> u8 {
        match self {
            BuildStatus::Idle => 0,
            BuildStatus::Cloning => 1,
            BuildStatus::Analyzing => 2,
            BuildStatus::Building => 3,
            BuildStatus::Signing => 4,
            BuildStatus::Completed => 5,
            BuildStatus::Failed => 6,
        }
    }

    /// Check if moving to `next` is a legal transition within an attempt.
    pub fn can_transition_to(&self, next: BuildStatus) -> bool {
        match (self, next) {
            (current, BuildStatus::Failed) => !current.is_terminal(),
            (BuildStatus::Failed, _) | (BuildStatus::Completed, _) => false,
            (current, next) => next.rank() == current.rank() + 1,
        }
    }

    /// Upper-case label shown in the session header.
    pub fn label(&self) -> &'static str {
        match self {
            BuildStatus::Idle => "IDLE",
            BuildStatus::Cloning => "CLONING",
            BuildStatus::Analyzing => "ANALYZING",
            BuildStatus::Building => "BUILDING",
            BuildStatus::Signing => "SIGNING",
            BuildStatus::Completed => "COMPLETED",
            BuildStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Status of a single build step.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_accepted_only_when_at_rest() {
        assert!(BuildStatus::Idle.accepts_trigger());
        assert!(BuildStatus::Completed.accepts_trigger());
        assert!(BuildStatus::Failed.accepts_trigger());

        for busy in [
            BuildStatus::Cloning,
            BuildStatus::Analyzing,
            BuildStatus::Building,
            BuildStatus::Signing,
        ] {
            assert!(!busy.accepts_trigger(), "{busy} should reject triggers");
        }
    }

    #[test]
    fn test_happy_path_transitions() {
        assert!(BuildStatus::Cloning.can_transition_to(BuildStatus::Analyzing));
        assert!(BuildStatus::Analyzing.can_transition_to(BuildStatus::Building));
        assert!(BuildStatus::Building.can_transition_to(BuildStatus::Signing));
        assert!(BuildStatus::Signing.can_transition_to(BuildStatus::Completed));
        assert!(!BuildStatus::Cloning.can_transition_to(BuildStatus::Signing));
        assert!(!BuildStatus::Building.can_transition_to(BuildStatus::Analyzing));
    }

    #[test]
    fn test_failed_reachable_from_non_terminal_only() {
        assert!(BuildStatus::Analyzing.can_transition_to(BuildStatus::Failed));
        assert!(!BuildStatus::Completed.can_transition_to(BuildStatus::Failed));
        assert!(!BuildStatus::Failed.can_transition_to(BuildStatus::Failed));
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&BuildStatus::Signing).expect("serialize");
        assert_eq!(json, "\"signing\"");
        let back: StepStatus = serde_json::from_str("\"running\"").expect("deserialize");
        assert_eq!(back, StepStatus::Running);
    }
}
