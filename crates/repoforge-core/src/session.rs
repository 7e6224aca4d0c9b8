//! Single-writer session state.
//!
//! All visible state of a session lives in one [`SessionState`] value that
//! only changes through [`SessionState::apply`]. [`Session`] publishes every
//! applied [`SessionEvent`] twice:
//! - as a fresh snapshot on a `watch` channel, for renderers that redraw
//! - as the event itself on a `broadcast` channel, for consoles that stream
//!
//! The choreographer is the only writer; renderers hold receivers.

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::warn;
use uuid::Uuid;

use crate::domain::{
    initial_steps, ApkArtifact, BuildLog, BuildStatus, BuildStep, RepoAnalysis, StepId,
    StepStatus,
};

/// Largest value of the progress gauge.
pub const PROGRESS_MAX: u8 = 100;

/// Gauge value right after a trigger is accepted.
pub const PROGRESS_STARTED: u8 = 5;

const EVENT_BUFFER: usize = 1024;

/// A discrete change to session state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A new attempt claimed the session; everything resets.
    AttemptStarted { attempt_id: Uuid },

    StatusChanged { status: BuildStatus },

    StepChanged { step: StepId, status: StepStatus },

    LogAppended { log: BuildLog },

    /// Raise the gauge to an absolute value.
    ProgressSet { value: u8 },

    /// Raise the gauge by `by`, never above `cap`.
    ProgressAdvanced { by: u8, cap: u8 },

    AnalysisStored { analysis: RepoAnalysis },

    SignatureIssued { signature: String },

    /// The attempt ended with an error; running steps become failed.
    AttemptFailed { error: String },
}

/// Console text for a failed attempt.
pub fn failure_message(error: &str) -> String {
    format!("Build failed: {error}")
}

/// Everything a renderer needs to draw a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    pub attempt_id: Option<Uuid>,
    pub status: BuildStatus,
    pub steps: Vec<BuildStep>,
    pub logs: Vec<BuildLog>,
    pub analysis: Option<RepoAnalysis>,
    pub progress: u8,
    pub signature: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            attempt_id: None,
            status: BuildStatus::Idle,
            steps: initial_steps(),
            logs: Vec::new(),
            analysis: None,
            progress: 0,
            signature: None,
        }
    }
}

impl SessionState {
    /// Fold one event into the state.
    pub fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::AttemptStarted { attempt_id } => {
                *self = SessionState {
                    attempt_id: Some(*attempt_id),
                    status: BuildStatus::Cloning,
                    progress: PROGRESS_STARTED,
                    ..SessionState::default()
                };
            }
            SessionEvent::StatusChanged { status } => {
                if self.status.can_transition_to(*status) {
                    self.status = *status;
                } else {
                    warn!(from = %self.status, to = %status, "ignoring illegal status transition");
                }
            }
            SessionEvent::StepChanged { step, status } => {
                self.steps[step.index()].status = *status;
            }
            SessionEvent::LogAppended { log } => self.logs.push(log.clone()),
            SessionEvent::ProgressSet { value } => {
                self.progress = self.progress.max((*value).min(PROGRESS_MAX));
            }
            SessionEvent::ProgressAdvanced { by, cap } => {
                let next = self.progress.saturating_add(*by).min(*cap).min(PROGRESS_MAX);
                self.progress = self.progress.max(next);
            }
            SessionEvent::AnalysisStored { analysis } => {
                self.analysis = Some(analysis.clone());
            }
            SessionEvent::SignatureIssued { signature } => {
                self.signature = Some(signature.clone());
            }
            SessionEvent::AttemptFailed { error } => {
                self.status = BuildStatus::Failed;
                self.logs.push(BuildLog::error(failure_message(error)));
                for step in self
                    .steps
                    .iter_mut()
                    .filter(|s| s.status == StepStatus::Running)
                {
                    step.status = StepStatus::Failed;
                }
            }
        }
    }

    pub fn step(&self, id: StepId) -> &BuildStep {
        &self.steps[id.index()]
    }

    /// The step currently running, if any.
    pub fn running_step(&self) -> Option<&BuildStep> {
        self.steps.iter().find(|s| s.status == StepStatus::Running)
    }

    /// Synthetic package of a completed attempt.
    pub fn artifact(&self) -> Option<ApkArtifact> {
        if self.status != BuildStatus::Completed {
            return None;
        }
        let analysis = self.analysis.as_ref()?;
        let signature = self.signature.as_deref()?;
        Some(ApkArtifact::describe(analysis, signature))
    }
}

/// Handle to one interactive session.
#[derive(Clone)]
pub struct Session {
    state: std::sync::Arc<watch::Sender<SessionState>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::default());
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            state: std::sync::Arc::new(state),
            events,
        }
    }

    /// Current state, cloned.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> BuildStatus {
        self.state.borrow().status
    }

    /// Receive a new snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Receive every applied event in order.
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Apply an event and publish it.
    pub fn apply(&self, event: SessionEvent) {
        self.state.send_modify(|state| state.apply(&event));
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Start a new attempt if the session is at rest.
    ///
    /// The status check and the reset happen under one write, so two
    /// triggers can never both succeed.
    pub fn try_claim(&self, attempt_id: Uuid) -> bool {
        let event = SessionEvent::AttemptStarted { attempt_id };
        let claimed = self.state.send_if_modified(|state| {
            if !state.status.accepts_trigger() {
                return false;
            }
            state.apply(&event);
            true
        });
        if claimed {
            let _ = self.events.send(event);
        }
        claimed
    }
}
