//! Structured observability hooks for build attempts.
//!
//! This module provides:
//! - An attempt-scoped tracing span via `attempt_span`
//! - Emission functions for lifecycle events: start, stage boundaries,
//!   collaborator fallback, finish
//!
//! These are operator logs. The user-facing console lives in the session
//! state and is not routed through tracing.

use tracing::{info, warn};

use crate::domain::StepId;

/// Span covering one attempt. Attach it with `tracing::Instrument` so it
/// follows the attempt future across await points.
pub fn attempt_span(attempt_id: &str) -> tracing::Span {
    tracing::info_span!("repoforge.attempt", attempt_id = %attempt_id)
}

/// Emit event: attempt accepted for a repository.
pub fn emit_attempt_started(attempt_id: &str, repo_url: &str) {
    info!(event = "attempt.started", attempt_id = %attempt_id, repo_url = %repo_url);
}

/// Emit event: a step began running.
pub fn emit_stage_started(step: StepId) {
    info!(event = "stage.started", step = step.number() as u64, name = %step.name());
}

/// Emit event: a step finished.
pub fn emit_stage_finished(step: StepId, duration_ms: u64) {
    info!(
        event = "stage.finished",
        step = step.number() as u64,
        name = %step.name(),
        duration_ms = duration_ms,
    );
}

/// Emit event: a collaborator failed and its fallback value was used.
pub fn emit_collaborator_fallback(collaborator: &str, error: &dyn std::fmt::Display) {
    warn!(
        event = "collaborator.fallback",
        collaborator = %collaborator,
        error = %error,
    );
}

/// Emit event: trigger ignored because an attempt is already running.
pub fn emit_trigger_ignored(status: &str) {
    info!(event = "attempt.ignored", status = %status);
}

/// Emit event: attempt finished with its outcome.
pub fn emit_attempt_finished(attempt_id: &str, duration_ms: u64, success: bool) {
    info!(
        event = "attempt.finished",
        attempt_id = %attempt_id,
        duration_ms = duration_ms,
        success = success,
    );
}
