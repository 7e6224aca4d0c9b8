//! In-memory fakes for collaborator and pacer traits (testing only)
//!
//! Provides scripted analyzers, synthesizers and pacers that satisfy the
//! trait contracts without a remote service or wall-clock delays.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::collaborators::{LogSynthesizer, RepoAnalyzer};
use crate::domain::{CollaboratorError, RepoAnalysis, StageError};
use crate::timing::{Pause, Pacer};

// ---------------------------------------------------------------------------
// Analyzers
// ---------------------------------------------------------------------------

/// Analyzer returning a fixed record and remembering every URL it saw.
#[derive(Debug)]
pub struct StaticAnalyzer {
    analysis: RepoAnalysis,
    calls: Mutex<Vec<String>>,
}

impl StaticAnalyzer {
    pub fn new(analysis: RepoAnalysis) -> Self {
        Self {
            analysis,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepoAnalyzer for StaticAnalyzer {
    async fn analyze(&self, repo_url: &str) -> Result<RepoAnalysis, CollaboratorError> {
        self.calls.lock().unwrap().push(repo_url.to_string());
        Ok(self.analysis.clone())
    }
}

/// Analyzer that always fails.
#[derive(Debug)]
pub struct FailingAnalyzer {
    message: String,
}

impl FailingAnalyzer {
    pub fn transport(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl RepoAnalyzer for FailingAnalyzer {
    async fn analyze(&self, _repo_url: &str) -> Result<RepoAnalysis, CollaboratorError> {
        Err(CollaboratorError::Transport(self.message.clone()))
    }
}

// ---------------------------------------------------------------------------
// Synthesizers
// ---------------------------------------------------------------------------

/// Synthesizer returning a fixed transcript and remembering its inputs.
#[derive(Debug)]
pub struct ScriptedSynthesizer {
    lines: Vec<String>,
    seen: Mutex<Vec<RepoAnalysis>>,
}

impl ScriptedSynthesizer {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<RepoAnalysis> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogSynthesizer for ScriptedSynthesizer {
    async fn synthesize(&self, analysis: &RepoAnalysis) -> Result<Vec<String>, CollaboratorError> {
        self.seen.lock().unwrap().push(analysis.clone());
        Ok(self.lines.clone())
    }
}

/// Synthesizer that always returns a malformed-response error.
#[derive(Debug)]
pub struct FailingSynthesizer {
    message: String,
}

impl FailingSynthesizer {
    pub fn malformed(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl LogSynthesizer for FailingSynthesizer {
    async fn synthesize(&self, _analysis: &RepoAnalysis) -> Result<Vec<String>, CollaboratorError> {
        Err(CollaboratorError::Malformed(self.message.clone()))
    }
}

// ---------------------------------------------------------------------------
// Pacers
// ---------------------------------------------------------------------------

/// Pacer that never waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantPacer;

#[async_trait]
impl Pacer for InstantPacer {
    async fn pause(&self, _pause: Pause, _duration: Duration) -> Result<(), StageError> {
        Ok(())
    }
}

/// Pacer that fails the first time it reaches `at`.
#[derive(Debug)]
pub struct FailingPacer {
    at: Pause,
    message: String,
}

impl FailingPacer {
    pub fn at(at: Pause, message: &str) -> Self {
        Self {
            at,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl Pacer for FailingPacer {
    async fn pause(&self, pause: Pause, _duration: Duration) -> Result<(), StageError> {
        if pause == self.at {
            return Err(StageError::Interrupted(self.message.clone()));
        }
        Ok(())
    }
}

/// Pacer that records every requested pause without waiting.
#[derive(Debug, Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<(Pause, Duration)>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> Vec<(Pause, Duration)> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, pause: Pause, duration: Duration) -> Result<(), StageError> {
        self.pauses.lock().unwrap().push((pause, duration));
        Ok(())
    }
}

/// Pacer that blocks the first time it reaches `at` until
/// [`GatedPacer::release`] is called. Later pauses pass straight through.
#[derive(Debug)]
pub struct GatedPacer {
    at: Pause,
    tripped: AtomicBool,
    reached: Notify,
    gate: Notify,
}

impl GatedPacer {
    pub fn at(at: Pause) -> Self {
        Self {
            at,
            tripped: AtomicBool::new(false),
            reached: Notify::new(),
            gate: Notify::new(),
        }
    }

    /// Wait until an attempt is parked at the gate.
    pub async fn reached(&self) {
        self.reached.notified().await;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl Pacer for GatedPacer {
    async fn pause(&self, pause: Pause, _duration: Duration) -> Result<(), StageError> {
        if pause == self.at && !self.tripped.swap(true, Ordering::SeqCst) {
            self.reached.notify_one();
            self.gate.notified().await;
        }
        Ok(())
    }
}
