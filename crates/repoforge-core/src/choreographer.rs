//! The build choreographer: one attempt as an ordered chain of stages.
//!
//! Each stage writes to the [`Session`] through [`SessionEvent`]s and
//! returns `Result<(), StageError>`. The first error ends the attempt and is
//! applied once as [`SessionEvent::AttemptFailed`]. There is no retry, no
//! rollback of completed steps and no cancellation.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::collaborators::{
    analyze_or_fallback, synthesize_or_fallback, LogSynthesizer, RepoAnalyzer,
};
use crate::domain::{
    signing_fingerprint, AppIcon, BuildLog, BuildRequest, BuildStatus, LogLevel, RepoAnalysis,
    StageError, StepId, StepStatus, ValidationError,
};
use crate::obs;
use crate::session::{Session, SessionEvent, PROGRESS_MAX};
use crate::timing::{Pause, Pacer, StageTimings, TokioPacer};

/// Gauge value after cloning.
pub const PROGRESS_CLONED: u8 = 20;
/// Gauge value after analysis.
pub const PROGRESS_ANALYZED: u8 = 40;
/// Gauge increment per synthesized build line.
pub const PROGRESS_PER_LINE: u8 = 4;
/// Highest value reachable while streaming build lines.
pub const PROGRESS_COMPILE_CAP: u8 = 85;
/// Gauge value after optimization.
pub const PROGRESS_OPTIMIZED: u8 = 92;

/// Index of the synthesized line at which Gradle sync hands over to compilation.
pub const COMPILE_HANDOFF_LINE: usize = 3;

/// Result of a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// An attempt was already running; nothing changed.
    Ignored,
    Completed,
    Failed { error: String },
}

/// Runs build attempts against one session.
#[derive(Clone)]
pub struct BuildChoreographer {
    session: Session,
    analyzer: Arc<dyn RepoAnalyzer>,
    synthesizer: Arc<dyn LogSynthesizer>,
    pacer: Arc<dyn Pacer>,
    timings: StageTimings,
}

impl BuildChoreographer {
    pub fn new(
        session: Session,
        analyzer: Arc<dyn RepoAnalyzer>,
        synthesizer: Arc<dyn LogSynthesizer>,
    ) -> Self {
        Self {
            session,
            analyzer,
            synthesizer,
            pacer: Arc::new(TokioPacer),
            timings: StageTimings::default(),
        }
    }

    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn with_timings(mut self, timings: StageTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn timings(&self) -> StageTimings {
        self.timings
    }

    /// Trigger one attempt and run it to completion or failure.
    ///
    /// A busy session yields [`AttemptOutcome::Ignored`] and invalid input
    /// yields a [`ValidationError`]; neither touches session state.
    pub async fn start_build(
        &self,
        request: &BuildRequest,
    ) -> Result<AttemptOutcome, ValidationError> {
        let status = self.session.status();
        if !status.accepts_trigger() {
            obs::emit_trigger_ignored(status.label());
            return Ok(AttemptOutcome::Ignored);
        }

        request.validate()?;

        let attempt_id = Uuid::new_v4();
        if !self.session.try_claim(attempt_id) {
            obs::emit_trigger_ignored(self.session.status().label());
            return Ok(AttemptOutcome::Ignored);
        }

        let attempt = attempt_id.to_string();
        let span = obs::attempt_span(&attempt);
        let started = Instant::now();
        obs::emit_attempt_started(&attempt, &request.repo_url);

        let result = self.run_stages(request).instrument(span).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(()) => {
                obs::emit_attempt_finished(&attempt, duration_ms, true);
                Ok(AttemptOutcome::Completed)
            }
            Err(err) => {
                let error = err.to_string();
                self.session.apply(SessionEvent::AttemptFailed {
                    error: error.clone(),
                });
                obs::emit_attempt_finished(&attempt, duration_ms, false);
                Ok(AttemptOutcome::Failed { error })
            }
        }
    }

    async fn run_stages(&self, request: &BuildRequest) -> Result<(), StageError> {
        self.clone_stage(&request.repo_url).await?;
        let analysis = self.analyze_stage(&request.repo_url).await?;
        self.compile_stage(&analysis).await?;
        self.optimize_stage().await?;
        self.sign_stage(request).await?;
        self.finish_stage();
        Ok(())
    }

    async fn clone_stage(&self, repo_url: &str) -> Result<(), StageError> {
        let started = self.begin_step(StepId::SourceControl);
        self.log(BuildLog::info("Connecting to GitHub..."));
        self.log(BuildLog::info(format!("Cloning repository: {repo_url}...")));
        self.pause(Pause::Clone).await?;
        self.end_step(StepId::SourceControl, started);
        self.progress(PROGRESS_CLONED);
        Ok(())
    }

    async fn analyze_stage(&self, repo_url: &str) -> Result<RepoAnalysis, StageError> {
        self.status(BuildStatus::Analyzing);
        let started = self.begin_step(StepId::AiAnalysis);
        self.log(BuildLog::info("AI analyzing project structure..."));

        let analysis = analyze_or_fallback(self.analyzer.as_ref(), repo_url).await;
        self.session.apply(SessionEvent::AnalysisStored {
            analysis: analysis.clone(),
        });
        self.log(BuildLog::success(format!(
            "{} project detected: {}",
            analysis.detected_framework, analysis.project_name
        )));
        self.log(BuildLog::info(format!(
            "Dependencies found: {}...",
            analysis.dependency_preview()
        )));

        self.pause(Pause::Analysis).await?;
        self.end_step(StepId::AiAnalysis, started);
        self.progress(PROGRESS_ANALYZED);
        Ok(analysis)
    }

    async fn compile_stage(&self, analysis: &RepoAnalysis) -> Result<(), StageError> {
        self.status(BuildStatus::Building);
        let sync_started = self.begin_step(StepId::GradleSync);
        self.log(BuildLog::info("Starting Gradle sync..."));

        let lines = synthesize_or_fallback(self.synthesizer.as_ref(), analysis).await;
        let mut compile_started = None;

        for (idx, line) in lines.iter().enumerate() {
            if idx == COMPILE_HANDOFF_LINE {
                self.end_step(StepId::GradleSync, sync_started);
                compile_started = Some(self.begin_step(StepId::Compilation));
            }
            debug!(line = idx as u64, "streaming build line");
            self.log(BuildLog::new(line.as_str(), LogLevel::classify(line)));
            self.session.apply(SessionEvent::ProgressAdvanced {
                by: PROGRESS_PER_LINE,
                cap: PROGRESS_COMPILE_CAP,
            });
            self.pause(Pause::LogLine).await?;
        }

        // Short transcripts never reach the handoff line.
        let compile_started = match compile_started {
            Some(started) => started,
            None => {
                self.end_step(StepId::GradleSync, sync_started);
                self.begin_step(StepId::Compilation)
            }
        };
        self.end_step(StepId::Compilation, compile_started);
        Ok(())
    }

    async fn optimize_stage(&self) -> Result<(), StageError> {
        let started = self.begin_step(StepId::Optimization);
        self.log(BuildLog::info("Optimizing APK resources..."));
        self.pause(Pause::Optimize).await?;
        self.end_step(StepId::Optimization, started);
        self.progress(PROGRESS_OPTIMIZED);
        Ok(())
    }

    async fn sign_stage(&self, request: &BuildRequest) -> Result<(), StageError> {
        self.status(BuildStatus::Signing);
        let started = self.begin_step(StepId::Signing);

        let icon = request.icon.as_ref().map(AppIcon::bytes).unwrap_or_default();
        let signature = signing_fingerprint(&request.repo_url, icon);
        self.log(BuildLog::info(format!(
            "Generating debug signature (SHA-256 {})...",
            &signature[..12]
        )));
        self.session
            .apply(SessionEvent::SignatureIssued { signature });

        self.pause(Pause::Sign).await?;
        self.end_step(StepId::Signing, started);
        Ok(())
    }

    fn finish_stage(&self) {
        self.status(BuildStatus::Completed);
        self.progress(PROGRESS_MAX);
        self.log(BuildLog::success("Build succeeded! APK generated."));
    }

    fn begin_step(&self, step: StepId) -> Instant {
        self.session.apply(SessionEvent::StepChanged {
            step,
            status: StepStatus::Running,
        });
        obs::emit_stage_started(step);
        Instant::now()
    }

    fn end_step(&self, step: StepId, started: Instant) {
        self.session.apply(SessionEvent::StepChanged {
            step,
            status: StepStatus::Completed,
        });
        obs::emit_stage_finished(step, started.elapsed().as_millis() as u64);
    }

    fn status(&self, status: BuildStatus) {
        self.session.apply(SessionEvent::StatusChanged { status });
    }

    fn progress(&self, value: u8) {
        self.session.apply(SessionEvent::ProgressSet { value });
    }

    fn log(&self, log: BuildLog) {
        self.session.apply(SessionEvent::LogAppended { log });
    }

    async fn pause(&self, pause: Pause) -> Result<(), StageError> {
        self.pacer
            .pause(pause, self.timings.for_pause(pause))
            .await
    }
}
