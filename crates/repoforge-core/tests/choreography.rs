//! Integration tests for the build choreography against in-memory fakes.

use std::sync::Arc;

use repoforge_core::fakes::{
    FailingAnalyzer, FailingPacer, FailingSynthesizer, GatedPacer, InstantPacer, RecordingPacer,
    ScriptedSynthesizer, StaticAnalyzer,
};
use repoforge_core::{
    fallback_build_logs, is_well_formed, AppIcon, AttemptOutcome, BuildChoreographer,
    BuildComplexity, BuildRequest, BuildStatus, LogLevel, OfflineAnalyzer, OfflineSynthesizer,
    Pause, RepoAnalysis, Session, SessionEvent, SessionState, StageTimings, StepId, StepStatus,
    ValidationError, PROGRESS_MAX,
};
use tokio::sync::broadcast;

const REPO: &str = "https://github.com/acme/app";

fn icon() -> AppIcon {
    AppIcon::from_bytes(vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0])
        .expect("png magic")
}

fn acme_analysis() -> RepoAnalysis {
    RepoAnalysis {
        project_name: "Acme App".to_string(),
        detected_framework: "Flutter".to_string(),
        dependencies: ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect(),
        estimated_size: "20MB".to_string(),
        build_complexity: BuildComplexity::Medium,
    }
}

fn transcript(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("> Task :app:step{i}")).collect()
}

fn choreographer(analysis: RepoAnalysis, lines: Vec<String>) -> BuildChoreographer {
    BuildChoreographer::new(
        Session::new(),
        Arc::new(StaticAnalyzer::new(analysis)),
        Arc::new(ScriptedSynthesizer::new(lines)),
    )
    .with_pacer(Arc::new(InstantPacer))
}

fn request() -> BuildRequest {
    BuildRequest::new(REPO, Some(icon()))
}

/// Drain every event currently buffered on the receiver.
fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Replay events one at a time, returning every intermediate state.
fn replay(events: &[SessionEvent]) -> Vec<SessionState> {
    let mut state = SessionState::default();
    events
        .iter()
        .map(|event| {
            state.apply(event);
            state.clone()
        })
        .collect()
}

/// Test: every intermediate step list is a completed prefix, at most one
/// running or failed step, then pending steps
#[tokio::test]
async fn test_step_prefix_holds_after_every_event() {
    let c = choreographer(acme_analysis(), transcript(8));
    let mut rx = c.session().events();

    let outcome = c.start_build(&request()).await.expect("valid request");
    assert_eq!(outcome, AttemptOutcome::Completed);

    let states = replay(&drain(&mut rx));
    assert!(!states.is_empty());
    for (i, state) in states.iter().enumerate() {
        assert!(
            is_well_formed(&state.steps),
            "step list malformed after event {i}: {:?}",
            state.steps
        );
    }
}

/// Test: step prefix also holds when the attempt fails mid-way
#[tokio::test]
async fn test_step_prefix_holds_on_failure() {
    let c = choreographer(acme_analysis(), transcript(6))
        .with_pacer(Arc::new(FailingPacer::at(Pause::LogLine, "disk full")));
    let mut rx = c.session().events();

    c.start_build(&request()).await.expect("valid request");

    for state in replay(&drain(&mut rx)) {
        assert!(is_well_formed(&state.steps), "{:?}", state.steps);
    }
}

/// Test: progress never decreases and is 100 exactly when completed
#[tokio::test]
async fn test_progress_monotonic_and_full_only_on_completion() {
    let c = choreographer(acme_analysis(), transcript(20));
    let mut rx = c.session().events();

    c.start_build(&request()).await.expect("valid request");

    let states = replay(&drain(&mut rx));
    let mut last = 0;
    for state in &states {
        assert!(state.progress >= last, "progress went {last} -> {}", state.progress);
        assert_eq!(
            state.progress == PROGRESS_MAX,
            state.status == BuildStatus::Completed,
            "progress {} with status {}",
            state.progress,
            state.status
        );
        last = state.progress;
    }
    assert_eq!(last, PROGRESS_MAX);
}

/// Test: a failed attempt never reaches full progress
#[tokio::test]
async fn test_failed_attempt_progress_below_full() {
    let c = choreographer(acme_analysis(), transcript(4))
        .with_pacer(Arc::new(FailingPacer::at(Pause::Sign, "keystore locked")));

    c.start_build(&request()).await.expect("valid request");
    let state = c.session().snapshot();
    assert_eq!(state.status, BuildStatus::Failed);
    assert!(state.progress < PROGRESS_MAX);
}

/// Test: re-triggering in each busy status changes nothing
#[tokio::test]
async fn test_retrigger_while_busy_is_noop() {
    let gates = [
        (Pause::Clone, BuildStatus::Cloning),
        (Pause::Analysis, BuildStatus::Analyzing),
        (Pause::LogLine, BuildStatus::Building),
        (Pause::Sign, BuildStatus::Signing),
    ];

    for (pause, expected_status) in gates {
        let pacer = Arc::new(GatedPacer::at(pause));
        let c = choreographer(acme_analysis(), transcript(5)).with_pacer(pacer.clone());

        let runner = c.clone();
        let handle = tokio::spawn(async move { runner.start_build(&request()).await });

        pacer.reached().await;
        let before = c.session().snapshot();
        assert_eq!(before.status, expected_status);

        let again = c
            .start_build(&BuildRequest::new("https://github.com/other/repo", Some(icon())))
            .await
            .expect("busy check precedes validation");
        assert_eq!(again, AttemptOutcome::Ignored);
        assert_eq!(c.session().snapshot(), before);

        pacer.release();
        let outcome = handle.await.expect("join").expect("valid request");
        assert_eq!(outcome, AttemptOutcome::Completed);
    }
}

/// Test: busy session ignores even invalid triggers
#[tokio::test]
async fn test_retrigger_while_busy_skips_validation() {
    let pacer = Arc::new(GatedPacer::at(Pause::Optimize));
    let c = choreographer(acme_analysis(), transcript(3)).with_pacer(pacer.clone());

    let runner = c.clone();
    let handle = tokio::spawn(async move { runner.start_build(&request()).await });
    pacer.reached().await;

    let outcome = c
        .start_build(&BuildRequest::new("not-a-url", None))
        .await
        .expect("ignored, not rejected");
    assert_eq!(outcome, AttemptOutcome::Ignored);

    pacer.release();
    handle.await.expect("join").expect("valid request");
}

/// Test: scenario A, analysis surfaces in the console
#[tokio::test]
async fn test_analysis_logged() {
    let c = choreographer(acme_analysis(), transcript(4));
    c.start_build(&request()).await.expect("valid request");

    let state = c.session().snapshot();
    assert!(state.logs.iter().any(|l| l.level == LogLevel::Success
        && l.message.contains("Flutter")
        && l.message.contains("Acme App")));

    let deps = state
        .logs
        .iter()
        .find(|l| l.message.starts_with("Dependencies found:"))
        .expect("dependency log");
    assert_eq!(deps.message, "Dependencies found: a, b, c...");
    assert!(!deps.message.contains(", d"));
    assert_eq!(state.analysis, Some(acme_analysis()));
}

/// Test: scenario B, invalid URL rejected before any mutation
#[tokio::test]
async fn test_invalid_url_rejected() {
    let c = choreographer(acme_analysis(), transcript(4));
    let mut rx = c.session().events();

    let err = c
        .start_build(&BuildRequest::new("not-a-url", Some(icon())))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::MissingHostMarker {
            repo_url: "not-a-url".to_string()
        }
    );

    let state = c.session().snapshot();
    assert_eq!(state.status, BuildStatus::Idle);
    assert!(state.logs.is_empty());
    assert!(drain(&mut rx).is_empty());
}

/// Test: scenario C, missing icon rejected regardless of URL
#[tokio::test]
async fn test_missing_icon_rejected() {
    let c = choreographer(acme_analysis(), transcript(4));

    let err = c
        .start_build(&BuildRequest::new(REPO, None))
        .await
        .unwrap_err();
    assert_eq!(err, ValidationError::MissingIcon);
    assert_eq!(c.session().snapshot(), SessionState::default());

    // A prior completed attempt stays as it was.
    c.start_build(&request()).await.expect("valid request");
    let completed = c.session().snapshot();
    assert!(c
        .start_build(&BuildRequest::new("not-a-url", None))
        .await
        .is_err());
    assert_eq!(c.session().snapshot(), completed);
}

/// Test: scenario D, error lines are tagged and the handoff stays at line 3
#[tokio::test]
async fn test_error_line_tagged_and_handoff_fixed() {
    let lines = vec![
        "> Configure project :app".to_string(),
        "> Task :app:preBuild UP-TO-DATE".to_string(),
        "w: ERROR: deprecated API usage".to_string(),
        "> Task :app:compileDebugKotlin".to_string(),
        "> Task :app:assembleDebug".to_string(),
    ];
    let c = choreographer(acme_analysis(), lines.clone());
    let mut rx = c.session().events();

    let outcome = c.start_build(&request()).await.expect("valid request");
    assert_eq!(outcome, AttemptOutcome::Completed);

    let state = c.session().snapshot();
    let tagged = state
        .logs
        .iter()
        .find(|l| l.message == lines[2])
        .expect("error line logged");
    assert_eq!(tagged.level, LogLevel::Error);
    for line in [&lines[0], &lines[1], &lines[3]] {
        let log = state.logs.iter().find(|l| &l.message == line).expect("line");
        assert_eq!(log.level, LogLevel::Info);
    }

    // Count synthesized lines logged before compilation starts.
    let mut streamed = None;
    for event in drain(&mut rx) {
        match event {
            SessionEvent::LogAppended { log } if log.message == "Starting Gradle sync..." => {
                streamed = Some(0);
            }
            SessionEvent::LogAppended { .. } => {
                if let Some(n) = streamed.as_mut() {
                    *n += 1;
                }
            }
            SessionEvent::StepChanged {
                step: StepId::Compilation,
                status: StepStatus::Running,
            } => break,
            _ => {}
        }
    }
    assert_eq!(streamed, Some(3));
}

/// Test: scenario E, analyzer failure falls back and the attempt completes
#[tokio::test]
async fn test_analyzer_failure_falls_back() {
    let synthesizer = Arc::new(ScriptedSynthesizer::new(transcript(4)));
    let c = BuildChoreographer::new(
        Session::new(),
        Arc::new(FailingAnalyzer::transport("connection refused")),
        synthesizer.clone(),
    )
    .with_pacer(Arc::new(InstantPacer));

    let outcome = c.start_build(&request()).await.expect("valid request");
    assert_eq!(outcome, AttemptOutcome::Completed);

    let state = c.session().snapshot();
    assert_eq!(state.status, BuildStatus::Completed);
    assert_eq!(state.analysis, Some(RepoAnalysis::fallback()));
    assert_eq!(synthesizer.seen(), vec![RepoAnalysis::fallback()]);
    assert!(state.logs.iter().all(|l| l.level != LogLevel::Error));
    assert!(state
        .logs
        .iter()
        .any(|l| l.message.contains("Unknown Project")));
}

/// Test: synthesizer failure streams the two fallback lines
#[tokio::test]
async fn test_synthesizer_failure_falls_back() {
    let c = BuildChoreographer::new(
        Session::new(),
        Arc::new(StaticAnalyzer::new(acme_analysis())),
        Arc::new(FailingSynthesizer::malformed("not an array")),
    )
    .with_pacer(Arc::new(InstantPacer));

    let outcome = c.start_build(&request()).await.expect("valid request");
    assert_eq!(outcome, AttemptOutcome::Completed);

    let state = c.session().snapshot();
    for line in fallback_build_logs() {
        assert!(state.logs.iter().any(|l| l.message == line));
    }
    assert!(state.steps.iter().all(|s| s.status == StepStatus::Completed));
}

/// Test: a stage error fails the running step and logs exactly one error
#[tokio::test]
async fn test_stage_error_fails_running_step() {
    let c = choreographer(acme_analysis(), transcript(4))
        .with_pacer(Arc::new(FailingPacer::at(Pause::Optimize, "out of memory")));

    let outcome = c.start_build(&request()).await.expect("valid request");
    assert_eq!(
        outcome,
        AttemptOutcome::Failed {
            error: "stage interrupted: out of memory".to_string()
        }
    );

    let state = c.session().snapshot();
    assert_eq!(state.status, BuildStatus::Failed);
    let statuses: Vec<StepStatus> = state.steps.iter().map(|s| s.status).collect();
    assert_eq!(
        statuses,
        vec![
            StepStatus::Completed,
            StepStatus::Completed,
            StepStatus::Completed,
            StepStatus::Completed,
            StepStatus::Failed,
            StepStatus::Pending,
        ]
    );

    let errors: Vec<_> = state
        .logs
        .iter()
        .filter(|l| l.level == LogLevel::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "Build failed: stage interrupted: out of memory"
    );
    assert!(state.artifact().is_none());
}

/// Test: a failed session accepts a new trigger
#[tokio::test]
async fn test_failed_session_accepts_new_attempt() {
    let session = Session::new();
    let failing = BuildChoreographer::new(
        session.clone(),
        Arc::new(StaticAnalyzer::new(acme_analysis())),
        Arc::new(ScriptedSynthesizer::new(transcript(4))),
    )
    .with_pacer(Arc::new(FailingPacer::at(Pause::Clone, "offline")));
    failing.start_build(&request()).await.expect("valid request");
    assert_eq!(session.status(), BuildStatus::Failed);

    let working = failing.clone().with_pacer(Arc::new(InstantPacer));
    let outcome = working.start_build(&request()).await.expect("valid request");
    assert_eq!(outcome, AttemptOutcome::Completed);
    assert!(session
        .snapshot()
        .logs
        .iter()
        .all(|l| l.level != LogLevel::Error));
}

/// Test: two consecutive attempts produce independent log streams
#[tokio::test]
async fn test_consecutive_attempts_are_independent() {
    let c = choreographer(acme_analysis(), transcript(5));

    c.start_build(&request()).await.expect("valid request");
    let first = c.session().snapshot();

    c.start_build(&request()).await.expect("valid request");
    let second = c.session().snapshot();

    assert_ne!(first.attempt_id, second.attempt_id);
    assert_eq!(first.logs.len(), second.logs.len());
    assert!(second
        .logs
        .iter()
        .all(|l| l.timestamp >= first.logs.last().expect("logs").timestamp));
    assert_eq!(second.status, BuildStatus::Completed);
    assert_eq!(second.progress, PROGRESS_MAX);
}

/// Test: the choreographer pauses in stage order with the configured timings
#[tokio::test]
async fn test_pause_order_and_timings() {
    let pacer = Arc::new(RecordingPacer::new());
    let timings = StageTimings::default();
    let c = choreographer(acme_analysis(), transcript(3))
        .with_pacer(pacer.clone())
        .with_timings(timings);

    c.start_build(&request()).await.expect("valid request");

    let pauses = pacer.pauses();
    let order: Vec<Pause> = pauses.iter().map(|(p, _)| *p).collect();
    assert_eq!(
        order,
        vec![
            Pause::Clone,
            Pause::Analysis,
            Pause::LogLine,
            Pause::LogLine,
            Pause::LogLine,
            Pause::Optimize,
            Pause::Sign,
        ]
    );
    for (pause, duration) in pauses {
        assert_eq!(duration, timings.for_pause(pause));
    }
}

/// Test: a full run on the tokio timer takes the sum of its delays
#[tokio::test(start_paused = true)]
async fn test_default_pacing_on_paused_clock() {
    let c = BuildChoreographer::new(
        Session::new(),
        Arc::new(StaticAnalyzer::new(acme_analysis())),
        Arc::new(ScriptedSynthesizer::new(transcript(5))),
    );
    let start = tokio::time::Instant::now();

    c.start_build(&request()).await.expect("valid request");

    // 1500 + 1000 + 5 * 400 + 2000 + 1500
    assert!(start.elapsed() >= std::time::Duration::from_millis(8000));
    assert_eq!(c.session().status(), BuildStatus::Completed);
}

/// Test: offline collaborators drive a complete attempt
#[tokio::test]
async fn test_offline_collaborators_complete() {
    let c = BuildChoreographer::new(
        Session::new(),
        Arc::new(OfflineAnalyzer::new()),
        Arc::new(OfflineSynthesizer::new()),
    )
    .with_pacer(Arc::new(InstantPacer));

    let outcome = c
        .start_build(&BuildRequest::new(
            "https://github.com/flutter/gallery",
            Some(icon()),
        ))
        .await
        .expect("valid request");
    assert_eq!(outcome, AttemptOutcome::Completed);

    let artifact = c.session().snapshot().artifact().expect("artifact");
    assert!(artifact.file_name.ends_with("-debug.apk"));
    assert_eq!(artifact.platform, "Android SDK 34");
}
