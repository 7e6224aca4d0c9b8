//! Terminal rendering of a build session.
//!
//! The renderer keeps its own copy of the session state and folds every
//! received event into it, so what it prints never races the choreographer.

use owo_colors::{OwoColorize, Style};
use repoforge_core::{
    ApkArtifact, BuildLog, BuildStatus, BuildStep, LogLevel, RepoAnalysis, SessionEvent,
    SessionState, StepStatus, PROGRESS_MAX,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Plain,
    Bold,
    Dim,
    Red,
    Green,
    Yellow,
    Magenta,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Tone::Plain => Style::new(),
            Tone::Bold => Style::new().bold(),
            Tone::Dim => Style::new().dimmed(),
            Tone::Red => Style::new().red().bold(),
            Tone::Green => Style::new().green(),
            Tone::Yellow => Style::new().yellow(),
            Tone::Magenta => Style::new().magenta(),
        }
    }
}

const BAR_WIDTH: usize = 30;
const DEVICE_LABEL_WIDTH: usize = 12;

/// Name shown on the device preview when no analysis is stored.
const DEFAULT_APP_NAME: &str = "My App";

/// Text shown before the first build of a session.
pub const IDLE_GUIDE: &str = "How it works\n\
    Paste your repository link and choose an image for the icon. RepoForge will \
    clone your Android project, analyze its framework with Gemini AI and compile \
    a signed APK ready to install.";

pub struct Renderer {
    state: SessionState,
    color: bool,
    icon_marker: String,
}

impl Renderer {
    pub fn new(color: bool, icon_marker: impl Into<String>) -> Self {
        Self {
            state: SessionState::default(),
            color,
            icon_marker: icon_marker.into(),
        }
    }

    /// Fold `event` into the local state and return the text to print.
    pub fn handle(&mut self, event: &SessionEvent) -> String {
        self.state.apply(event);
        match event {
            SessionEvent::AttemptStarted { attempt_id } => format!(
                "{}\n{}",
                self.paint(Tone::Bold, &format!("Build attempt {attempt_id}")),
                self.steps()
            ),
            SessionEvent::StatusChanged { status } => {
                self.paint(Tone::Magenta, &format!("== {} ==", status.label()))
            }
            SessionEvent::StepChanged { step, .. } => self.step_line(self.state.step(*step)),
            SessionEvent::LogAppended { log } => self.log_line(log),
            SessionEvent::ProgressSet { .. } | SessionEvent::ProgressAdvanced { .. } => {
                self.progress_bar()
            }
            SessionEvent::AnalysisStored { analysis } => self.analysis_panel(analysis),
            SessionEvent::AttemptFailed { .. } => {
                let mut out = String::new();
                if let Some(log) = self.state.logs.last() {
                    out.push_str(&self.log_line(log));
                    out.push('\n');
                }
                out.push_str(&self.steps());
                out
            }
            SessionEvent::SignatureIssued { .. } => String::new(),
        }
    }

    /// Closing text once the attempt has ended.
    pub fn finish(&self) -> String {
        match self.state.status {
            BuildStatus::Completed => {
                let name = self
                    .state
                    .analysis
                    .as_ref()
                    .map(|a| a.project_name.as_str())
                    .unwrap_or(DEFAULT_APP_NAME);
                let mut out = String::new();
                if let Some(artifact) = self.state.artifact() {
                    out.push_str(&self.artifact_card(&artifact));
                    out.push('\n');
                }
                out.push_str(&device_preview(&self.icon_marker, name));
                out
            }
            BuildStatus::Failed => self.paint(Tone::Red, "Build failed."),
            _ => String::new(),
        }
    }

    /// `[HH:MM:SS] message`, coloured by severity.
    pub fn log_line(&self, log: &BuildLog) -> String {
        let color = match log.level {
            LogLevel::Error => Tone::Red,
            LogLevel::Success => Tone::Green,
            LogLevel::Warning => Tone::Yellow,
            LogLevel::Info => Tone::Plain,
        };
        format!(
            "{} {}",
            self.paint(Tone::Dim, &format!("[{}]", log.clock())),
            self.paint(color, &log.message)
        )
    }

    pub fn step_line(&self, step: &BuildStep) -> String {
        let (marker, color) = match step.status {
            StepStatus::Pending => ("[ ]", Tone::Dim),
            StepStatus::Running => ("[>]", Tone::Yellow),
            StepStatus::Completed => ("[x]", Tone::Green),
            StepStatus::Failed => ("[!]", Tone::Red),
        };
        format!(
            "{} {}. {}: {}",
            self.paint(color, marker),
            step.id.number(),
            step.name(),
            step.description()
        )
    }

    pub fn steps(&self) -> String {
        self.state
            .steps
            .iter()
            .map(|s| self.step_line(s))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn progress_bar(&self) -> String {
        let value = self.state.progress.min(PROGRESS_MAX) as usize;
        let filled = value * BAR_WIDTH / PROGRESS_MAX as usize;
        format!(
            "[{}{}] {value:>3}%",
            "#".repeat(filled),
            "-".repeat(BAR_WIDTH - filled)
        )
    }

    pub fn analysis_panel(&self, analysis: &RepoAnalysis) -> String {
        format!(
            "{}\n  Framework:  {}\n  Size:       {}\n  Complexity: {}\n  Platform:   {}",
            self.paint(Tone::Bold, "AI Summary"),
            analysis.detected_framework,
            analysis.estimated_size,
            analysis.build_complexity,
            repoforge_core::domain::TARGET_PLATFORM,
        )
    }

    pub fn artifact_card(&self, artifact: &ApkArtifact) -> String {
        format!(
            "{}\nOptimized and signed file ready for distribution.\n  File:      {}\n  Package:   {}\n  Size:      {}\n  Signature: {}",
            self.paint(Tone::Green, "APK ready!"),
            artifact.file_name,
            artifact.package_id,
            artifact.estimated_size,
            short_signature(&artifact.signature),
        )
    }

    fn paint(&self, tone: Tone, text: &str) -> String {
        if self.color && tone != Tone::Plain {
            text.style(tone.style()).to_string()
        } else {
            text.to_string()
        }
    }
}

/// First 16 hex digits, grouped in pairs.
fn short_signature(signature: &str) -> String {
    signature
        .as_bytes()
        .chunks(2)
        .take(8)
        .map(|pair| String::from_utf8_lossy(pair).to_uppercase())
        .collect::<Vec<_>>()
        .join(":")
}

/// Cut `text` to `width` characters, marking the cut with `..`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(2)).collect();
    format!("{kept}..")
}

/// ASCII phone home screen with the installed app.
pub fn device_preview(icon_marker: &str, app_name: &str) -> String {
    let inner = DEVICE_LABEL_WIDTH + 4;
    let center = |s: &str| format!("|{:^inner$}|", s);
    [
        "Device preview".to_string(),
        format!(".{}.", "-".repeat(inner)),
        center("----"),
        center(""),
        center(&format!("[{}]", truncate(icon_marker, DEVICE_LABEL_WIDTH - 2))),
        center(&truncate(app_name, DEVICE_LABEL_WIDTH)),
        center(""),
        center(""),
        format!("'{}'", "-".repeat(inner)),
        "Installed successfully".to_string(),
    ]
    .join("\n")
}
