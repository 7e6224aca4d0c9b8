//! RepoForge - GitHub repository to APK build simulator
//!
//! The `repoforge` command runs one simulated build session in the terminal.
//!
//! ## Commands
//!
//! - `build`: run the six-step build for a repository and an icon
//! - `analyze`: print the analysis a build would store
//! - `steps`: list the build timeline

mod icon;
mod render;

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn, Level};

use repoforge_core::{
    analyze_or_fallback, check_repo_url, AttemptOutcome, BuildChoreographer, BuildRequest,
    ForgeError, LogSynthesizer, OfflineAnalyzer, OfflineSynthesizer, RepoAnalyzer, Session,
    SessionEvent, StageTimings, StepId,
};
use repoforge_gemini::{GeminiAnalyzer, GeminiClient, GeminiConfig, GeminiSynthesizer};

use crate::render::{Renderer, IDLE_GUIDE};

#[derive(Parser)]
#[command(name = "repoforge")]
#[command(author = "RepoForge Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "GitHub repository to APK build simulator", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines and session events
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an APK from a GitHub repository
    Build {
        /// Repository URL (must point at github.com)
        repo_url: String,

        /// Image file used as the app icon (PNG, JPEG, GIF or WebP)
        #[arg(short, long)]
        icon: Option<PathBuf>,

        /// Use local collaborators instead of the remote model
        #[arg(long)]
        offline: bool,

        /// Playback speed; 2 halves every delay, 0 removes them
        #[arg(long, default_value = "1.0", value_parser = parse_speed)]
        speed: f64,
    },

    /// Analyze a repository without building it
    Analyze {
        /// Repository URL
        repo_url: String,

        /// Use the local analyzer instead of the remote model
        #[arg(long)]
        offline: bool,
    },

    /// List the build steps
    Steps,
}

/// Slowest accepted playback speed other than 0.
const MIN_SPEED: f64 = 0.01;

fn parse_speed(raw: &str) -> std::result::Result<f64, String> {
    let speed: f64 = raw.parse().map_err(|_| format!("'{raw}' is not a number"))?;
    if !speed.is_finite() || speed < 0.0 {
        return Err("speed must be a non-negative number".to_string());
    }
    if speed > 0.0 && speed < MIN_SPEED {
        return Err(format!("speed must be 0 or at least {MIN_SPEED}"));
    }
    Ok(speed)
}

fn timings_for(speed: f64) -> StageTimings {
    if speed == 0.0 {
        StageTimings::instant()
    } else {
        StageTimings::default().scaled(1.0 / speed)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    repoforge_core::telemetry::init_tracing(cli.json, level);

    match cli.command {
        Some(Commands::Build {
            repo_url,
            icon,
            offline,
            speed,
        }) => cmd_build(&repo_url, icon, offline, speed, cli.json).await,
        Some(Commands::Analyze { repo_url, offline }) => {
            cmd_analyze(&repo_url, offline, cli.json).await
        }
        Some(Commands::Steps) => cmd_steps(cli.json),
        None => {
            println!("{IDLE_GUIDE}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

type Collaborators = (Arc<dyn RepoAnalyzer>, Arc<dyn LogSynthesizer>);

fn collaborators(offline: bool) -> Result<Collaborators> {
    if offline {
        info!("Using offline collaborators");
        return Ok((
            Arc::new(OfflineAnalyzer::new()),
            Arc::new(OfflineSynthesizer::new()),
        ));
    }

    let config = GeminiConfig::from_env();
    if config.api_key.is_none() {
        warn!("No API key set; analysis and build logs will use fallback values");
    }
    let client = GeminiClient::new(config).context("Failed to create model client")?;
    Ok((
        Arc::new(GeminiAnalyzer::new(client.clone())),
        Arc::new(GeminiSynthesizer::new(client)),
    ))
}

/// Collect the build inputs. The URL is checked before the icon file is
/// touched, so a bad URL reports the same message with or without `--icon`.
async fn prepare_request(
    repo_url: &str,
    icon_path: Option<&Path>,
) -> repoforge_core::Result<BuildRequest> {
    check_repo_url(repo_url)?;
    let icon = icon::load_icon(icon_path).await?;
    let request = BuildRequest::new(repo_url, icon);
    request.validate()?;
    Ok(request)
}

fn preflight_message(err: &ForgeError, icon_path: Option<&Path>) -> String {
    match (err, icon_path) {
        (ForgeError::Validation(err), _) => err.to_string(),
        (ForgeError::Icon(err), Some(path)) => {
            format!("Failed to load icon {}: {err}", path.display())
        }
        (err, _) => err.to_string(),
    }
}

async fn cmd_build(
    repo_url: &str,
    icon_path: Option<PathBuf>,
    offline: bool,
    speed: f64,
    json: bool,
) -> Result<ExitCode> {
    let request = match prepare_request(repo_url, icon_path.as_deref()).await {
        Ok(request) => request,
        Err(err) => {
            eprintln!("{}", preflight_message(&err, icon_path.as_deref()));
            return Ok(ExitCode::from(2));
        }
    };
    let marker = icon::marker(request.icon.as_ref());

    let (analyzer, synthesizer) = collaborators(offline)?;
    let session = Session::new();
    let choreographer = BuildChoreographer::new(session.clone(), analyzer, synthesizer)
        .with_timings(timings_for(speed));

    let mut events = session.events();
    let mut renderer = Renderer::new(!json && color_enabled(), marker);
    let mut build = tokio::spawn(async move { choreographer.start_build(&request).await });

    let outcome = loop {
        tokio::select! {
            biased;
            event = events.recv() => match event {
                Ok(event) => emit(&mut renderer, &event, json)?,
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Renderer fell behind"),
                Err(RecvError::Closed) => {}
            },
            joined = &mut build => {
                while let Ok(event) = events.try_recv() {
                    emit(&mut renderer, &event, json)?;
                }
                break joined.context("Build task panicked")?;
            }
        }
    };

    match outcome {
        Ok(AttemptOutcome::Completed) => {
            if !json {
                println!("{}", renderer.finish());
            }
            Ok(ExitCode::SUCCESS)
        }
        Ok(AttemptOutcome::Failed { .. }) => {
            if !json {
                println!("{}", renderer.finish());
            }
            Ok(ExitCode::FAILURE)
        }
        Ok(AttemptOutcome::Ignored) => {
            eprintln!("A build is already running");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => {
            eprintln!("{err}");
            Ok(ExitCode::from(2))
        }
    }
}

fn emit(renderer: &mut Renderer, event: &SessionEvent, json: bool) -> Result<()> {
    let text = if json {
        renderer.handle(event);
        serde_json::to_string(event)?
    } else {
        renderer.handle(event)
    };
    if !text.is_empty() {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{text}")?;
        out.flush()?;
    }
    Ok(())
}

async fn cmd_analyze(repo_url: &str, offline: bool, json: bool) -> Result<ExitCode> {
    let (analyzer, _) = collaborators(offline)?;
    let analysis = analyze_or_fallback(analyzer.as_ref(), repo_url).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        let renderer = Renderer::new(color_enabled(), "");
        println!("Project:      {}", analysis.project_name);
        println!("Dependencies: {}", analysis.dependencies.join(", "));
        println!("{}", renderer.analysis_panel(&analysis));
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_steps(json: bool) -> Result<ExitCode> {
    if json {
        let steps: Vec<_> = StepId::ALL
            .iter()
            .map(|id| {
                serde_json::json!({
                    "number": id.number(),
                    "id": id,
                    "name": id.name(),
                    "description": id.description(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&steps)?);
    } else {
        for id in StepId::ALL {
            println!("{}. {}: {}", id.number(), id.name(), id.description());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn color_enabled() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}
