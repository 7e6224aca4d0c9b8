//! Suspension points of the choreography.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::StageError;

/// Named suspension points, in the order they occur.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Pause {
    /// Simulated network latency while cloning.
    Clone,
    /// Settling after the analysis result arrives.
    Analysis,
    /// Between two synthesized build lines.
    LogLine,
    /// Simulated R8 optimization.
    Optimize,
    /// Simulated keystore signing.
    Sign,
}

/// Delay per suspension point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageTimings {
    pub clone: Duration,
    pub analysis: Duration,
    pub log_line: Duration,
    pub optimize: Duration,
    pub sign: Duration,
}

impl Default for StageTimings {
    fn default() -> Self {
        Self {
            clone: Duration::from_millis(1500),
            analysis: Duration::from_millis(1000),
            log_line: Duration::from_millis(400),
            optimize: Duration::from_millis(2000),
            sign: Duration::from_millis(1500),
        }
    }
}

impl StageTimings {
    /// No delays at all.
    pub fn instant() -> Self {
        Self {
            clone: Duration::ZERO,
            analysis: Duration::ZERO,
            log_line: Duration::ZERO,
            optimize: Duration::ZERO,
            sign: Duration::ZERO,
        }
    }

    /// Every delay multiplied by `factor`. Negative factors clamp to zero and
    /// delays too large to represent saturate at `Duration::MAX`.
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        let scale = |d: Duration| {
            Duration::try_from_secs_f64(d.as_secs_f64() * factor).unwrap_or(Duration::MAX)
        };
        Self {
            clone: scale(self.clone),
            analysis: scale(self.analysis),
            log_line: scale(self.log_line),
            optimize: scale(self.optimize),
            sign: scale(self.sign),
        }
    }

    pub fn for_pause(&self, pause: Pause) -> Duration {
        match pause {
            Pause::Clone => self.clone,
            Pause::Analysis => self.analysis,
            Pause::LogLine => self.log_line,
            Pause::Optimize => self.optimize,
            Pause::Sign => self.sign,
        }
    }
}

/// Performs the wait at each suspension point.
///
/// A pacer is the only stage dependency besides the collaborators, so a
/// failing pacer is how tests drive an attempt into the failed state.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, pause: Pause, duration: Duration) -> Result<(), StageError>;
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, _pause: Pause, duration: Duration) -> Result<(), StageError> {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
        Ok(())
    }
}
