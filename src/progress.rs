//! Progress reporting for the conversion pipeline.
//!
//! The orchestrator announces each stage through a [`ProgressCallback`]
//! before starting it, so a host application can forward the labels to a
//! status line, a progress bar, or a log without the pipeline knowing how
//! they are displayed.

use std::fmt;
use tracing::info;

/// Stages of a single conversion run, in the order they occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    Starting,
    Preparing,
    Uploading,
    WaitingForAvailability,
    Converting,
    RateLimitBackoff,
}

impl ProgressStage {
    /// User-facing label for this stage.
    pub fn message(&self) -> &'static str {
        match self {
            ProgressStage::Starting => "Starting conversion...",
            ProgressStage::Preparing => "Preparing image...",
            ProgressStage::Uploading => "Uploading image...",
            ProgressStage::WaitingForAvailability => "Waiting for image to be available...",
            ProgressStage::Converting => "Converting image to Ghibli style...",
            ProgressStage::RateLimitBackoff => "Rate limit hit. Waiting 15s...",
        }
    }
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

pub trait ProgressCallback: Send + Sync {
    fn on_stage(&self, stage: ProgressStage);
}

/// Default sink: logs each stage via tracing.
pub struct LogProgress;

impl ProgressCallback for LogProgress {
    fn on_stage(&self, stage: ProgressStage) {
        info!("{}", stage);
    }
}

/// Sink for callers that do not care about progress.
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_stage(&self, _stage: ProgressStage) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels() {
        assert_eq!(ProgressStage::Preparing.message(), "Preparing image...");
        assert_eq!(
            ProgressStage::WaitingForAvailability.to_string(),
            "Waiting for image to be available..."
        );
    }
}
