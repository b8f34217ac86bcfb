//! Progress handler trait and events

use crate::extract::ExtractionMethod;
use crate::stack::StackLabel;
use std::path::PathBuf;
use std::time::Duration;

/// Events emitted while a generation request runs
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started { project: PathBuf },

    Classified { label: StackLabel, port: u16 },

    PromptBuilt { chars: usize },

    /// One call to the backend is about to be made (1-based)
    GenerationAttempt { attempt: u32, max_attempts: u32 },

    GenerationAttemptFailed { attempt: u32, error: String },

    GenerationComplete {
        attempts: u32,
        response_time: Duration,
    },

    Extracted {
        method: ExtractionMethod,
        lines: usize,
        warnings: usize,
    },

    /// Dockerfile persisted at `path`
    Written { path: PathBuf },

    Failed { error: String },
}

pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
