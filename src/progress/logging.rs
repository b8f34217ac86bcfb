//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { project } => {
                info!(project = %project.display(), "Starting Dockerfile generation");
            }
            ProgressEvent::Classified { label, port } => {
                info!(label = %label, port, "Stack detected");
            }
            ProgressEvent::PromptBuilt { chars } => {
                debug!(chars, "Prompt synthesized");
            }
            ProgressEvent::GenerationAttempt {
                attempt,
                max_attempts,
            } => {
                info!(
                    progress = format!("{}/{}", attempt, max_attempts),
                    "Requesting Dockerfile from backend"
                );
            }
            ProgressEvent::GenerationAttemptFailed { attempt, error } => {
                warn!(attempt, error = %error, "Backend attempt failed");
            }
            ProgressEvent::GenerationComplete {
                attempts,
                response_time,
            } => {
                info!(
                    attempts,
                    response_time_ms = response_time.as_millis(),
                    "Backend responded"
                );
            }
            ProgressEvent::Extracted {
                method,
                lines,
                warnings,
            } => {
                if *warnings > 0 {
                    warn!(method = ?method, lines, warnings, "Dockerfile extracted with warnings");
                } else {
                    info!(method = ?method, lines, "Dockerfile extracted");
                }
            }
            ProgressEvent::Written { path } => {
                info!(path = %path.display(), "Dockerfile written");
            }
            ProgressEvent::Failed { error } => {
                warn!(error = %error, "Generation failed");
            }
        }
    }
}
