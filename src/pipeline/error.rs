//! Failures of a generation request

use crate::gateway::GenerationError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Project path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Project path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Generation backend unavailable ({backend}, {attempts} attempt(s)): {reason}")]
    GenerationUnavailable {
        backend: String,
        attempts: u32,
        reason: String,
    },

    #[error("Generation timed out after {seconds}s ({backend}, {attempts} attempt(s))")]
    GenerationTimeout {
        backend: String,
        attempts: u32,
        seconds: u64,
    },

    #[error("No Dockerfile could be recovered from the backend response ({response_chars} characters)")]
    ExtractionEmpty { response_chars: usize },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<GenerationError> for PipelineError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Unavailable {
                backend,
                attempts,
                last_error,
            } => PipelineError::GenerationUnavailable {
                backend,
                attempts,
                reason: last_error.to_string(),
            },
            GenerationError::Timeout {
                backend,
                attempts,
                seconds,
            } => PipelineError::GenerationTimeout {
                backend,
                attempts,
                seconds,
            },
        }
    }
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns a user-friendly error message with troubleshooting hints
    pub fn help_message(&self) -> String {
        match self {
            PipelineError::PathNotFound(path) => format!(
                "Error: Project path not found\nPath: {}\n\n\
                Help: The specified path does not exist. Please check:\n\
                - Is the path correct?\n\
                - Do you have permission to access it?",
                path.display()
            ),
            PipelineError::NotADirectory(path) => format!(
                "Error: Project path is not a directory\nPath: {}\n\n\
                Help: Pass the project root directory, or use --archive for packed sources.",
                path.display()
            ),
            PipelineError::GenerationUnavailable {
                backend, reason, ..
            } => format!(
                "Error: Generation backend unavailable\n\n\
                Help: {} could not produce a response. Try:\n\
                1. Start Ollama: ollama serve\n\
                2. Pull the model: ollama pull llama3\n\
                3. Check the backend: dockgen health\n\
                4. Use the CLI instead of HTTP: --ollama-cli\n\n\
                Details: {}",
                backend, reason
            ),
            PipelineError::GenerationTimeout {
                seconds, attempts, ..
            } => format!(
                "Error: Generation timed out after {} seconds ({} attempt(s))\n\n\
                Help: The model took too long to answer. Try:\n\
                - Increase timeout: --timeout {}\n\
                - Use a smaller model: --model <name>\n\
                - Verify backend availability: dockgen health",
                seconds,
                attempts,
                seconds.saturating_mul(2).min(600)
            ),
            PipelineError::ExtractionEmpty { response_chars } => format!(
                "Error: The model response contained no Dockerfile\n\n\
                Help: The response ({} characters) had neither a ```dockerfile block\n\
                nor any Dockerfile instructions. Nothing was written. Try:\n\
                - Re-run the command; model output varies between runs\n\
                - Try a different model: --model <name>",
                response_chars
            ),
            PipelineError::Io { path, source } => format!(
                "Error: Could not write {}\n\n\
                Help: Check that the directory exists and is writable.\n\n\
                Details: {}",
                path.display(),
                source
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::BackendError;

    #[test]
    fn test_from_generation_error() {
        let err: PipelineError = GenerationError::Timeout {
            backend: "Ollama (llama3)".to_string(),
            attempts: 3,
            seconds: 120,
        }
        .into();
        assert!(matches!(
            err,
            PipelineError::GenerationTimeout { attempts: 3, seconds: 120, .. }
        ));

        let err: PipelineError = GenerationError::Unavailable {
            backend: "Ollama (llama3)".to_string(),
            attempts: 1,
            last_error: BackendError::EmptyResponse,
        }
        .into();
        match err {
            PipelineError::GenerationUnavailable { reason, .. } => {
                assert_eq!(reason, "Backend returned an empty response")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_help_messages() {
        let timeout = PipelineError::GenerationTimeout {
            backend: "b".to_string(),
            attempts: 2,
            seconds: 400,
        };
        assert!(timeout.help_message().contains("--timeout 600"));

        let empty = PipelineError::ExtractionEmpty { response_chars: 42 };
        assert!(empty.help_message().contains("Nothing was written"));

        let missing = PipelineError::PathNotFound(PathBuf::from("/nope"));
        assert!(missing.help_message().contains("/nope"));
    }
}
