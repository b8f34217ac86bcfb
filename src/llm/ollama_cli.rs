//! `ollama run` as a backend
//!
//! The prompt goes to the child's stdin and its stdout is the response. Used
//! when no Ollama HTTP server is reachable but the CLI is installed.

use super::client::LLMClient;
use super::error::BackendError;
use super::types::{LLMRequest, LLMResponse};
use crate::command::{CommandRunner, ProcessRunner};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error};

pub const OLLAMA_PROGRAM: &str = "ollama";

pub struct OllamaCliClient {
    runner: Arc<dyn CommandRunner>,
    model: String,
    timeout: Duration,
}

impl OllamaCliClient {
    pub fn new(model: impl Into<String>, timeout: Duration) -> Self {
        Self::with_runner(Arc::new(ProcessRunner), model, timeout)
    }

    pub fn with_runner(
        runner: Arc<dyn CommandRunner>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            runner,
            model: model.into(),
            timeout,
        }
    }
}

#[async_trait]
impl LLMClient for OllamaCliClient {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let start = Instant::now();
        let prompt = request.flatten();
        let args = vec!["run".to_string(), self.model.clone()];

        debug!(model = %self.model, prompt_chars = prompt.len(), "Invoking ollama CLI");

        let output = match tokio::time::timeout(
            self.timeout,
            self.runner.run(OLLAMA_PROGRAM, &args, Some(&prompt)),
        )
        .await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!("Could not start ollama: {:#}", e);
                return Err(BackendError::NetworkError {
                    message: format!("could not start '{}': {:#}", OLLAMA_PROGRAM, e),
                });
            }
            Err(_) => {
                error!("ollama run timed out after {}s", self.timeout.as_secs());
                return Err(BackendError::TimeoutError {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        if !output.success {
            return Err(BackendError::ProcessFailed {
                program: format!("{} run {}", OLLAMA_PROGRAM, self.model),
                exit_detail: output.stderr.trim().to_string(),
            });
        }

        Ok(LLMResponse::text(output.stdout, start.elapsed()))
    }

    fn name(&self) -> &str {
        "ollama-cli"
    }

    fn model_info(&self) -> Option<String> {
        Some(self.model.clone())
    }
}

impl std::fmt::Debug for OllamaCliClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaCliClient")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}
