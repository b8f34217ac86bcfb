//! Generation gateway
//!
//! Sends one prompt to the configured [`LLMClient`] and returns the raw
//! response text. Each attempt runs under its own timeout; failed attempts
//! are retried sequentially with exponential backoff. A whitespace-only
//! response is a failed attempt.

use crate::llm::{BackendError, LLMClient, LLMRequest};
use crate::progress::{ProgressEvent, ProgressHandler};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

const MAX_BACKOFF: Duration = Duration::from_secs(10);
const TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    pub base_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            max_retries,
            base_backoff,
        }
    }

    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before retry number `retry` (0-based): `base * 2^retry`, capped at 10s
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(500))
    }
}

/// Response text plus metadata about how it was obtained
#[derive(Debug, Clone, Serialize)]
pub struct RawGenerationResponse {
    pub text: String,
    pub backend: String,
    pub attempts: u32,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Generation backend '{backend}' unavailable after {attempts} attempt(s): {last_error}")]
    Unavailable {
        backend: String,
        attempts: u32,
        last_error: BackendError,
    },

    #[error("Generation backend '{backend}' timed out after {seconds}s ({attempts} attempt(s))")]
    Timeout {
        backend: String,
        attempts: u32,
        seconds: u64,
    },
}

impl GenerationError {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Unavailable { attempts, .. } | Self::Timeout { attempts, .. } => *attempts,
        }
    }
}

pub struct GenerationGateway {
    client: Arc<dyn LLMClient>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl GenerationGateway {
    pub fn new(client: Arc<dyn LLMClient>, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            client,
            timeout,
            retry,
        }
    }

    pub fn backend_name(&self) -> String {
        match self.client.model_info() {
            Some(model) => format!("{} ({})", self.client.name(), model),
            None => self.client.name().to_string(),
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<RawGenerationResponse, GenerationError> {
        self.generate_with_progress(prompt, None).await
    }

    pub async fn generate_with_progress(
        &self,
        prompt: &str,
        progress: Option<&dyn ProgressHandler>,
    ) -> Result<RawGenerationResponse, GenerationError> {
        let backend = self.backend_name();
        let started = Instant::now();
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            if let Some(p) = progress {
                p.on_progress(&ProgressEvent::GenerationAttempt {
                    attempt,
                    max_attempts,
                });
            }
            debug!(backend = %backend, attempt, max_attempts, "Sending prompt");

            let error = match self.attempt(prompt).await {
                Ok(text) => {
                    let elapsed = started.elapsed();
                    info!(
                        backend = %backend,
                        attempts = attempt,
                        elapsed_ms = elapsed.as_millis() as u64,
                        response_chars = text.len(),
                        "Generation complete"
                    );
                    return Ok(RawGenerationResponse {
                        text,
                        backend,
                        attempts: attempt,
                        elapsed,
                    });
                }
                Err(e) => e,
            };

            warn!(backend = %backend, attempt, error = %error, "Generation attempt failed");
            if let Some(p) = progress {
                p.on_progress(&ProgressEvent::GenerationAttemptFailed {
                    attempt,
                    error: error.to_string(),
                });
            }

            if !error.is_retryable() || attempt >= max_attempts {
                return Err(self.give_up(backend, attempt, error));
            }

            let delay = self.retry.backoff(attempt - 1);
            debug!(delay_ms = delay.as_millis() as u64, "Backing off before retry");
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<String, BackendError> {
        let request = LLMRequest::prompt(prompt).with_temperature(TEMPERATURE);
        let response = match tokio::time::timeout(self.timeout, self.client.chat(request)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(BackendError::TimeoutError {
                    seconds: self.timeout.as_secs(),
                })
            }
        };

        if response.is_blank() {
            return Err(BackendError::EmptyResponse);
        }
        Ok(response.content)
    }

    fn give_up(&self, backend: String, attempts: u32, last_error: BackendError) -> GenerationError {
        match last_error {
            BackendError::TimeoutError { seconds } => GenerationError::Timeout {
                backend,
                attempts,
                seconds,
            },
            last_error => GenerationError::Unavailable {
                backend,
                attempts,
                last_error,
            },
        }
    }
}

impl std::fmt::Debug for GenerationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationGateway")
            .field("client", &self.client.name())
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockLLMClient, MockResponse};

    fn gateway(mock: Arc<MockLLMClient>, retries: u32) -> GenerationGateway {
        GenerationGateway::new(
            mock,
            Duration::from_secs(5),
            RetryPolicy::new(retries, Duration::from_millis(1)),
        )
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(5, Duration::from_millis(500));
        assert_eq!(policy.backoff(0), Duration::from_millis(500));
        assert_eq!(policy.backoff(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff(2), Duration::from_millis(2000));
        assert_eq!(policy.backoff(5), Duration::from_secs(10));
        assert_eq!(policy.backoff(40), Duration::from_secs(10));
        assert_eq!(policy.max_attempts(), 6);
    }

    #[tokio::test]
    async fn test_first_attempt_succeeds() {
        let mock = Arc::new(MockLLMClient::new());
        mock.add_response(MockResponse::text("FROM alpine"));

        let response = gateway(mock.clone(), 2).generate("prompt").await.unwrap();

        assert_eq!(response.text, "FROM alpine");
        assert_eq!(response.attempts, 1);
        assert_eq!(response.backend, "MockLLM (mock-model)");
        assert_eq!(mock.prompts(), vec!["prompt".to_string()]);
    }

    #[tokio::test]
    async fn test_retries_after_failure() {
        let mock = Arc::new(MockLLMClient::new());
        mock.add_responses(vec![
            MockResponse::error(BackendError::NetworkError {
                message: "connection refused".to_string(),
            }),
            MockResponse::text("FROM node:18"),
        ]);

        let response = gateway(mock.clone(), 2).generate("p").await.unwrap();
        assert_eq!(response.attempts, 2);
        assert_eq!(mock.remaining_responses(), 0);
    }

    #[tokio::test]
    async fn test_blank_response_is_retried() {
        let mock = Arc::new(MockLLMClient::new());
        mock.add_responses(vec![MockResponse::text("  \n"), MockResponse::text("FROM x")]);

        let response = gateway(mock, 1).generate("p").await.unwrap();
        assert_eq!(response.attempts, 2);
        assert_eq!(response.text, "FROM x");
    }

    #[tokio::test]
    async fn test_blank_responses_exhaust_to_unavailable() {
        let mock = Arc::new(MockLLMClient::new());
        mock.add_responses(vec![MockResponse::text(""), MockResponse::text(" ")]);

        let err = gateway(mock, 1).generate("p").await.unwrap_err();
        assert_eq!(
            err,
            GenerationError::Unavailable {
                backend: "MockLLM (mock-model)".to_string(),
                attempts: 2,
                last_error: BackendError::EmptyResponse,
            }
        );
    }

    #[tokio::test]
    async fn test_auth_errors_not_retried() {
        let mock = Arc::new(MockLLMClient::new());
        mock.add_responses(vec![
            MockResponse::error(BackendError::AuthenticationError {
                message: "bad key".to_string(),
            }),
            MockResponse::text("FROM never-reached"),
        ]);

        let err = gateway(mock.clone(), 3).generate("p").await.unwrap_err();
        assert_eq!(err.attempts(), 1);
        assert_eq!(mock.remaining_responses(), 1);
    }

    #[tokio::test]
    async fn test_timeout_kind_when_last_attempt_timed_out() {
        let mock = Arc::new(MockLLMClient::new());
        mock.add_responses(vec![
            MockResponse::error(BackendError::ApiError {
                message: "500".to_string(),
                status_code: Some(500),
            }),
            MockResponse::error(BackendError::TimeoutError { seconds: 5 }),
        ]);

        let err = gateway(mock, 1).generate("p").await.unwrap_err();
        assert!(matches!(err, GenerationError::Timeout { attempts: 2, seconds: 5, .. }));
    }

    #[tokio::test]
    async fn test_gateway_enforces_its_own_timeout() {
        let mock = Arc::new(MockLLMClient::new());
        mock.add_response(MockResponse::text("FROM late").delayed(Duration::from_millis(500)));

        let gateway = GenerationGateway::new(
            mock,
            Duration::from_millis(20),
            RetryPolicy::none(),
        );
        let err = gateway.generate("p").await.unwrap_err();
        assert!(matches!(err, GenerationError::Timeout { attempts: 1, .. }));
    }
}
