//! Generation backend abstraction
//!
//! Backends (genai over HTTP, the `ollama` CLI, a scripted mock) sit behind
//! [`LLMClient`] so the gateway never knows which one it is talking to.

mod client;
mod error;
mod genai;
mod mock;
mod ollama_cli;
mod selector;
mod types;

pub use client::LLMClient;
pub use error::BackendError;
pub use genai::{GenAIClient, API_BASE_URL_ENV};
pub use mock::{MockLLMClient, MockResponse};
pub use ollama_cli::{OllamaCliClient, OLLAMA_PROGRAM};
pub use selector::{
    check_backend_health, is_ollama_available, select_llm_client, BackendHealth, SelectedClient,
};
pub use types::{ChatMessage, LLMRequest, LLMResponse, MessageRole};
