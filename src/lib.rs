//! dockgen - LLM-assisted Dockerfile generation
//!
//! Classifies a project directory into a closed set of technology stacks,
//! synthesizes a stack-specific prompt, asks an LLM backend for a Dockerfile
//! and recovers the Dockerfile from the free-form response.
//!
//! # Core Concepts
//!
//! - **Stack label**: closed-set identifier picked by ordered heuristics over
//!   the project tree ([`stack`])
//! - **Build facts**: values read from a project manifest, e.g. the .NET
//!   runtime version and output assembly ([`manifest`])
//! - **Generation gateway**: timeout and retry policy around an [`LLMClient`]
//!   ([`gateway`])
//! - **Extraction**: fenced-block parse with a directive-scan fallback
//!   ([`extract`])
//!
//! # Example Usage
//!
//! ```ignore
//! use dockgen::{GenerationGateway, GenerationPipeline, RetryPolicy};
//! use dockgen::llm::GenAIClient;
//! use genai::adapter::AdapterKind;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let client = GenAIClient::new(AdapterKind::Ollama, "llama3".into(), Duration::from_secs(120)).await?;
//! let gateway = GenerationGateway::new(Arc::new(client), Duration::from_secs(120), RetryPolicy::default());
//! let outcome = GenerationPipeline::new(gateway).run(project).await?;
//! println!("{}", outcome.dockerfile);
//! ```
//!
//! Running, publishing and Kubernetes deployment of the generated image live
//! in [`deploy`]; turning repositories and tarballs into project directories
//! lives in [`source`].

pub mod cli;
pub mod command;
pub mod config;
pub mod deploy;
pub mod extract;
pub mod fs;
pub mod gateway;
pub mod llm;
pub mod manifest;
pub mod pipeline;
pub mod progress;
pub mod prompt;
pub mod snapshot;
pub mod source;
pub mod stack;
pub mod util;
pub mod validation;

pub use command::{CommandOutput, CommandRunner, MockRunner, ProcessRunner};
pub use config::{ConfigError, DockgenConfig};
pub use deploy::{ContainerEngine, ContainerRegistry, DeployError, ProxyRoute};
pub use extract::{extract, ExtractedArtifact, Extraction, ExtractionMethod};
pub use gateway::{GenerationError, GenerationGateway, RawGenerationResponse, RetryPolicy};
pub use llm::{BackendError, LLMClient};
pub use manifest::BuildFacts;
pub use pipeline::{DetectionReport, GenerationOutcome, GenerationPipeline, PipelineError};
pub use prompt::{synthesize, PromptDocument};
pub use snapshot::ProjectSnapshot;
pub use source::{ProjectSource, SourceError};
pub use stack::{classify, normalize_container_name, resolve_port, StackLabel};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
