//! End-to-end generation: classify, prompt, generate, extract, validate, write

mod error;
mod orchestrator;
mod outcome;

pub use error::PipelineError;
pub use orchestrator::{
    inspect_project, prepare_request, GenerationPipeline, PreparedRequest, DOCKERFILE_NAME,
};
pub use outcome::{DetectionReport, GenerationOutcome};
