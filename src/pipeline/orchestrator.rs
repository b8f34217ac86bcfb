use super::error::PipelineError;
use super::outcome::{DetectionReport, GenerationOutcome};
use crate::extract::{extract, Extraction};
use crate::fs::{FileSystem, RealFileSystem};
use crate::gateway::GenerationGateway;
use crate::manifest::extract_build_facts;
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::prompt::{synthesize, PromptDocument};
use crate::snapshot::ProjectSnapshot;
use crate::stack::{classify_detailed, normalize_container_name, resolve_port, route_prefix};
use crate::validation::Validator;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, Instrument};
use uuid::Uuid;

pub const DOCKERFILE_NAME: &str = "Dockerfile";

/// Detection plus the prompt derived from it
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub report: DetectionReport,
    pub prompt: PromptDocument,
}

/// Classifies `root` and resolves its port and container identity
pub fn inspect_project(fs: &dyn FileSystem, root: &Path) -> Result<DetectionReport, PipelineError> {
    if !fs.exists(root) {
        return Err(PipelineError::PathNotFound(root.to_path_buf()));
    }
    if !fs.is_dir(root) {
        return Err(PipelineError::NotADirectory(root.to_path_buf()));
    }

    let snapshot = ProjectSnapshot::new(root, fs);
    let classification = classify_detailed(&snapshot);
    let label = classification.label;
    let container_name = normalize_container_name(label);

    Ok(DetectionReport {
        project: root.to_path_buf(),
        label,
        display_name: label.name(),
        port: resolve_port(label),
        route_prefix: route_prefix(&container_name),
        container_name,
        matched_dir: classification.matched_dir,
        rule: classification.rule,
        build_facts: extract_build_facts(&snapshot, label),
    })
}

/// Detection followed by prompt synthesis; touches nothing on disk
pub fn prepare_request(fs: &dyn FileSystem, root: &Path) -> Result<PreparedRequest, PipelineError> {
    let report = inspect_project(fs, root)?;
    let prompt = synthesize(report.label, report.build_facts.as_ref());
    Ok(PreparedRequest { report, prompt })
}

/// One Dockerfile generation request, start to finish
///
/// Nothing is written unless extraction recovers a non-empty Dockerfile.
pub struct GenerationPipeline {
    gateway: GenerationGateway,
    validator: Validator,
    public_dir: Option<PathBuf>,
    progress: Option<Arc<dyn ProgressHandler>>,
}

impl GenerationPipeline {
    pub fn new(gateway: GenerationGateway) -> Self {
        Self {
            gateway,
            validator: Validator::default(),
            public_dir: None,
            progress: None,
        }
    }

    /// Also copy the Dockerfile into `dir`
    pub fn with_public_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.public_dir = Some(dir.into());
        self
    }

    pub fn with_progress(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress = Some(handler);
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(handler) = &self.progress {
            handler.on_progress(&event);
        }
    }

    pub async fn run(&self, project: &Path) -> Result<GenerationOutcome, PipelineError> {
        let request_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("generate", request_id = %request_id);
        let result = self.run_inner(project, request_id).instrument(span).await;
        if let Err(e) = &result {
            self.emit(ProgressEvent::Failed {
                error: e.to_string(),
            });
        }
        result
    }

    async fn run_inner(
        &self,
        project: &Path,
        request_id: String,
    ) -> Result<GenerationOutcome, PipelineError> {
        self.emit(ProgressEvent::Started {
            project: project.to_path_buf(),
        });

        let PreparedRequest { report, prompt } = prepare_request(&RealFileSystem, project)?;
        self.emit(ProgressEvent::Classified {
            label: report.label,
            port: report.port,
        });
        self.emit(ProgressEvent::PromptBuilt {
            chars: prompt.len(),
        });
        debug!(prompt_chars = prompt.len(), "Prompt ready");

        let response = self
            .gateway
            .generate_with_progress(prompt.as_str(), self.progress.as_deref())
            .await?;
        self.emit(ProgressEvent::GenerationComplete {
            attempts: response.attempts,
            response_time: response.elapsed,
        });

        let artifact = match extract(&response.text) {
            Extraction::Recovered(artifact) => artifact,
            Extraction::NothingRecovered => {
                return Err(PipelineError::ExtractionEmpty {
                    response_chars: response.text.len(),
                })
            }
        };

        let warnings = self.validator.warnings(&artifact, report.port);
        self.emit(ProgressEvent::Extracted {
            method: artifact.method(),
            lines: artifact.lines().len(),
            warnings: warnings.len(),
        });

        let dockerfile = artifact.to_text();
        let dockerfile_path = project.join(DOCKERFILE_NAME);
        std::fs::write(&dockerfile_path, &dockerfile)
            .map_err(|e| PipelineError::io(&dockerfile_path, e))?;
        self.emit(ProgressEvent::Written {
            path: dockerfile_path.clone(),
        });

        let public_path = match &self.public_dir {
            Some(dir) => Some(publish_copy(&dockerfile_path, dir)?),
            None => None,
        };

        let sha256 = hex::encode(Sha256::digest(dockerfile.as_bytes()));
        info!(
            label = %report.label,
            path = %dockerfile_path.display(),
            sha256 = %sha256,
            warnings = warnings.len(),
            "Dockerfile generated"
        );

        Ok(GenerationOutcome {
            request_id,
            detection: report,
            prompt: prompt.into_string(),
            dockerfile,
            extraction_method: artifact.method(),
            dockerfile_path,
            public_path,
            sha256,
            warnings,
            backend: response.backend,
            attempts: response.attempts,
            generated_at: Utc::now(),
        })
    }
}

fn publish_copy(dockerfile: &Path, public_dir: &Path) -> Result<PathBuf, PipelineError> {
    std::fs::create_dir_all(public_dir).map_err(|e| PipelineError::io(public_dir, e))?;
    let target = public_dir.join(DOCKERFILE_NAME);
    std::fs::copy(dockerfile, &target).map_err(|e| PipelineError::io(&target, e))?;
    Ok(target)
}
