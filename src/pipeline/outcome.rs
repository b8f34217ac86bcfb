//! Serializable results of detection and generation

use crate::extract::ExtractionMethod;
use crate::manifest::BuildFacts;
use crate::stack::{DetectionRule, StackLabel};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// What the classifier and resolver decided about a project
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub project: PathBuf,
    pub label: StackLabel,
    pub display_name: &'static str,
    pub port: u16,
    pub container_name: String,
    pub route_prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<DetectionRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_facts: Option<BuildFacts>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub request_id: String,
    #[serde(flatten)]
    pub detection: DetectionReport,
    pub prompt: String,
    pub dockerfile: String,
    pub extraction_method: ExtractionMethod,
    pub dockerfile_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_path: Option<PathBuf>,
    /// Hex SHA-256 of the written Dockerfile
    pub sha256: String,
    pub warnings: Vec<String>,
    pub backend: String,
    pub attempts: u32,
    pub generated_at: DateTime<Utc>,
}
