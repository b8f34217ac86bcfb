//! Output formatting for the CLI
//!
//! Every command result can be rendered as JSON, YAML or human-readable text.
//! Machine formats go to stdout untouched; logs are on stderr.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::deploy::ProxyRoute;
use crate::llm::BackendHealth;
use crate::pipeline::{DetectionReport, GenerationOutcome};
use crate::source::RepositoryOwner;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

/// What happened after the Dockerfile was written
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeploymentReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<ProxyRoute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_public_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubectl_output: Option<String>,
}

impl DeploymentReport {
    pub fn is_empty(&self) -> bool {
        self.route.is_none()
            && self.published_image.is_none()
            && self.manifest_path.is_none()
            && self.kubectl_output.is_none()
    }
}

/// Result of `dockgen generate`
#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    #[serde(flatten)]
    pub outcome: GenerationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<RepositoryOwner>,
    #[serde(skip_serializing_if = "DeploymentReport::is_empty")]
    pub deployment: DeploymentReport,
}

/// Result of `dockgen health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    #[serde(flatten)]
    pub health: BackendHealth,
    pub configuration: BTreeMap<String, String>,
}

impl HealthReport {
    pub fn new(health: BackendHealth, configuration: HashMap<String, String>) -> Self {
        Self {
            health,
            configuration: configuration.into_iter().collect(),
        }
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_detection(&self, report: &DetectionReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "detection report"),
            OutputFormat::Yaml => to_yaml(report, "detection report"),
            OutputFormat::Human => Ok(self.format_detection_human(report)),
        }
    }

    pub fn format_generation(&self, report: &GenerateReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "generation result"),
            OutputFormat::Yaml => to_yaml(report, "generation result"),
            OutputFormat::Human => Ok(self.format_generation_human(report)),
        }
    }

    pub fn format_health(&self, report: &HealthReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "health status"),
            OutputFormat::Yaml => to_yaml(report, "health status"),
            OutputFormat::Human => Ok(self.format_health_human(report)),
        }
    }

    fn format_detection_human(&self, report: &DetectionReport) -> String {
        let mut output = String::new();

        output.push_str("\u{2713} Stack Detection Result\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!("Project:    {}\n", report.project.display()));
        output.push_str(&format!("Stack:      {}\n", report.display_name));
        output.push_str(&format!("Port:       {}\n", report.port));
        output.push_str(&format!("Container:  {}\n", report.container_name));
        output.push_str(&format!("Route:      {}\n", report.route_prefix));

        if let Some(ref rule) = report.rule {
            let dir = report
                .matched_dir
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| ".".to_string());
            output.push_str(&format!("Matched:    {:?} in {}\n", rule, dir));
        }

        if let Some(ref facts) = report.build_facts {
            output.push_str("\nBuild Facts:\n");
            output.push_str(&format!(
                "\u{251C}\u{2500} Runtime:  {}\n",
                facts.target_runtime_version
            ));
            output.push_str(&format!(
                "\u{2514}\u{2500} Output:   {}\n",
                facts.build_output_name
            ));
        }

        output
    }

    fn format_generation_human(&self, report: &GenerateReport) -> String {
        let outcome = &report.outcome;
        let mut output = self.format_detection_human(&outcome.detection);

        output.push_str("\nGeneration:\n");
        output.push_str(&format!("\u{251C}\u{2500} Backend:   {}\n", outcome.backend));
        output.push_str(&format!("\u{251C}\u{2500} Attempts:  {}\n", outcome.attempts));
        output.push_str(&format!(
            "\u{251C}\u{2500} Extracted: {:?}\n",
            outcome.extraction_method
        ));
        output.push_str(&format!(
            "\u{251C}\u{2500} Written:   {}\n",
            outcome.dockerfile_path.display()
        ));
        if let Some(ref public) = outcome.public_path {
            output.push_str(&format!("\u{251C}\u{2500} Public:    {}\n", public.display()));
        }
        output.push_str(&format!("\u{2514}\u{2500} SHA-256:   {}\n", outcome.sha256));

        if let Some(ref owner) = report.owner {
            output.push_str(&format!("\nRepository owner: {} ({})\n", owner.user, owner.avatar_url));
        }

        let deployment = &report.deployment;
        if !deployment.is_empty() {
            output.push_str("\nDeployment:\n");
            if let Some(ref route) = deployment.route {
                output.push_str(&format!(
                    "  Running:   {} on :{} via http://localhost{}\n",
                    route.container, route.port, route.prefix
                ));
            }
            if let Some(ref image) = deployment.published_image {
                output.push_str(&format!("  Published: {}\n", image));
            }
            if let Some(ref manifest) = deployment.manifest_path {
                output.push_str(&format!("  Manifest:  {}\n", manifest.display()));
            }
            if let Some(ref applied) = deployment.kubectl_output {
                output.push_str(&format!("  kubectl:   {}\n", applied));
            }
        }

        if !outcome.warnings.is_empty() {
            output.push_str("\n\u{26A0} Warnings:\n");
            for warning in &outcome.warnings {
                output.push_str(&format!("  - {}\n", warning));
            }
        }

        output.push_str("\nDockerfile:\n");
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&outcome.dockerfile);
        output.push('\n');

        output
    }

    fn format_health_human(&self, report: &HealthReport) -> String {
        let mut output = String::new();

        output.push_str("Backend Health Status\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        let health = &report.health;
        let symbol = if health.available { "\u{2713}" } else { "\u{2717}" };
        output.push_str(&format!("{} {}\n", symbol, health.backend));
        output.push_str(&format!(
            "  Status: {}\n",
            if health.available {
                "Available"
            } else {
                "Unavailable"
            }
        ));
        output.push_str(&format!("  Details: {}\n", health.detail));

        output.push_str("\nConfiguration:\n");
        for (key, value) in &report.configuration {
            output.push_str(&format!("  {}: {}\n", key, value));
        }

        output
    }
}

fn to_json<T: Serialize>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string_pretty(value).with_context(|| format!("Failed to serialize {} to JSON", what))
}

fn to_yaml<T: Serialize>(value: &T, what: &str) -> Result<String> {
    serde_yaml::to_string(value).with_context(|| format!("Failed to serialize {} to YAML", what))
}
