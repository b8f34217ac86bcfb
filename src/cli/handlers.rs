//! Command handlers; each returns the process exit code

use super::commands::{DetectArgs, GenerateArgs, HealthArgs, PromptArgs};
use super::output::{DeploymentReport, GenerateReport, HealthReport, OutputFormatter};
use crate::command::{CommandRunner, ProcessRunner};
use crate::config::DockgenConfig;
use crate::deploy::{
    apply_manifest, load_into_minikube, refresh_proxy, write_manifest, ContainerEngine,
    ContainerRegistry, DeployError, ManifestSpec, ROUTES_FILE,
};
use crate::fs::RealFileSystem;
use crate::gateway::{GenerationGateway, RetryPolicy};
use crate::llm::{check_backend_health, select_llm_client, LLMClient};
use crate::pipeline::{
    inspect_project, prepare_request, DetectionReport, GenerationPipeline, PipelineError,
};
use crate::progress::LoggingHandler;
use crate::source::{github_owner, sanitize_image_name, stage, ProjectSource};
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

fn project_path(path: &Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p.clone()),
        None => env::current_dir().context("Failed to get current directory"),
    }
}

/// Prints the error and its troubleshooting hint to stderr
fn report_failure(err: &anyhow::Error) {
    error!("{:#}", err);
    if let Some(e) = err.downcast_ref::<PipelineError>() {
        eprintln!("\n{}", e.help_message());
    } else if let Some(e) = err.downcast_ref::<DeployError>() {
        eprintln!("\nError: {}\n\nHelp: {}", e, e.help_message());
    } else {
        eprintln!("\nError: {:#}", err);
    }
}

fn print_or_fail(rendered: Result<String>) -> i32 {
    match rendered {
        Ok(text) => {
            println!("{}", text.trim_end());
            0
        }
        Err(e) => {
            report_failure(&e);
            1
        }
    }
}

pub async fn handle_detect(args: &DetectArgs) -> i32 {
    let rendered = project_path(&args.path).and_then(|path| {
        debug!("Project path: {}", path.display());
        let report = inspect_project(&RealFileSystem, &path)?;
        OutputFormatter::new(args.format.into()).format_detection(&report)
    });
    print_or_fail(rendered)
}

pub async fn handle_prompt(args: &PromptArgs) -> i32 {
    let rendered = project_path(&args.path).and_then(|path| {
        let prepared = prepare_request(&RealFileSystem, &path)?;
        info!(label = %prepared.report.label, chars = prepared.prompt.len(), "Prompt synthesized");
        Ok(prepared.prompt.into_string())
    });
    print_or_fail(rendered)
}

pub async fn handle_health(args: &HealthArgs) -> i32 {
    info!("Checking backend health");

    let mut config = DockgenConfig::default();
    if let Some(provider) = args.backend {
        config.provider = provider;
        config.use_ollama_cli = false;
    }

    let health = check_backend_health(&config).await;
    let available = health.available;
    let report = HealthReport::new(health, config.to_display_map());

    match print_or_fail(OutputFormatter::new(args.format.into()).format_health(&report)) {
        0 if available => 0,
        _ => 1,
    }
}

pub async fn handle_generate(args: &GenerateArgs) -> i32 {
    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner);
    let rendered = match generate(args, runner).await {
        Ok(report) => OutputFormatter::new(args.format.into()).format_generation(&report),
        Err(e) => Err(e),
    };
    print_or_fail(rendered)
}

/// `DockgenConfig` from the environment with command-line overrides applied
pub fn config_from_args(args: &GenerateArgs) -> Result<DockgenConfig> {
    let mut config = DockgenConfig::default();
    if let Some(provider) = args.backend {
        config.provider = provider;
    }
    if let Some(ref model) = args.model {
        config.model = model.clone();
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }
    if let Some(retries) = args.retries {
        config.max_retries = retries;
    }
    if args.ollama_cli {
        config.use_ollama_cli = true;
    }
    if let Some(ref dir) = args.public_dir {
        config.public_dir = dir.clone();
    }
    config.validate()?;
    debug!("{}", config);
    Ok(config)
}

fn source_from_args(args: &GenerateArgs) -> Result<ProjectSource> {
    if let Some(ref url) = args.repo {
        return Ok(ProjectSource::Repository(url.clone()));
    }
    if let Some(ref archive) = args.archive {
        return Ok(ProjectSource::Archive(archive.clone()));
    }
    Ok(ProjectSource::Directory(project_path(&args.path)?))
}

/// Image name from `--image-name`, else the project directory name
fn image_name(args: &GenerateArgs, project: &Path) -> String {
    let raw = args.image_name.clone().unwrap_or_else(|| {
        project
            .canonicalize()
            .ok()
            .as_deref()
            .unwrap_or(project)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    sanitize_image_name(&raw)
}

/// Stage, generate and optionally run, publish and deploy
pub async fn generate(args: &GenerateArgs, runner: Arc<dyn CommandRunner>) -> Result<GenerateReport> {
    let config = config_from_args(args)?;
    let selected = select_llm_client(&config).await?;
    info!(backend = %selected.description, "Backend selected");
    generate_with_client(args, &config, selected.client, runner).await
}

/// [`generate`] with an already chosen backend
pub async fn generate_with_client(
    args: &GenerateArgs,
    config: &DockgenConfig,
    client: Arc<dyn LLMClient>,
    runner: Arc<dyn CommandRunner>,
) -> Result<GenerateReport> {
    let source = source_from_args(args)?;
    let project = stage(&source, &config.work_dir, runner.as_ref()).await?;
    let owner = args.repo.as_deref().and_then(github_owner);

    let gateway = GenerationGateway::new(
        client,
        config.request_timeout(),
        RetryPolicy::new(config.max_retries, config.retry_backoff()),
    );
    let outcome = GenerationPipeline::new(gateway)
        .with_public_dir(&config.public_dir)
        .with_progress(Arc::new(LoggingHandler))
        .run(&project)
        .await?;

    let deployment = deploy(args, config, &project, &outcome.detection, runner).await?;

    Ok(GenerateReport {
        outcome,
        owner,
        deployment,
    })
}

async fn deploy(
    args: &GenerateArgs,
    config: &DockgenConfig,
    project: &Path,
    detection: &DetectionReport,
    runner: Arc<dyn CommandRunner>,
) -> Result<DeploymentReport, DeployError> {
    let mut report = DeploymentReport::default();
    if !args.publishes() && !args.run {
        return Ok(report);
    }

    let engine = ContainerEngine::new(runner.clone(), config.network.clone());

    if args.publishes() {
        let (user, _) = config
            .registry_credentials()
            .ok_or(DeployError::MissingCredentials)?;
        let spec = ManifestSpec {
            image_name: image_name(args, project),
            registry_user: user.to_string(),
            replicas: args.replicas,
            container_port: detection.port,
        };

        let manifest = write_manifest(project, &spec)?;
        std::fs::create_dir_all(&config.public_dir)
            .map_err(|e| DeployError::io(&config.public_dir, e))?;
        let public = config.public_dir.join(spec.file_name());
        std::fs::copy(&manifest, &public).map_err(|e| DeployError::io(&public, e))?;
        report.manifest_path = Some(manifest);
        report.manifest_public_path = Some(public);

        let image = engine
            .publish_image(project, &spec.image_name, config.registry_credentials())
            .await?;
        report.published_image = Some(image);
    }

    if args.run {
        let route = engine.build_and_run(project, detection.label).await?;
        if args.deploy {
            load_into_minikube(runner.as_ref(), &route.container).await?;
        }

        let routes_path = config.proxy_dir.join(ROUTES_FILE);
        let mut registry = ContainerRegistry::load(&routes_path)?;
        registry.register(route.clone());
        refresh_proxy(&engine, &config.proxy_dir, registry.routes()).await?;
        registry.save(&routes_path)?;
        report.route = Some(route);
    }

    if args.deploy {
        if let Some(ref manifest) = report.manifest_path {
            report.kubectl_output = Some(apply_manifest(runner.as_ref(), manifest).await?);
        }
    }

    Ok(report)
}
