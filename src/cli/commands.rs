use crate::config::parse_provider;
use clap::{Parser, Subcommand, ValueEnum};
use genai::adapter::AdapterKind;
use std::path::PathBuf;

/// LLM-assisted Dockerfile generation
#[derive(Parser, Debug)]
#[command(
    name = "dockgen",
    about = "Detects a project's stack and asks an LLM for a matching Dockerfile",
    version,
    author,
    long_about = "dockgen classifies a project directory into a known stack (Node.js, React, \
                  Python Flask, .NET, Java, Vite, vanilla JS), builds a stack-specific prompt \
                  and asks an LLM backend (Ollama by default) for a Dockerfile. The result \
                  can optionally be built, run behind an nginx proxy, pushed to a registry \
                  and deployed to Kubernetes."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Classify a project and show its port and container name",
        long_about = "Walks the project directory and reports the detected stack, the port \
                      the image is expected to listen on and the container name used when \
                      running it. No backend is contacted.\n\n\
                      Examples:\n  \
                      dockgen detect\n  \
                      dockgen detect ./shop --format json"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Print the prompt that would be sent to the backend",
        long_about = "Examples:\n  \
                      dockgen prompt\n  \
                      dockgen prompt ./api"
    )]
    Prompt(PromptArgs),

    #[command(
        about = "Generate a Dockerfile for a project",
        long_about = "Stages the project (directory, archive or git repository), asks the \
                      backend for a Dockerfile and writes it to the project root and the \
                      public directory.\n\n\
                      Examples:\n  \
                      dockgen generate ./shop\n  \
                      dockgen generate --repo https://github.com/octocat/shop --run\n  \
                      dockgen generate --archive shop.tar.gz --backend openai --model gpt-4o-mini\n  \
                      dockgen generate ./ui --publish --deploy --replicas 2"
    )]
    Generate(GenerateArgs),

    #[command(
        about = "Check backend availability",
        long_about = "Examples:\n  \
                      dockgen health\n  \
                      dockgen health --backend anthropic"
    )]
    Health(HealthArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(value_name = "PATH", help = "Project directory (defaults to current directory)")]
    pub path: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct PromptArgs {
    #[arg(value_name = "PATH", help = "Project directory (defaults to current directory)")]
    pub path: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(
        value_name = "PATH",
        conflicts_with_all = ["repo", "archive"],
        help = "Project directory (defaults to current directory)"
    )]
    pub path: Option<PathBuf>,

    #[arg(
        long,
        value_name = "URL",
        conflicts_with = "archive",
        help = "Shallow-clone a git repository into the work directory"
    )]
    pub repo: Option<String>,

    #[arg(
        long,
        value_name = "FILE",
        help = "Unpack a .tar, .tar.gz, .tgz or .zip archive into the work directory"
    )]
    pub archive: Option<PathBuf>,

    #[arg(
        short = 'b',
        long,
        value_parser = parse_backend,
        help = "Backend provider (ollama, openai, anthropic, gemini, groq, xai)"
    )]
    pub backend: Option<AdapterKind>,

    #[arg(short = 'm', long, value_name = "MODEL", help = "Model name, e.g. 'llama3'")]
    pub model: Option<String>,

    #[arg(long, value_name = "SECONDS", help = "Per-attempt request timeout")]
    pub timeout: Option<u64>,

    #[arg(long, value_name = "N", help = "Retries after a failed attempt")]
    pub retries: Option<u32>,

    #[arg(long, help = "Pipe the prompt to `ollama run` instead of the HTTP API")]
    pub ollama_cli: bool,

    #[arg(long, value_name = "DIR", help = "Directory receiving a copy of the Dockerfile")]
    pub public_dir: Option<PathBuf>,

    #[arg(long, help = "Build and run the image behind the nginx proxy")]
    pub run: bool,

    #[arg(long, help = "Apply a Kubernetes manifest for the image (implies --publish)")]
    pub deploy: bool,

    #[arg(long, help = "Push <user>/<image>:latest to Docker Hub")]
    pub publish: bool,

    #[arg(
        long,
        value_name = "NAME",
        help = "Image name for publishing (defaults to the project directory name)"
    )]
    pub image_name: Option<String>,

    #[arg(long, value_name = "N", default_value = "1", help = "Deployment replica count")]
    pub replicas: u32,

    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

impl GenerateArgs {
    pub fn publishes(&self) -> bool {
        self.publish || self.deploy
    }
}

#[derive(Parser, Debug, Clone)]
pub struct HealthArgs {
    #[arg(
        short = 'b',
        long,
        value_parser = parse_backend,
        help = "Backend to check (defaults to DOCKGEN_PROVIDER)"
    )]
    pub backend: Option<AdapterKind>,

    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Human,
    Json,
    Yaml,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_backend(s: &str) -> Result<AdapterKind, String> {
    parse_provider(s).map_err(|e| e.to_string())
}
