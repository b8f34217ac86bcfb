//! Configuration management for dockgen
//!
//! Settings are loaded from environment variables with defaults. CLI flags
//! override individual fields after loading.
//!
//! # Environment Variables
//!
//! - `DOCKGEN_PROVIDER`: genai adapter (ollama|openai|anthropic|gemini|groq|xai) - default: "ollama"
//! - `DOCKGEN_MODEL`: model name - default: "llama3"
//! - `DOCKGEN_OLLAMA_CLI`: run `ollama run` instead of the HTTP API (true|false) - default: "false"
//! - `DOCKGEN_REQUEST_TIMEOUT`: per-attempt timeout in seconds - default: "120"
//! - `DOCKGEN_MAX_RETRIES`: retries after the first attempt - default: "2"
//! - `DOCKGEN_RETRY_BACKOFF_MS`: base backoff between attempts - default: "500"
//! - `DOCKGEN_WORK_DIR`: where archives and clones are staged - default: "uploads"
//! - `DOCKGEN_PUBLIC_DIR`: where generated Dockerfiles are published - default: "static/generated"
//! - `DOCKGEN_NETWORK`: container network shared with the proxy - default: "app-network"
//! - `DOCKGEN_PROXY_DIR`: reverse proxy build context - default: "nginx"
//! - `DOCKGEN_LOG_LEVEL`: logging level - default: "info"
//! - `DOCKERHUB_USERNAME` / `DOCKERHUB_PASSWORD`: registry credentials for publishing
//!
//! Provider endpoints and keys are read by genai itself (`OLLAMA_HOST`,
//! `OPENAI_API_KEY`, ...).

use genai::adapter::AdapterKind;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_MODEL: &str = "llama3";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;
const DEFAULT_WORK_DIR: &str = "uploads";
const DEFAULT_PUBLIC_DIR: &str = "static/generated";
const DEFAULT_NETWORK: &str = "app-network";
const DEFAULT_PROXY_DIR: &str = "nginx";

const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;
const MAX_RETRIES: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid provider: {0}. Valid options: ollama, openai, anthropic, gemini, groq, xai")]
    InvalidProvider(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone)]
pub struct DockgenConfig {
    pub provider: AdapterKind,
    pub model: String,
    /// Spawn `ollama run` instead of calling an HTTP API
    pub use_ollama_cli: bool,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub work_dir: PathBuf,
    pub public_dir: PathBuf,
    pub network: String,
    pub proxy_dir: PathBuf,
    pub registry_username: Option<String>,
    pub registry_password: Option<String>,
    pub log_level: String,
}

/// Parses a provider name the way `DOCKGEN_PROVIDER` and `--backend` accept it
pub fn parse_provider(name: &str) -> Result<AdapterKind, ConfigError> {
    let lower = name.to_lowercase();
    let alias = match lower.as_str() {
        "claude" => "anthropic",
        "grok" => "xai",
        other => other,
    };
    AdapterKind::from_lower_str(alias).ok_or_else(|| ConfigError::InvalidProvider(name.to_string()))
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Default for DockgenConfig {
    /// Loads `DOCKGEN_*` variables, falling back to defaults for anything
    /// missing or unparsable
    fn default() -> Self {
        let provider = env::var("DOCKGEN_PROVIDER")
            .ok()
            .and_then(|s| parse_provider(&s).ok())
            .unwrap_or(AdapterKind::Ollama);

        let model = env_non_empty("DOCKGEN_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let use_ollama_cli = env_parsed::<bool>("DOCKGEN_OLLAMA_CLI").unwrap_or(false);

        let request_timeout_secs =
            env_parsed("DOCKGEN_REQUEST_TIMEOUT").unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        let max_retries = env_parsed("DOCKGEN_MAX_RETRIES").unwrap_or(DEFAULT_MAX_RETRIES);
        let retry_backoff_ms =
            env_parsed("DOCKGEN_RETRY_BACKOFF_MS").unwrap_or(DEFAULT_RETRY_BACKOFF_MS);

        let work_dir = env_non_empty("DOCKGEN_WORK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORK_DIR));
        let public_dir = env_non_empty("DOCKGEN_PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR));
        let network =
            env_non_empty("DOCKGEN_NETWORK").unwrap_or_else(|| DEFAULT_NETWORK.to_string());
        let proxy_dir = env_non_empty("DOCKGEN_PROXY_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROXY_DIR));

        let log_level = env::var("DOCKGEN_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            provider,
            model,
            use_ollama_cli,
            request_timeout_secs,
            max_retries,
            retry_backoff_ms,
            work_dir,
            public_dir,
            network,
            proxy_dir,
            registry_username: env_non_empty("DOCKERHUB_USERNAME"),
            registry_password: env_non_empty("DOCKERHUB_PASSWORD"),
            log_level,
        }
    }
}

impl DockgenConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if self.max_retries > MAX_RETRIES {
            return Err(ConfigError::ValidationFailed(format!(
                "Max retries cannot exceed {}",
                MAX_RETRIES
            )));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Model name cannot be empty".to_string(),
            ));
        }

        if self.network.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Container network name cannot be empty".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Username and password, when both are set
    pub fn registry_credentials(&self) -> Option<(&str, &str)> {
        match (&self.registry_username, &self.registry_password) {
            (Some(user), Some(password)) => Some((user.as_str(), password.as_str())),
            _ => None,
        }
    }

    /// Settings as strings for JSON/YAML output; never includes the password
    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("provider".to_string(), self.provider.as_str().to_string());
        map.insert("model".to_string(), self.model.clone());
        map.insert("use_ollama_cli".to_string(), self.use_ollama_cli.to_string());
        map.insert(
            "request_timeout_secs".to_string(),
            self.request_timeout_secs.to_string(),
        );
        map.insert("max_retries".to_string(), self.max_retries.to_string());
        map.insert(
            "retry_backoff_ms".to_string(),
            self.retry_backoff_ms.to_string(),
        );
        map.insert("work_dir".to_string(), self.work_dir.display().to_string());
        map.insert(
            "public_dir".to_string(),
            self.public_dir.display().to_string(),
        );
        map.insert("network".to_string(), self.network.clone());
        map.insert("proxy_dir".to_string(), self.proxy_dir.display().to_string());
        if let Some(ref user) = self.registry_username {
            map.insert("registry_username".to_string(), user.clone());
        }
        map.insert("log_level".to_string(), self.log_level.clone());

        map
    }
}

impl fmt::Display for DockgenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dockgen Configuration:")?;
        writeln!(f, "  Provider: {}", self.provider.as_str())?;
        writeln!(f, "  Model: {}", self.model)?;
        writeln!(f, "  Ollama CLI: {}", self.use_ollama_cli)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(
            f,
            "  Retries: {} (backoff {}ms)",
            self.max_retries, self.retry_backoff_ms
        )?;
        writeln!(f, "  Work Dir: {}", self.work_dir.display())?;
        writeln!(f, "  Public Dir: {}", self.public_dir.display())?;
        writeln!(f, "  Network: {}", self.network)?;
        writeln!(f, "  Proxy Dir: {}", self.proxy_dir.display())?;
        if let Some(ref user) = self.registry_username {
            writeln!(f, "  Registry User: {}", user)?;
        }
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
