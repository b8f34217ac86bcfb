use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Could not run {program}: {source:#}")]
    Spawn {
        program: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("{container} failed to start.\nStatus: {status}\nLogs:\n{logs}")]
    ContainerNotRunning {
        container: String,
        status: String,
        logs: String,
    },

    #[error("Registry credentials missing: set DOCKERHUB_USERNAME and DOCKERHUB_PASSWORD")]
    MissingCredentials,

    #[error("Failed to render Kubernetes manifest: {0}")]
    Manifest(#[from] serde_yaml::Error),

    #[error("Saved proxy routes are unreadable: {0}")]
    Routes(#[from] serde_json::Error),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DeployError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn help_message(&self) -> String {
        match self {
            Self::Spawn { program, .. } => format!(
                "Make sure `{}` is installed and on PATH.",
                program
            ),
            Self::CommandFailed { .. } => {
                "Check that the Docker daemon is running and the generated Dockerfile builds locally."
                    .to_string()
            }
            Self::ContainerNotRunning { container, .. } => format!(
                "Inspect the container with `docker logs {}` and review the generated Dockerfile.",
                container
            ),
            Self::MissingCredentials => {
                "Export DOCKERHUB_USERNAME and DOCKERHUB_PASSWORD, or drop --publish.".to_string()
            }
            Self::Manifest(_) => "This is a bug; please report it.".to_string(),
            Self::Routes(_) => {
                "Delete routes.json under the proxy directory to start with an empty proxy."
                    .to_string()
            }
            Self::Io { path, .. } => format!("Check permissions on {}.", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_running_message_carries_status_and_logs() {
        let err = DeployError::ContainerNotRunning {
            container: "react-container".to_string(),
            status: "exited".to_string(),
            logs: "nginx: [emerg] bad config".to_string(),
        };
        let text = err.to_string();
        assert!(text.starts_with("react-container failed to start."));
        assert!(text.contains("Status: exited"));
        assert!(text.contains("[emerg]"));
        assert!(err.help_message().contains("docker logs react-container"));
    }
}
