//! Docker CLI wrapper
//!
//! Every call goes through a [`CommandRunner`], so the sequences issued here
//! can be asserted against a recording runner.

use super::error::DeployError;
use super::registry::ProxyRoute;
use crate::command::{args as argv, CommandOutput, CommandRunner};
use crate::stack::{normalize_container_name, resolve_port, StackLabel};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DOCKER_PROGRAM: &str = "docker";
pub const RUNNING_STATUS: &str = "running";

pub struct ContainerEngine {
    runner: Arc<dyn CommandRunner>,
    network: String,
}

impl ContainerEngine {
    pub fn new(runner: Arc<dyn CommandRunner>, network: impl Into<String>) -> Self {
        Self {
            runner,
            network: network.into(),
        }
    }

    async fn docker(&self, args: Vec<String>) -> Result<CommandOutput, DeployError> {
        run_unchecked(self.runner.as_ref(), DOCKER_PROGRAM, args, None).await
    }

    async fn docker_checked(&self, args: Vec<String>) -> Result<CommandOutput, DeployError> {
        run_checked(self.runner.as_ref(), DOCKER_PROGRAM, args, None).await
    }

    /// Creates the shared network unless `docker network ls` already lists it
    pub async fn ensure_network(&self) -> Result<(), DeployError> {
        let listing = self.docker_checked(argv(["network", "ls"])).await?;
        if listing.stdout.contains(self.network.as_str()) {
            debug!(network = %self.network, "Network exists");
            return Ok(());
        }
        self.docker_checked(argv(["network", "create", &self.network]))
            .await?;
        info!(network = %self.network, "Network created");
        Ok(())
    }

    pub async fn build(&self, tag: &str, context: &Path) -> Result<(), DeployError> {
        let context = context.display().to_string();
        self.docker_checked(argv(["build", "-t", tag, &context]))
            .await?;
        info!(tag, context = %context, "Image built");
        Ok(())
    }

    /// Force-removes `container`; a missing container is not an error
    pub async fn remove(&self, container: &str) {
        match self.docker(argv(["rm", "-f", container])).await {
            Ok(out) if !out.success => debug!(container, "Nothing to remove"),
            Ok(_) => debug!(container, "Removed stale container"),
            Err(e) => warn!(container, error = %e, "Could not remove container"),
        }
    }

    pub async fn run_detached(
        &self,
        container: &str,
        image: &str,
        publish: Option<&str>,
    ) -> Result<(), DeployError> {
        let mut args = argv(["run", "-d", "--name", container, "--network", &self.network]);
        if let Some(mapping) = publish {
            args.extend(argv(["-p", mapping]));
        }
        args.push(image.to_string());
        self.docker_checked(args).await?;
        Ok(())
    }

    pub async fn status(&self, container: &str) -> Result<String, DeployError> {
        let out = self
            .docker_checked(argv(["inspect", "-f", "{{.State.Status}}", container]))
            .await?;
        Ok(out.stdout.trim().to_string())
    }

    pub async fn logs(&self, container: &str) -> Result<String, DeployError> {
        let out = self.docker(argv(["logs", container])).await?;
        Ok(format!("{}{}", out.stdout, out.stderr))
    }

    /// Fails with the container's status and logs unless it is running
    pub async fn verify_running(&self, container: &str) -> Result<(), DeployError> {
        let status = self.status(container).await?;
        if status == RUNNING_STATUS {
            return Ok(());
        }
        let logs = self.logs(container).await.unwrap_or_default();
        Err(DeployError::ContainerNotRunning {
            container: container.to_string(),
            status,
            logs,
        })
    }

    /// `docker login`; the password goes over stdin, never on the command line
    pub async fn login(&self, username: &str, password: &str) -> Result<(), DeployError> {
        run_checked(
            self.runner.as_ref(),
            DOCKER_PROGRAM,
            argv(["login", "-u", username, "--password-stdin"]),
            Some(password),
        )
        .await?;
        Ok(())
    }

    pub async fn push(&self, image: &str) -> Result<(), DeployError> {
        self.docker_checked(argv(["push", image])).await?;
        info!(image, "Image pushed");
        Ok(())
    }

    /// Builds the project image and runs it on the shared network
    ///
    /// The image and container share the stack's container name. Returns the
    /// proxy route for the running container.
    pub async fn build_and_run(
        &self,
        project: &Path,
        label: StackLabel,
    ) -> Result<ProxyRoute, DeployError> {
        let container = normalize_container_name(label);
        let port = resolve_port(label);
        info!(label = %label, container = %container, port, "Building and running container");

        self.ensure_network().await?;
        self.build(&container, project).await?;
        self.remove(&container).await;
        self.run_detached(&container, &container, None).await?;
        self.verify_running(&container).await?;

        Ok(ProxyRoute::for_container(container, port))
    }

    /// Builds `<user>/<image>:latest`, logs in and pushes it
    pub async fn publish_image(
        &self,
        project: &Path,
        image_name: &str,
        credentials: Option<(&str, &str)>,
    ) -> Result<String, DeployError> {
        let (username, password) = credentials.ok_or(DeployError::MissingCredentials)?;
        let image = registry_image(username, image_name);

        self.build(&image, project).await?;
        self.login(username, password).await?;
        self.push(&image).await?;
        Ok(image)
    }
}

impl std::fmt::Debug for ContainerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerEngine")
            .field("network", &self.network)
            .finish()
    }
}

pub(crate) async fn run_unchecked(
    runner: &dyn CommandRunner,
    program: &str,
    args: Vec<String>,
    stdin: Option<&str>,
) -> Result<CommandOutput, DeployError> {
    runner
        .run(program, &args, stdin)
        .await
        .map_err(|source| DeployError::Spawn {
            program: program.to_string(),
            source,
        })
}

/// Like [`run_unchecked`] but a non-zero exit is an error
pub(crate) async fn run_checked(
    runner: &dyn CommandRunner,
    program: &str,
    args: Vec<String>,
    stdin: Option<&str>,
) -> Result<CommandOutput, DeployError> {
    let command = format!("{} {}", program, args.join(" "));
    let output = run_unchecked(runner, program, args, stdin).await?;
    if !output.success {
        return Err(DeployError::CommandFailed {
            command,
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output)
}

/// Fully qualified image reference pushed to the registry
pub fn registry_image(username: &str, image_name: &str) -> String {
    format!("{}/{}:latest", username, image_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::MockRunner;
    use std::path::PathBuf;

    fn engine() -> (Arc<MockRunner>, ContainerEngine) {
        let runner = Arc::new(MockRunner::new());
        let engine = ContainerEngine::new(runner.clone(), "app-network");
        (runner, engine)
    }

    #[tokio::test]
    async fn test_ensure_network_creates_when_missing() {
        let (runner, engine) = engine();
        runner.respond("docker network ls", CommandOutput::ok("NETWORK ID  NAME\nabc  bridge\n"));

        engine.ensure_network().await.unwrap();
        assert_eq!(
            runner.command_lines(),
            vec!["docker network ls", "docker network create app-network"]
        );
    }

    #[tokio::test]
    async fn test_ensure_network_skips_existing() {
        let (runner, engine) = engine();
        runner.respond("docker network ls", CommandOutput::ok("abc  app-network  bridge\n"));

        engine.ensure_network().await.unwrap();
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_build_and_run_sequence() {
        let (runner, engine) = engine();
        runner.respond("docker inspect", CommandOutput::ok("running\n"));

        let route = engine
            .build_and_run(&PathBuf::from("uploads/shop"), StackLabel::PythonFlask)
            .await
            .unwrap();

        assert_eq!(route, ProxyRoute::new("/python-flask", "python-flask-container", 4000));
        assert_eq!(
            runner.command_lines(),
            vec![
                "docker network ls",
                "docker network create app-network",
                "docker build -t python-flask-container uploads/shop",
                "docker rm -f python-flask-container",
                "docker run -d --name python-flask-container --network app-network python-flask-container",
                "docker inspect -f {{.State.Status}} python-flask-container",
            ]
        );
    }

    #[tokio::test]
    async fn test_stale_container_removal_failure_ignored() {
        let (runner, engine) = engine();
        runner
            .respond("docker rm", CommandOutput::failed("No such container"))
            .respond("docker inspect", CommandOutput::ok("running"));

        assert!(engine
            .build_and_run(Path::new("p"), StackLabel::React)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_not_running_reports_status_and_logs() {
        let (runner, engine) = engine();
        runner
            .respond("docker inspect", CommandOutput::ok("exited\n"))
            .respond("docker logs", CommandOutput::ok("Error: Cannot find module 'express'"));

        let err = engine
            .build_and_run(Path::new("p"), StackLabel::NodeJs)
            .await
            .unwrap_err();
        match err {
            DeployError::ContainerNotRunning {
                container,
                status,
                logs,
            } => {
                assert_eq!(container, "nodejs-container");
                assert_eq!(status, "exited");
                assert!(logs.contains("Cannot find module"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_build_failure_stops_sequence() {
        let (runner, engine) = engine();
        runner
            .respond("docker network ls", CommandOutput::ok("app-network"))
            .respond("docker build", CommandOutput::failed("COPY failed\n"));

        let err = engine
            .build_and_run(Path::new("p"), StackLabel::DotNet)
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::CommandFailed { ref stderr, .. } if stderr == "COPY failed"));
        assert_eq!(runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_publish_requires_credentials() {
        let (runner, engine) = engine();
        let err = engine
            .publish_image(Path::new("p"), "shop", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::MissingCredentials));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_publish_sequence() {
        let (runner, engine) = engine();
        let image = engine
            .publish_image(Path::new("uploads/shop"), "shop", Some(("octo", "s3cret")))
            .await
            .unwrap();

        assert_eq!(image, "octo/shop:latest");
        assert_eq!(
            runner.command_lines(),
            vec![
                "docker build -t octo/shop:latest uploads/shop",
                "docker login -u octo --password-stdin",
                "docker push octo/shop:latest",
            ]
        );
    }

    #[tokio::test]
    async fn test_login_passes_password_on_stdin() {
        let (runner, engine) = engine();
        engine.login("octo", "s3cret").await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].args.iter().all(|arg| arg != "s3cret"));
        assert!(calls[0].args.contains(&"--password-stdin".to_string()));
        assert_eq!(calls[0].stdin.as_deref(), Some("s3cret"));
    }

    #[tokio::test]
    async fn test_login_failure_hides_password() {
        let (runner, engine) = engine();
        runner.respond("docker login", CommandOutput::failed("unauthorized"));

        let err = engine.login("octo", "s3cret").await.unwrap_err();
        let text = err.to_string();
        assert!(!text.contains("s3cret"));
        assert!(text.contains("docker login -u octo --password-stdin"));
    }
}
