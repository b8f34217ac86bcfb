//! Kubernetes manifest for a published image
//!
//! A `Deployment` plus a `NodePort` `Service`, rendered as one multi-document
//! YAML file.

use super::engine::{registry_image, run_checked};
use super::error::DeployError;
use crate::command::{args as argv, CommandRunner};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub const KUBECTL_PROGRAM: &str = "kubectl";
pub const MINIKUBE_PROGRAM: &str = "minikube";
pub const NODE_PORT: u16 = 30036;
pub const SERVICE_PORT: u16 = 80;
pub const DEFAULT_REPLICAS: u32 = 1;

/// Inputs for [`render_manifest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSpec {
    pub image_name: String,
    pub registry_user: String,
    pub replicas: u32,
    pub container_port: u16,
}

impl ManifestSpec {
    pub fn image(&self) -> String {
        registry_image(&self.registry_user, &self.image_name)
    }

    pub fn file_name(&self) -> String {
        format!("{}-manifest.yaml", self.image_name)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Deployment {
    api_version: &'static str,
    kind: &'static str,
    metadata: ObjectMeta,
    spec: DeploymentSpec,
}

#[derive(Debug, Serialize)]
struct ObjectMeta {
    name: String,
}

#[derive(Debug, Serialize)]
struct DeploymentSpec {
    replicas: u32,
    selector: LabelSelector,
    template: PodTemplate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LabelSelector {
    match_labels: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct PodTemplate {
    metadata: PodMeta,
    spec: PodSpec,
}

#[derive(Debug, Serialize)]
struct PodMeta {
    labels: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct PodSpec {
    containers: Vec<Container>,
}

#[derive(Debug, Serialize)]
struct Container {
    name: String,
    image: String,
    ports: Vec<ContainerPort>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContainerPort {
    container_port: u16,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Service {
    api_version: &'static str,
    kind: &'static str,
    metadata: ObjectMeta,
    spec: ServiceSpec,
}

#[derive(Debug, Serialize)]
struct ServiceSpec {
    #[serde(rename = "type")]
    service_type: &'static str,
    selector: BTreeMap<String, String>,
    ports: Vec<ServicePort>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServicePort {
    protocol: &'static str,
    port: u16,
    target_port: u16,
    node_port: u16,
}

fn app_labels(image_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([("app".to_string(), image_name.to_string())])
}

/// Deployment and Service documents separated by `---`
pub fn render_manifest(spec: &ManifestSpec) -> Result<String, DeployError> {
    let name = &spec.image_name;

    let deployment = Deployment {
        api_version: "apps/v1",
        kind: "Deployment",
        metadata: ObjectMeta {
            name: format!("{}-deployment", name),
        },
        spec: DeploymentSpec {
            replicas: spec.replicas,
            selector: LabelSelector {
                match_labels: app_labels(name),
            },
            template: PodTemplate {
                metadata: PodMeta {
                    labels: app_labels(name),
                },
                spec: PodSpec {
                    containers: vec![Container {
                        name: name.clone(),
                        image: spec.image(),
                        ports: vec![ContainerPort {
                            container_port: spec.container_port,
                        }],
                    }],
                },
            },
        },
    };

    let service = Service {
        api_version: "v1",
        kind: "Service",
        metadata: ObjectMeta {
            name: format!("{}-service", name),
        },
        spec: ServiceSpec {
            service_type: "NodePort",
            selector: app_labels(name),
            ports: vec![ServicePort {
                protocol: "TCP",
                port: SERVICE_PORT,
                target_port: spec.container_port,
                node_port: NODE_PORT,
            }],
        },
    };

    let deployment = serde_yaml::to_string(&deployment)?;
    let service = serde_yaml::to_string(&service)?;
    Ok(format!("{}---\n{}", deployment, service))
}

/// Writes `<image>-manifest.yaml` into `dir`
pub fn write_manifest(dir: &Path, spec: &ManifestSpec) -> Result<PathBuf, DeployError> {
    let manifest = render_manifest(spec)?;
    let path = dir.join(spec.file_name());
    std::fs::write(&path, manifest).map_err(|e| DeployError::io(&path, e))?;
    info!(path = %path.display(), "Kubernetes manifest written");
    Ok(path)
}

/// `kubectl apply -f <manifest>`; returns kubectl's stdout
pub async fn apply_manifest(
    runner: &dyn CommandRunner,
    manifest: &Path,
) -> Result<String, DeployError> {
    let path = manifest.display().to_string();
    let out = run_checked(runner, KUBECTL_PROGRAM, argv(["apply", "-f", &path]), None).await?;
    info!(manifest = %path, "Manifest applied");
    Ok(out.stdout.trim().to_string())
}

/// Makes a locally built image visible to the minikube cluster
pub async fn load_into_minikube(runner: &dyn CommandRunner, image: &str) -> Result<(), DeployError> {
    run_checked(runner, MINIKUBE_PROGRAM, argv(["image", "load", image]), None).await?;
    info!(image, "Image loaded into minikube");
    Ok(())
}
