//! Running, publishing and deploying generated images
//!
//! Everything here shells out through a [`crate::command::CommandRunner`].

pub mod engine;
pub mod error;
pub mod kubernetes;
pub mod nginx;
pub mod registry;

pub use engine::{registry_image, ContainerEngine, DOCKER_PROGRAM};
pub use error::DeployError;
pub use kubernetes::{
    apply_manifest, load_into_minikube, render_manifest, write_manifest, ManifestSpec,
    DEFAULT_REPLICAS,
};
pub use nginx::{refresh_proxy, render_nginx_config, write_nginx_config, PROXY_CONTAINER};
pub use registry::{ContainerRegistry, ProxyRoute, ROUTES_FILE};
