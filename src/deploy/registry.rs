use super::error::DeployError;
use crate::stack::route_prefix;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// File under the proxy directory holding the registered routes
pub const ROUTES_FILE: &str = "routes.json";

/// Reverse-proxy path prefix mapped to a running container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRoute {
    pub prefix: String,
    pub container: String,
    pub port: u16,
}

impl ProxyRoute {
    pub fn new(prefix: impl Into<String>, container: impl Into<String>, port: u16) -> Self {
        Self {
            prefix: prefix.into(),
            container: container.into(),
            port,
        }
    }

    /// Route whose prefix is derived from the container name
    pub fn for_container(container: impl Into<String>, port: u16) -> Self {
        let container = container.into();
        Self {
            prefix: route_prefix(&container),
            container,
            port,
        }
    }
}

/// Containers currently exposed through the proxy, in registration order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerRegistry {
    routes: Vec<ProxyRoute>,
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads routes saved by [`Self::save`]; a missing file is an empty registry
    pub fn load(path: &Path) -> Result<Self, DeployError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No saved routes");
                return Ok(Self::new());
            }
            Err(e) => return Err(DeployError::io(path, e)),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), DeployError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DeployError::io(parent, e))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| DeployError::io(path, e))
    }

    /// Adds `route`; an existing route for the same container is replaced in place
    pub fn register(&mut self, route: ProxyRoute) {
        match self.routes.iter_mut().find(|r| r.container == route.container) {
            Some(existing) => *existing = route,
            None => self.routes.push(route),
        }
    }

    pub fn remove(&mut self, container: &str) -> Option<ProxyRoute> {
        let index = self.routes.iter().position(|r| r.container == container)?;
        Some(self.routes.remove(index))
    }

    pub fn routes(&self) -> &[ProxyRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
