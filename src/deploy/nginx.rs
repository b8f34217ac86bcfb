//! Reverse proxy in front of the running containers

use super::engine::ContainerEngine;
use super::error::DeployError;
use super::registry::ProxyRoute;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

pub const PROXY_CONTAINER: &str = "nginx-proxy";
pub const PROXY_PORT_MAPPING: &str = "80:80";
pub const NGINX_CONF_NAME: &str = "nginx.conf";

const PROXY_DOCKERFILE: &str = "FROM nginx:alpine\nCOPY nginx.conf /etc/nginx/nginx.conf\nEXPOSE 80\n";

/// nginx configuration with one `location` block per route
pub fn render_nginx_config(routes: &[ProxyRoute]) -> String {
    let mut config = String::from("events {}\nhttp {\n    server {\n        listen 80;\n");
    for route in routes {
        // Writing into a String cannot fail
        let _ = write!(
            config,
            "\n        location {prefix} {{\n            proxy_pass http://{container}:{port};\n            rewrite ^{prefix}$ / break;\n            rewrite ^{prefix}/(.*)$ /$1 break;\n            proxy_set_header Host $host;\n            proxy_set_header X-Real-IP $remote_addr;\n        }}\n",
            prefix = route.prefix,
            container = route.container,
            port = route.port,
        );
    }
    config.push_str("    }\n}\n");
    config
}

/// Writes `nginx.conf` and the proxy image's Dockerfile into `dir`
pub fn write_nginx_config(dir: &Path, routes: &[ProxyRoute]) -> Result<PathBuf, DeployError> {
    std::fs::create_dir_all(dir).map_err(|e| DeployError::io(dir, e))?;

    let conf = dir.join(NGINX_CONF_NAME);
    std::fs::write(&conf, render_nginx_config(routes)).map_err(|e| DeployError::io(&conf, e))?;

    let dockerfile = dir.join("Dockerfile");
    std::fs::write(&dockerfile, PROXY_DOCKERFILE).map_err(|e| DeployError::io(&dockerfile, e))?;

    Ok(conf)
}

/// Rewrites the proxy config and restarts the proxy container
pub async fn refresh_proxy(
    engine: &ContainerEngine,
    dir: &Path,
    routes: &[ProxyRoute],
) -> Result<(), DeployError> {
    write_nginx_config(dir, routes)?;

    engine.remove(PROXY_CONTAINER).await;
    engine.build(PROXY_CONTAINER, dir).await?;
    engine
        .run_detached(PROXY_CONTAINER, PROXY_CONTAINER, Some(PROXY_PORT_MAPPING))
        .await?;
    engine.verify_running(PROXY_CONTAINER).await?;

    info!(routes = routes.len(), "Proxy refreshed");
    Ok(())
}
