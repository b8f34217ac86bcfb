use super::StackLabel;

/// Port used when a stack has no conventional port
pub const DEFAULT_PORT: u16 = 4000;

const CONTAINER_SUFFIX: &str = "-container";

/// Conventional port the generated image listens on
pub fn resolve_port(label: StackLabel) -> u16 {
    match label {
        StackLabel::NodeJs => 3000,
        StackLabel::PythonFlask => 4000,
        StackLabel::DotNet => 5000,
        StackLabel::JavaMaven => 8080,
        StackLabel::JavaGradle => 8081,
        StackLabel::JavaManual => 8082,
        StackLabel::React | StackLabel::ViteJs | StackLabel::VanillaJs => 80,
        StackLabel::Unknown => DEFAULT_PORT,
    }
}

/// Container and image name for a stack, e.g. `python-flask-container`
pub fn normalize_container_name(label: StackLabel) -> String {
    let base: String = label
        .name()
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    format!("{}{}", base, CONTAINER_SUFFIX)
}

/// Reverse-proxy path prefix for a container, e.g. `/python-flask`
pub fn route_prefix(container_name: &str) -> String {
    format!("/{}", container_name.replace(CONTAINER_SUFFIX, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_table() {
        assert_eq!(resolve_port(StackLabel::NodeJs), 3000);
        assert_eq!(resolve_port(StackLabel::PythonFlask), 4000);
        assert_eq!(resolve_port(StackLabel::DotNet), 5000);
        assert_eq!(resolve_port(StackLabel::JavaMaven), 8080);
        assert_eq!(resolve_port(StackLabel::JavaGradle), 8081);
        assert_eq!(resolve_port(StackLabel::JavaManual), 8082);
        assert_eq!(resolve_port(StackLabel::React), 80);
        assert_eq!(resolve_port(StackLabel::ViteJs), 80);
        assert_eq!(resolve_port(StackLabel::VanillaJs), 80);
    }

    #[test]
    fn test_unknown_falls_back_to_default() {
        assert_eq!(resolve_port(StackLabel::Unknown), DEFAULT_PORT);
    }

    #[test]
    fn test_container_names() {
        assert_eq!(
            normalize_container_name(StackLabel::PythonFlask),
            "python-flask-container"
        );
        assert_eq!(normalize_container_name(StackLabel::NodeJs), "nodejs-container");
        assert_eq!(normalize_container_name(StackLabel::DotNet), "net-container");
        assert_eq!(
            normalize_container_name(StackLabel::JavaManual),
            "java-manual-container"
        );
        assert_eq!(normalize_container_name(StackLabel::ViteJs), "vite-js-container");
    }

    #[test]
    fn test_container_names_are_valid_docker_names() {
        for label in StackLabel::all_variants() {
            let name = normalize_container_name(*label);
            assert!(name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'));
            assert!(name.ends_with("-container"));
        }
    }

    #[test]
    fn test_route_prefix() {
        assert_eq!(route_prefix("python-flask-container"), "/python-flask");
        assert_eq!(route_prefix("react-container"), "/react");
    }
}
