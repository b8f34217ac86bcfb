//! `.csproj` inspection for .NET projects

use super::{BuildFacts, DEFAULT_BUILD_OUTPUT, DEFAULT_RUNTIME_VERSION};
use crate::snapshot::ProjectSnapshot;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

const PROJECT_EXTENSION: &str = "csproj";

fn framework_version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // net8.0, net8.0-windows, netcoreapp3.1
    RE.get_or_init(|| Regex::new(r"net(?:coreapp)?(\d+\.\d+)").expect("valid regex"))
}

/// Reads the first project descriptor in the project root
pub fn inspect(snapshot: &ProjectSnapshot<'_>) -> BuildFacts {
    let listing = match snapshot.root_listing() {
        Ok(listing) => listing,
        Err(e) => {
            warn!(error = %e, "Cannot list project root, using default .NET facts");
            return BuildFacts::default();
        }
    };

    let Some(descriptor) = listing.first_with_extension(PROJECT_EXTENSION) else {
        debug!("No .csproj in project root, using default .NET facts");
        return BuildFacts::default();
    };

    let fallback_output = derived_output_name(descriptor);
    let content = match snapshot.read_file(&listing.file_path(descriptor)) {
        Ok(content) => content,
        Err(e) => {
            warn!(descriptor, error = %e, "Cannot read project descriptor");
            return BuildFacts {
                target_runtime_version: DEFAULT_RUNTIME_VERSION.to_string(),
                build_output_name: fallback_output,
            };
        }
    };

    let facts = parse_descriptor(&content, &fallback_output);
    debug!(
        descriptor,
        runtime = %facts.target_runtime_version,
        output = %facts.build_output_name,
        "Extracted .NET build facts"
    );
    facts
}

/// Parses descriptor XML, falling back per property
pub fn parse_descriptor(content: &str, fallback_output: &str) -> BuildFacts {
    let doc = match roxmltree::Document::parse(content) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(error = %e, "Malformed project descriptor, using defaults");
            return BuildFacts {
                target_runtime_version: DEFAULT_RUNTIME_VERSION.to_string(),
                build_output_name: fallback_output.to_string(),
            };
        }
    };

    let target_runtime_version = doc
        .descendants()
        .filter(|n| n.is_element())
        .find(|n| n.tag_name().name().contains("TargetFramework"))
        .and_then(|n| n.text())
        .and_then(runtime_version)
        .unwrap_or_else(|| DEFAULT_RUNTIME_VERSION.to_string());

    let build_output_name = doc
        .descendants()
        .filter(|n| n.is_element())
        .find(|n| n.tag_name().name() == "AssemblyName")
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| format!("{}.dll", name))
        .unwrap_or_else(|| fallback_output.to_string());

    BuildFacts {
        target_runtime_version,
        build_output_name,
    }
}

/// `net7.0` -> `7.0`; the first framework wins for multi-targeting values
pub fn runtime_version(target_framework: &str) -> Option<String> {
    framework_version_re()
        .captures(target_framework)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// `MyApi.csproj` -> `MyApi.dll`
pub fn derived_output_name(descriptor: &str) -> String {
    match descriptor.strip_suffix(".csproj") {
        Some(stem) if !stem.is_empty() => format!("{}.dll", stem),
        _ => DEFAULT_BUILD_OUTPUT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn inspect_mock(fs: &MockFileSystem) -> BuildFacts {
        inspect(&ProjectSnapshot::new("/mock", fs))
    }

    #[test]
    fn test_sdk_style_project() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "app.csproj",
            r#"<Project Sdk="Microsoft.NET.Sdk.Web">
  <PropertyGroup>
    <TargetFramework>net7.0</TargetFramework>
    <AssemblyName>MyApi</AssemblyName>
  </PropertyGroup>
</Project>"#,
        );

        let facts = inspect_mock(&fs);
        assert_eq!(facts.target_runtime_version, "7.0");
        assert_eq!(facts.build_output_name, "MyApi.dll");
    }

    #[test]
    fn test_namespaced_legacy_project() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "Legacy.csproj",
            r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="15.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup>
    <TargetFramework>netcoreapp3.1</TargetFramework>
    <AssemblyName>Legacy.Service</AssemblyName>
  </PropertyGroup>
</Project>"#,
        );

        let facts = inspect_mock(&fs);
        assert_eq!(facts.target_runtime_version, "3.1");
        assert_eq!(facts.build_output_name, "Legacy.Service.dll");
    }

    #[test]
    fn test_missing_assembly_name_derives_from_file() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "Orders.csproj",
            r#"<Project Sdk="Microsoft.NET.Sdk"><PropertyGroup><TargetFramework>net6.0</TargetFramework></PropertyGroup></Project>"#,
        );

        let facts = inspect_mock(&fs);
        assert_eq!(facts.target_runtime_version, "6.0");
        assert_eq!(facts.build_output_name, "Orders.dll");
    }

    #[test]
    fn test_malformed_xml_degrades_to_defaults() {
        let fs = MockFileSystem::new();
        fs.add_file("Broken.csproj", "<Project><PropertyGroup>");

        let facts = inspect_mock(&fs);
        assert_eq!(facts.target_runtime_version, "8.0");
        assert_eq!(facts.build_output_name, "Broken.dll");
    }

    #[test]
    fn test_unreadable_descriptor_degrades_to_defaults() {
        let fs = MockFileSystem::new();
        fs.add_unreadable_file("Locked.csproj");

        let facts = inspect_mock(&fs);
        assert_eq!(facts.target_runtime_version, "8.0");
        assert_eq!(facts.build_output_name, "Locked.dll");
    }

    #[test]
    fn test_nested_descriptor_is_ignored() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "src/Api/Api.csproj",
            r#"<Project><PropertyGroup><AssemblyName>Api</AssemblyName></PropertyGroup></Project>"#,
        );

        assert_eq!(inspect_mock(&fs), BuildFacts::default());
    }

    #[test]
    fn test_first_descriptor_by_name() {
        let fs = MockFileSystem::new();
        fs.add_file("Zeta.csproj", "<Project/>");
        fs.add_file("Alpha.csproj", "<Project/>");

        assert_eq!(inspect_mock(&fs).build_output_name, "Alpha.dll");
    }

    #[test]
    fn test_unrecognized_framework_uses_default_version() {
        let facts = parse_descriptor(
            "<Project><PropertyGroup><TargetFramework>netstandard</TargetFramework></PropertyGroup></Project>",
            "Lib.dll",
        );
        assert_eq!(facts.target_runtime_version, "8.0");
    }

    #[test]
    fn test_empty_assembly_name_falls_back() {
        let facts = parse_descriptor(
            "<Project><PropertyGroup><AssemblyName>  </AssemblyName></PropertyGroup></Project>",
            "Web.dll",
        );
        assert_eq!(facts.build_output_name, "Web.dll");
    }

    #[test]
    fn test_runtime_version_variants() {
        assert_eq!(runtime_version("net8.0"), Some("8.0".to_string()));
        assert_eq!(runtime_version("net8.0-windows"), Some("8.0".to_string()));
        assert_eq!(runtime_version("net6.0;net7.0"), Some("6.0".to_string()));
        assert_eq!(runtime_version("netcoreapp2.2"), Some("2.2".to_string()));
        assert_eq!(runtime_version("netstandard2.0"), None);
    }

    #[test]
    fn test_derived_output_name() {
        assert_eq!(derived_output_name("MyApi.csproj"), "MyApi.dll");
        assert_eq!(derived_output_name(".csproj"), "app.dll");
    }
}
