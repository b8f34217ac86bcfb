//! Stack classification over the fixture projects

mod support;

use dockgen::fs::RealFileSystem;
use dockgen::pipeline::{inspect_project, prepare_request};
use dockgen::StackLabel;
use support::fixture_path;
use yare::parameterized;

#[parameterized(
    nodejs_express = { "nodejs-express", StackLabel::NodeJs, 3000, "nodejs-container" },
    react_app = { "react-app", StackLabel::React, 80, "react-container" },
    python_flask = { "python-flask", StackLabel::PythonFlask, 4000, "python-flask-container" },
    dotnet_api = { "dotnet-api", StackLabel::DotNet, 5000, "net-container" },
    java_maven = { "java-maven", StackLabel::JavaMaven, 8080, "java-maven-container" },
    java_gradle = { "java-gradle", StackLabel::JavaGradle, 8081, "java-gradle-container" },
    java_manual = { "java-manual", StackLabel::JavaManual, 8082, "java-manual-container" },
    vite_app = { "vite-app", StackLabel::ViteJs, 80, "vite-js-container" },
    vanilla_js = { "vanilla-js", StackLabel::VanillaJs, 80, "vanilla-js-container" },
    unknown_docs = { "unknown-docs", StackLabel::Unknown, 4000, "unknown-container" },
    nested_flask = { "nested-flask", StackLabel::PythonFlask, 4000, "python-flask-container" },
)]
fn test_fixture_classification(fixture: &str, label: StackLabel, port: u16, container: &str) {
    let report = inspect_project(&RealFileSystem, &fixture_path(fixture))
        .expect("Fixture should be inspectable");

    assert_eq!(report.label, label, "fixture {}", fixture);
    assert_eq!(report.port, port);
    assert_eq!(report.container_name, container);
}

#[test]
fn test_nested_match_reports_directory() {
    let root = fixture_path("nested-flask");
    let report = inspect_project(&RealFileSystem, &root).unwrap();
    assert_eq!(report.matched_dir, Some(root.join("backend")));
}

#[test]
fn test_dotnet_fixture_facts_reach_prompt() {
    let prepared = prepare_request(&RealFileSystem, &fixture_path("dotnet-api")).unwrap();

    let facts = prepared.report.build_facts.expect(".NET projects carry build facts");
    assert_eq!(facts.target_runtime_version, "7.0");
    assert_eq!(facts.build_output_name, "MyApi.dll");

    let prompt = prepared.prompt.as_str();
    assert!(prompt.contains("MyApi.dll"));
    assert!(prompt.contains("sdk:7.0"));
}

#[test]
fn test_flask_prompt_mentions_runtime() {
    let prepared = prepare_request(&RealFileSystem, &fixture_path("python-flask")).unwrap();
    let prompt = prepared.prompt.as_str();
    assert!(prompt.contains("python:3.11-slim"));
    assert!(prompt.contains("gunicorn"));
    assert!(prepared.report.build_facts.is_none());
}

#[test]
fn test_vite_prompt_is_multi_stage() {
    let prepared = prepare_request(&RealFileSystem, &fixture_path("vite-app")).unwrap();
    assert!(prepared.prompt.as_str().contains("nginx:alpine"));
}

#[test]
fn test_prompt_is_deterministic() {
    let first = prepare_request(&RealFileSystem, &fixture_path("react-app")).unwrap();
    let second = prepare_request(&RealFileSystem, &fixture_path("react-app")).unwrap();
    assert_eq!(first.prompt, second.prompt);
}
