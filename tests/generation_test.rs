//! End-to-end generation against fixture copies with a scripted backend

mod support;

use dockgen::extract::ExtractionMethod;
use dockgen::gateway::{GenerationGateway, RetryPolicy};
use dockgen::llm::{BackendError, MockLLMClient, MockResponse};
use dockgen::pipeline::{GenerationPipeline, PipelineError, DOCKERFILE_NAME};
use dockgen::StackLabel;
use std::sync::Arc;
use std::time::Duration;
use support::copy_fixture;

const FLASK_RESPONSE: &str = "Here is a production-ready Dockerfile:\n\n\
```dockerfile\n\
FROM python:3.11-slim\n\
WORKDIR /app\n\
COPY requirements.txt .\n\
RUN pip install --no-cache-dir -r requirements.txt\n\
COPY . .\n\
EXPOSE 4000\n\
CMD [\"gunicorn\", \"--bind\", \"0.0.0.0:4000\", \"app:app\"]\n\
```\n\n\
Build it with `docker build -t app .`";

fn pipeline(mock: Arc<MockLLMClient>, retries: u32) -> GenerationPipeline {
    GenerationPipeline::new(GenerationGateway::new(
        mock,
        Duration::from_secs(5),
        RetryPolicy::new(retries, Duration::from_millis(1)),
    ))
}

#[tokio::test]
async fn test_fenced_response_written_and_published() {
    let (temp, project) = copy_fixture("python-flask");
    let public = temp.path().join("static").join("generated");

    let mock = Arc::new(MockLLMClient::new());
    mock.add_response(MockResponse::text(FLASK_RESPONSE));

    let outcome = pipeline(mock.clone(), 0)
        .with_public_dir(&public)
        .run(&project)
        .await
        .expect("generation should succeed");

    assert_eq!(outcome.detection.label, StackLabel::PythonFlask);
    assert_eq!(outcome.extraction_method, ExtractionMethod::FencedBlock);
    assert_eq!(outcome.dockerfile.lines().count(), 7);
    assert!(!outcome.dockerfile.contains("```"));
    assert!(outcome.warnings.is_empty());

    let written = std::fs::read_to_string(project.join(DOCKERFILE_NAME)).unwrap();
    assert_eq!(written, outcome.dockerfile);
    let copied = std::fs::read_to_string(public.join(DOCKERFILE_NAME)).unwrap();
    assert_eq!(copied, written);

    let prompts = mock.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("gunicorn"));
}

#[tokio::test]
async fn test_unfenced_response_scanned_for_directives() {
    let (_temp, project) = copy_fixture("nodejs-express");

    let mock = Arc::new(MockLLMClient::new());
    mock.add_response(MockResponse::text(
        "Sure! Start from the official image.\nFROM node:18-alpine\nThen install deps:\nRUN npm ci\nCMD [\"node\", \"index.js\"]",
    ));

    let outcome = pipeline(mock, 0).run(&project).await.unwrap();

    assert_eq!(outcome.extraction_method, ExtractionMethod::DirectiveScan);
    assert_eq!(
        outcome.dockerfile,
        "FROM node:18-alpine\nRUN npm ci\nCMD [\"node\", \"index.js\"]"
    );
}

#[tokio::test]
async fn test_port_mismatch_is_a_warning_only() {
    let (_temp, project) = copy_fixture("dotnet-api");

    let mock = Arc::new(MockLLMClient::new());
    mock.add_response(MockResponse::text(
        "```dockerfile\nFROM mcr.microsoft.com/dotnet/aspnet:7.0\nEXPOSE 80\nENTRYPOINT [\"dotnet\", \"MyApi.dll\"]\n```",
    ));

    let outcome = pipeline(mock, 0).run(&project).await.unwrap();

    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].contains("5000"));
    assert!(project.join(DOCKERFILE_NAME).exists());
}

#[tokio::test]
async fn test_retry_then_success() {
    let (_temp, project) = copy_fixture("vanilla-js");

    let mock = Arc::new(MockLLMClient::new());
    mock.add_responses(vec![
        MockResponse::error(BackendError::NetworkError {
            message: "connection reset".to_string(),
        }),
        MockResponse::text("   "),
        MockResponse::text("```dockerfile\nFROM nginx:alpine\nCOPY . /usr/share/nginx/html\nEXPOSE 80\n```"),
    ]);

    let outcome = pipeline(mock, 2).run(&project).await.unwrap();
    assert_eq!(outcome.attempts, 3);
}

#[tokio::test]
async fn test_unusable_response_leaves_project_untouched() {
    let (temp, project) = copy_fixture("react-app");
    let public = temp.path().join("public-out");

    let mock = Arc::new(MockLLMClient::new());
    mock.add_response(MockResponse::text(
        "I cannot generate a Dockerfile without more information about your project.",
    ));

    let err = pipeline(mock, 0)
        .with_public_dir(&public)
        .run(&project)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::ExtractionEmpty { .. }));
    assert!(!project.join(DOCKERFILE_NAME).exists());
    assert!(!public.exists());
}

#[tokio::test]
async fn test_backend_down_is_unavailable() {
    let (_temp, project) = copy_fixture("java-maven");

    let mock = Arc::new(MockLLMClient::new());
    mock.add_responses(vec![
        MockResponse::error(BackendError::NetworkError {
            message: "connection refused".to_string(),
        }),
        MockResponse::error(BackendError::NetworkError {
            message: "connection refused".to_string(),
        }),
    ]);

    let err = pipeline(mock, 1).run(&project).await.unwrap_err();
    match err {
        PipelineError::GenerationUnavailable { attempts, reason, .. } => {
            assert_eq!(attempts, 2);
            assert!(reason.contains("connection refused"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(!project.join(DOCKERFILE_NAME).exists());
}

#[tokio::test]
async fn test_every_attempt_timing_out_is_a_timeout() {
    let (_temp, project) = copy_fixture("java-gradle");

    let mock = Arc::new(MockLLMClient::new());
    mock.add_responses(vec![
        MockResponse::text("FROM late").delayed(Duration::from_millis(300)),
        MockResponse::text("FROM late").delayed(Duration::from_millis(300)),
    ]);

    let pipeline = GenerationPipeline::new(GenerationGateway::new(
        mock,
        Duration::from_millis(20),
        RetryPolicy::new(1, Duration::from_millis(1)),
    ));
    let err = pipeline.run(&project).await.unwrap_err();
    assert!(matches!(err, PipelineError::GenerationTimeout { attempts: 2, .. }));
    assert!(err.help_message().contains("timeout") || err.help_message().contains("Timeout"));
}
