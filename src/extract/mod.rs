//! Dockerfile recovery from free-form model output
//!
//! Two phases: a fenced-block scanner that captures the first
//! "```dockerfile" block, then, when that yields nothing, a whitelist filter
//! that keeps directive lines only. When both come up empty the result is
//! [`Extraction::NothingRecovered`]; an empty Dockerfile is never produced.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub const FENCE_OPENER: &str = "```dockerfile";
pub const FENCE_CLOSER: &str = "```";

/// Keywords a kept line must start with after trimming (case-sensitive)
pub const DIRECTIVE_KEYWORDS: [&str; 11] = [
    "FROM",
    "WORKDIR",
    "COPY",
    "RUN",
    "CMD",
    "ENTRYPOINT",
    "ENV",
    "EXPOSE",
    "ARG",
    "LABEL",
    "#",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    FencedBlock,
    DirectiveScan,
}

/// Non-empty, ordered Dockerfile lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedArtifact {
    lines: Vec<String>,
    method: ExtractionMethod,
}

impl ExtractedArtifact {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn method(&self) -> ExtractionMethod {
        self.method
    }

    /// Lines joined with `\n`, the content written to disk
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    /// Trimmed lines that start with `keyword` followed by whitespace or end of line
    pub fn directives<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.lines.iter().map(|l| l.trim()).filter(move |l| {
            l.strip_prefix(keyword)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Recovered(ExtractedArtifact),
    NothingRecovered,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("No Dockerfile content could be recovered from a {response_chars}-character response")]
pub struct ExtractionError {
    pub response_chars: usize,
}

impl Extraction {
    pub fn artifact(&self) -> Option<&ExtractedArtifact> {
        match self {
            Self::Recovered(artifact) => Some(artifact),
            Self::NothingRecovered => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NothingRecovered)
    }
}

/// Recovers a Dockerfile from `raw`
pub fn extract(raw: &str) -> Extraction {
    let lines: Vec<&str> = raw.trim().lines().collect();

    let fenced = capture_fenced_block(&lines);
    if let Some(block) = fenced {
        // A blank block is treated like a missing one; the directive scan
        // still yields NothingRecovered when the reply has no directives
        if block.iter().any(|l| !l.trim().is_empty()) {
            debug!(lines = block.len(), "Recovered Dockerfile from fenced block");
            return Extraction::Recovered(ExtractedArtifact {
                lines: block.into_iter().map(str::to_string).collect(),
                method: ExtractionMethod::FencedBlock,
            });
        }
        debug!("Fenced block is empty, scanning for directive lines");
    }

    let scanned: Vec<String> = lines
        .iter()
        .filter(|line| is_directive(line))
        .map(|line| line.to_string())
        .collect();

    if scanned.is_empty() {
        warn!(response_chars = raw.len(), "No Dockerfile content in model response");
        return Extraction::NothingRecovered;
    }

    debug!(lines = scanned.len(), "Recovered Dockerfile from directive scan");
    Extraction::Recovered(ExtractedArtifact {
        lines: scanned,
        method: ExtractionMethod::DirectiveScan,
    })
}

/// Like [`extract`], surfacing the empty outcome as an error
pub fn extract_artifact(raw: &str) -> Result<ExtractedArtifact, ExtractionError> {
    match extract(raw) {
        Extraction::Recovered(artifact) => Ok(artifact),
        Extraction::NothingRecovered => Err(ExtractionError {
            response_chars: raw.len(),
        }),
    }
}

/// Lines of the first fenced block; `None` when no opener exists
fn capture_fenced_block<'a>(lines: &[&'a str]) -> Option<Vec<&'a str>> {
    let start = lines
        .iter()
        .position(|l| l.trim().starts_with(FENCE_OPENER))?;

    let block = lines[start + 1..]
        .iter()
        .take_while(|l| l.trim() != FENCE_CLOSER)
        .copied()
        .collect();
    Some(block)
}

pub fn is_directive(line: &str) -> bool {
    let trimmed = line.trim();
    DIRECTIVE_KEYWORDS.iter().any(|k| trimmed.starts_with(k))
}
