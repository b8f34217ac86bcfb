//! Ordered heuristic classification of a project tree
//!
//! Directories are visited in pre-order. In each directory the rules are
//! evaluated in [`DetectionRule::ORDER`]; the first directory where any rule
//! fires decides the label. Rule order is priority order, not specificity: a
//! directory holding both `pom.xml` and `*.java` files is Maven.

use super::StackLabel;
use crate::snapshot::{DirListing, ProjectSnapshot};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

const PACKAGE_JSON: &str = "package.json";
const REACT_MARKERS: [&str; 2] = ["react-scripts", "\"react\""];

/// One classification heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionRule {
    PackageDescriptor,
    PythonEntry,
    DotNetProject,
    MavenDescriptor,
    GradleScript,
    JavaSources,
    ViteConfig,
    StaticWeb,
}

impl DetectionRule {
    pub const ORDER: [DetectionRule; 8] = [
        Self::PackageDescriptor,
        Self::PythonEntry,
        Self::DotNetProject,
        Self::MavenDescriptor,
        Self::GradleScript,
        Self::JavaSources,
        Self::ViteConfig,
        Self::StaticWeb,
    ];

    fn evaluate(&self, snapshot: &ProjectSnapshot<'_>, dir: &DirListing) -> Option<StackLabel> {
        match self {
            Self::PackageDescriptor => {
                if !dir.has_file(PACKAGE_JSON) {
                    return None;
                }
                if declares_react(snapshot, dir) {
                    Some(StackLabel::React)
                } else {
                    Some(StackLabel::NodeJs)
                }
            }
            Self::PythonEntry => (dir.has_file("requirements.txt") || dir.has_file("app.py"))
                .then_some(StackLabel::PythonFlask),
            Self::DotNetProject => dir.has_extension("csproj").then_some(StackLabel::DotNet),
            Self::MavenDescriptor => dir.has_file("pom.xml").then_some(StackLabel::JavaMaven),
            Self::GradleScript => dir.has_file("build.gradle").then_some(StackLabel::JavaGradle),
            Self::JavaSources => dir.has_extension("java").then_some(StackLabel::JavaManual),
            Self::ViteConfig => (dir.has_file("vite.config.js") || dir.has_file("vite.config.ts"))
                .then_some(StackLabel::ViteJs),
            Self::StaticWeb => (dir.has_extension("html") && dir.has_extension("js"))
                .then_some(StackLabel::VanillaJs),
        }
    }
}

fn declares_react(snapshot: &ProjectSnapshot<'_>, dir: &DirListing) -> bool {
    match snapshot.read_file(&dir.file_path(PACKAGE_JSON)) {
        Ok(content) => REACT_MARKERS.iter().any(|m| content.contains(m)),
        Err(e) => {
            debug!(dir = %dir.path.display(), error = %e, "package.json unreadable, treating as plain Node.js");
            false
        }
    }
}

/// Label plus where and why it was assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub label: StackLabel,
    /// Directory whose contents matched, `None` for Unknown
    pub matched_dir: Option<PathBuf>,
    pub rule: Option<DetectionRule>,
    pub directories_visited: usize,
}

/// Assigns exactly one stack label to the project
pub fn classify(snapshot: &ProjectSnapshot<'_>) -> StackLabel {
    classify_detailed(snapshot).label
}

pub fn classify_detailed(snapshot: &ProjectSnapshot<'_>) -> Classification {
    let mut visited = 0;

    for dir in snapshot.directories() {
        visited += 1;
        for rule in DetectionRule::ORDER {
            if let Some(label) = rule.evaluate(snapshot, &dir) {
                info!(
                    label = %label,
                    rule = ?rule,
                    dir = %dir.path.display(),
                    "Project classified"
                );
                return Classification {
                    label,
                    matched_dir: Some(dir.path),
                    rule: Some(rule),
                    directories_visited: visited,
                };
            }
        }
    }

    info!(
        root = %snapshot.root().display(),
        directories_visited = visited,
        "No stack rule matched, classifying as Unknown"
    );
    Classification {
        label: StackLabel::Unknown,
        matched_dir: None,
        rule: None,
        directories_visited: visited,
    }
}
