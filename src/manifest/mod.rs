//! Build facts read from stack manifests
//!
//! Inspection never fails: anything missing or malformed degrades to the
//! documented defaults so the rest of the pipeline always has facts to work
//! with.

pub mod dotnet;

use crate::snapshot::ProjectSnapshot;
use crate::stack::StackLabel;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RUNTIME_VERSION: &str = "8.0";
pub const DEFAULT_BUILD_OUTPUT: &str = "app.dll";

/// Facts interpolated into stack templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildFacts {
    /// Runtime version used for image tags, e.g. `7.0`
    pub target_runtime_version: String,
    /// Name of the built artifact launched at runtime, e.g. `MyApi.dll`
    pub build_output_name: String,
}

impl Default for BuildFacts {
    fn default() -> Self {
        Self {
            target_runtime_version: DEFAULT_RUNTIME_VERSION.to_string(),
            build_output_name: DEFAULT_BUILD_OUTPUT.to_string(),
        }
    }
}

/// Extracts facts for stacks whose template needs them; `None` otherwise
pub fn extract_build_facts(snapshot: &ProjectSnapshot<'_>, label: StackLabel) -> Option<BuildFacts> {
    match label {
        StackLabel::DotNet => Some(dotnet::inspect(snapshot)),
        _ => None,
    }
}
