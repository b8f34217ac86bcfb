use serde::{Deserialize, Serialize};
use std::fmt;

/// Technology stack assigned to a project
///
/// The set is closed and ordered; classification picks exactly one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StackLabel {
    #[serde(rename = "nodejs")]
    NodeJs,
    PythonFlask,
    #[serde(rename = "dotnet")]
    DotNet,
    JavaMaven,
    JavaGradle,
    JavaManual,
    React,
    ViteJs,
    VanillaJs,
    Unknown,
}

impl StackLabel {
    /// Human-facing name, also the input to container name normalization
    pub fn name(&self) -> &'static str {
        match self {
            Self::NodeJs => "Node.js",
            Self::PythonFlask => "Python Flask",
            Self::DotNet => ".NET",
            Self::JavaMaven => "Java Maven",
            Self::JavaGradle => "Java Gradle",
            Self::JavaManual => "Java (manual)",
            Self::React => "React",
            Self::ViteJs => "Vite JS",
            Self::VanillaJs => "Vanilla JS",
            Self::Unknown => "Unknown",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all_variants()
            .iter()
            .copied()
            .find(|label| label.name().eq_ignore_ascii_case(name))
    }

    pub fn all_variants() -> &'static [Self] {
        &[
            Self::NodeJs,
            Self::PythonFlask,
            Self::DotNet,
            Self::JavaMaven,
            Self::JavaGradle,
            Self::JavaManual,
            Self::React,
            Self::ViteJs,
            Self::VanillaJs,
            Self::Unknown,
        ]
    }

    /// Whether the prompt template for this stack interpolates manifest facts
    pub fn needs_build_facts(&self) -> bool {
        matches!(self, Self::DotNet)
    }
}

impl fmt::Display for StackLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_serialization() {
        assert_eq!(
            serde_json::to_string(&StackLabel::PythonFlask).unwrap(),
            "\"python-flask\""
        );
        assert_eq!(
            serde_json::to_string(&StackLabel::NodeJs).unwrap(),
            "\"nodejs\""
        );
        assert_eq!(
            serde_json::to_string(&StackLabel::DotNet).unwrap(),
            "\"dotnet\""
        );
        assert_eq!(
            serde_json::to_string(&StackLabel::ViteJs).unwrap(),
            "\"vite-js\""
        );
    }

    #[test]
    fn test_label_deserialization() {
        let label: StackLabel = serde_json::from_str("\"java-manual\"").unwrap();
        assert_eq!(label, StackLabel::JavaManual);
        assert!(serde_json::from_str::<StackLabel>("\"cobol\"").is_err());
    }

    #[test]
    fn test_name_round_trip() {
        for label in StackLabel::all_variants() {
            assert_eq!(StackLabel::from_name(label.name()), Some(*label));
        }
        assert_eq!(StackLabel::from_name("vite js"), Some(StackLabel::ViteJs));
        assert_eq!(StackLabel::from_name("Rust"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(StackLabel::JavaManual.to_string(), "Java (manual)");
        assert_eq!(StackLabel::DotNet.to_string(), ".NET");
    }

    #[test]
    fn test_only_dotnet_needs_facts() {
        let needing: Vec<_> = StackLabel::all_variants()
            .iter()
            .filter(|l| l.needs_build_facts())
            .collect();
        assert_eq!(needing, vec![&StackLabel::DotNet]);
    }
}
