//! Prompt synthesis
//!
//! A prompt is the shared [`templates::PREAMBLE`], a blank line, and the block
//! for the detected stack. The result is a pure function of its inputs, so two
//! calls with the same label and facts are byte-identical.

pub mod templates;

use crate::manifest::BuildFacts;
use crate::stack::StackLabel;
use serde::Serialize;
use std::fmt;

pub use templates::{template_for, StackTemplate, TemplateBody, PREAMBLE};

/// Immutable instruction text sent to the generation backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PromptDocument(String);

impl PromptDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PromptDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PromptDocument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds the prompt for `label`
///
/// `facts` only matter for stacks that interpolate them; a .NET prompt without
/// facts uses [`BuildFacts::default`].
pub fn synthesize(label: StackLabel, facts: Option<&BuildFacts>) -> PromptDocument {
    let defaults = BuildFacts::default();
    let facts = facts.unwrap_or(&defaults);
    let block = template_for(label).render(facts);

    PromptDocument(format!("{}\n\n{}", PREAMBLE, block))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dotnet_facts(version: &str, output: &str) -> BuildFacts {
        BuildFacts {
            target_runtime_version: version.to_string(),
            build_output_name: output.to_string(),
        }
    }

    #[test]
    fn test_every_prompt_starts_with_preamble() {
        for label in StackLabel::all_variants() {
            let prompt = synthesize(*label, None);
            assert!(prompt.as_str().starts_with(PREAMBLE));
            assert!(prompt.as_str()[PREAMBLE.len()..].starts_with("\n\nProject type:"));
        }
    }

    #[test]
    fn test_deterministic() {
        let facts = dotnet_facts("7.0", "MyApi.dll");
        for label in StackLabel::all_variants() {
            assert_eq!(synthesize(*label, Some(&facts)), synthesize(*label, Some(&facts)));
        }
    }

    #[test]
    fn test_python_flask_prompt() {
        let prompt = synthesize(StackLabel::PythonFlask, None);
        assert!(prompt.as_str().contains("python:3.11-slim"));
        assert!(prompt.as_str().contains("gunicorn"));
        assert!(prompt.as_str().contains("0.0.0.0:4000"));
    }

    #[test]
    fn test_dotnet_interpolation() {
        let prompt = synthesize(StackLabel::DotNet, Some(&dotnet_facts("7.0", "MyApi.dll")));
        let text = prompt.as_str();

        assert!(text.contains("mcr.microsoft.com/dotnet/sdk:7.0"));
        assert!(text.contains("mcr.microsoft.com/dotnet/runtime:7.0"));
        assert!(text.contains(r#"ENTRYPOINT ["dotnet", "MyApi.dll"]"#));
        assert!(!text.contains("8.0"));
    }

    #[test]
    fn test_dotnet_without_facts_uses_defaults() {
        let prompt = synthesize(StackLabel::DotNet, None);
        assert!(prompt.as_str().contains("sdk:8.0"));
        assert!(prompt.as_str().contains(r#""dotnet", "app.dll""#));
    }

    #[test]
    fn test_output_name_change_only_touches_its_occurrences() {
        let a = synthesize(StackLabel::DotNet, Some(&dotnet_facts("7.0", "Alpha.dll")));
        let b = synthesize(StackLabel::DotNet, Some(&dotnet_facts("7.0", "Omega.dll")));

        assert_ne!(a, b);
        assert_eq!(a.as_str().replace("Alpha.dll", "Omega.dll"), b.as_str());
    }

    #[test]
    fn test_facts_ignored_for_other_stacks() {
        let facts = dotnet_facts("5.0", "Other.dll");
        for label in StackLabel::all_variants() {
            if *label != StackLabel::DotNet {
                assert_eq!(synthesize(*label, Some(&facts)), synthesize(*label, None));
            }
        }
    }

    #[test]
    fn test_vite_prompt_has_two_stages() {
        let prompt = synthesize(StackLabel::ViteJs, None);
        let text = prompt.as_str();
        assert!(text.contains("Builder stage"));
        assert!(text.contains("Final stage"));
        assert!(text.contains("nginx:alpine"));
    }

    #[test]
    fn test_unknown_prompt_asks_for_inference() {
        let prompt = synthesize(StackLabel::Unknown, None);
        assert!(prompt.as_str().contains("Infer the language"));
    }
}
