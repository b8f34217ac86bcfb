use crate::extract::ExtractedArtifact;
use crate::validation::rules::{
    ArtifactUnderReview, ExposesExpectedPortRule, HasStartCommandRule, StartsWithFromRule,
    ValidationRule,
};
use anyhow::Result;

pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    /// Fails on the first broken rule
    pub fn validate(&self, artifact: &ExtractedArtifact, expected_port: u16) -> Result<()> {
        let target = ArtifactUnderReview {
            artifact,
            expected_port,
        };
        for rule in &self.rules {
            if let Err(e) = rule.validate(&target) {
                anyhow::bail!("[{}] {}", rule.name(), e);
            }
        }
        Ok(())
    }

    /// Every broken rule as a `[Rule] message` warning
    pub fn warnings(&self, artifact: &ExtractedArtifact, expected_port: u16) -> Vec<String> {
        let target = ArtifactUnderReview {
            artifact,
            expected_port,
        };
        self.rules
            .iter()
            .filter_map(|rule| {
                rule.validate(&target)
                    .err()
                    .map(|e| format!("[{}] {}", rule.name(), e))
            })
            .collect()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            rules: vec![
                Box::new(StartsWithFromRule),
                Box::new(HasStartCommandRule),
                Box::new(ExposesExpectedPortRule),
            ],
        }
    }
}
