use crate::extract::ExtractedArtifact;
use anyhow::Result;

/// Artifact plus the context a rule needs to judge it
pub struct ArtifactUnderReview<'a> {
    pub artifact: &'a ExtractedArtifact,
    pub expected_port: u16,
}

pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, target: &ArtifactUnderReview<'_>) -> Result<()>;
}

pub struct StartsWithFromRule;

impl ValidationRule for StartsWithFromRule {
    fn name(&self) -> &'static str {
        "StartsWithFrom"
    }

    fn validate(&self, target: &ArtifactUnderReview<'_>) -> Result<()> {
        let first = target
            .artifact
            .lines()
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with("ARG"));

        match first {
            Some(line) if line.starts_with("FROM") => Ok(()),
            Some(line) => anyhow::bail!("First instruction should be FROM, found '{}'", line),
            None => anyhow::bail!("Dockerfile has no instructions"),
        }
    }
}

pub struct HasStartCommandRule;

impl ValidationRule for HasStartCommandRule {
    fn name(&self) -> &'static str {
        "HasStartCommand"
    }

    fn validate(&self, target: &ArtifactUnderReview<'_>) -> Result<()> {
        let artifact = target.artifact;
        if artifact.directives("CMD").next().is_none()
            && artifact.directives("ENTRYPOINT").next().is_none()
        {
            anyhow::bail!("Dockerfile has neither CMD nor ENTRYPOINT");
        }
        Ok(())
    }
}

pub struct ExposesExpectedPortRule;

impl ValidationRule for ExposesExpectedPortRule {
    fn name(&self) -> &'static str {
        "ExposesExpectedPort"
    }

    fn validate(&self, target: &ArtifactUnderReview<'_>) -> Result<()> {
        let exposed: Vec<u16> = target
            .artifact
            .directives("EXPOSE")
            .flat_map(|l| l["EXPOSE".len()..].split_whitespace())
            .filter_map(|p| p.split('/').next()?.parse().ok())
            .collect();

        // No EXPOSE at all is allowed; the port is published at run time
        if exposed.is_empty() || exposed.contains(&target.expected_port) {
            return Ok(());
        }
        anyhow::bail!(
            "Expected port {} to be exposed, found {:?}",
            target.expected_port,
            exposed
        );
    }
}
