use crate::error::{PomupError, Result};
use crate::repository::Coordinate;
use crate::utils::compile_glob;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

/// Answers whether a coordinate is built by the current multi-module project.
pub trait ReactorMembership: Send + Sync {
    fn is_internally_produced(&self, coordinate: &Coordinate) -> bool;
}

/// Reactor membership keyed by `group:artifact`.
impl ReactorMembership for HashSet<String> {
    fn is_internally_produced(&self, coordinate: &Coordinate) -> bool {
        self.contains(&coordinate.key())
    }
}

/// `groupId[:artifactId[:type[:classifier]]]`, each segment a glob. Segments left
/// out match anything.
#[derive(Debug, Clone)]
pub struct ArtifactPattern {
    segments: Vec<Regex>,
}

impl ArtifactPattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(PomupError::Config("artifact pattern cannot be empty".to_string()));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        if parts.len() > 4 {
            return Err(PomupError::Config(format!(
                "artifact pattern '{}' has more than four segments",
                trimmed
            )));
        }

        let segments = parts
            .into_iter()
            .map(|part| compile_glob(part.trim()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { segments })
    }

    pub fn matches(&self, coordinate: &Coordinate) -> bool {
        let values = [
            coordinate.group.as_str(),
            coordinate.artifact.as_str(),
            coordinate.kind.as_str(),
            coordinate.classifier.as_deref().unwrap_or(""),
        ];
        self.segments
            .iter()
            .zip(values)
            .all(|(segment, value)| segment.is_match(value))
    }
}

/// Include/exclude allow-lists. Exclusions win; no inclusions means include all.
#[derive(Debug, Clone, Default)]
pub struct ArtifactFilter {
    includes: Vec<ArtifactPattern>,
    excludes: Vec<ArtifactPattern>,
}

impl ArtifactFilter {
    pub fn new<I, E>(includes: I, excludes: E) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Ok(Self {
            includes: parse_patterns(includes)?,
            excludes: parse_patterns(excludes)?,
        })
    }

    pub fn is_excluded(&self, coordinate: &Coordinate) -> bool {
        self.excludes.iter().any(|p| p.matches(coordinate))
    }

    pub fn is_included(&self, coordinate: &Coordinate) -> bool {
        self.includes.is_empty() || self.includes.iter().any(|p| p.matches(coordinate))
    }
}

pub fn parse_patterns<I>(patterns: I) -> Result<Vec<ArtifactPattern>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|pattern| ArtifactPattern::parse(pattern.as_ref()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    ReactorProduced,
    Excluded,
    NotIncluded,
}

/// Decides per coordinate whether it is updated at all. Never touches the POM.
#[derive(Clone)]
pub struct EligibilityFilter {
    exclude_reactor: bool,
    reactor: Arc<dyn ReactorMembership>,
    artifacts: ArtifactFilter,
}

impl EligibilityFilter {
    pub fn new(
        exclude_reactor: bool,
        reactor: Arc<dyn ReactorMembership>,
        artifacts: ArtifactFilter,
    ) -> Self {
        Self {
            exclude_reactor,
            reactor,
            artifacts,
        }
    }

    pub fn evaluate(&self, coordinate: &Coordinate) -> Eligibility {
        if self.exclude_reactor && self.reactor.is_internally_produced(coordinate) {
            Eligibility::ReactorProduced
        } else if self.artifacts.is_excluded(coordinate) {
            Eligibility::Excluded
        } else if !self.artifacts.is_included(coordinate) {
            Eligibility::NotIncluded
        } else {
            Eligibility::Eligible
        }
    }

    pub fn is_eligible(&self, coordinate: &Coordinate) -> bool {
        self.evaluate(coordinate) == Eligibility::Eligible
    }

    pub fn is_reactor_member(&self, coordinate: &Coordinate) -> bool {
        self.reactor.is_internally_produced(coordinate)
    }
}
