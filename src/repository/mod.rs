use crate::error::Result;
use serde::Serialize;
use std::fmt;

pub mod cache;
pub mod factory;
pub mod progress;

pub use cache::CachingClient;
pub use factory::RepositoryFactory;
pub use progress::ProgressClient;

pub const DEFAULT_TYPE: &str = "jar";

/// Identity of a dependency: group, artifact, and the optional type/classifier pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

impl Coordinate {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            kind: DEFAULT_TYPE.to_string(),
            classifier: None,
        }
    }

    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_classifier(mut self, classifier: Option<String>) -> Self {
        self.classifier = classifier;
        self
    }

    /// `group:artifact`, the key catalogs and reactors are indexed by.
    pub fn key(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)?;
        if self.kind != DEFAULT_TYPE || self.classifier.is_some() {
            write!(f, ":{}", self.kind)?;
        }
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        Ok(())
    }
}

/// Catalog of published versions.
pub trait RepositoryClient: Send + Sync {
    /// Every known version string for the coordinate, in catalog order.
    fn fetch_available_versions(&self, coordinate: &Coordinate) -> Result<Vec<String>>;
}
