use crate::error::{PomupError, Result};
use crate::maven::RemoteRepository;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "pomup.toml";

/// Optional per-project settings read from `pomup.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub exclude_reactor: Option<bool>,
    pub repositories: Vec<RemoteRepository>,
    pub properties: Vec<PropertyLinkConfig>,
}

/// Explicit link from a property to the dependencies that use it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PropertyLinkConfig {
    pub name: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl ProjectConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PomupError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        let config: ProjectConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// `explicit` when given (it must exist), else `<project>/pomup.toml` if present.
    pub fn discover(
        project_dir: &Path,
        explicit: Option<&Path>,
    ) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        let default = project_dir.join(CONFIG_FILE);
        if default.is_file() {
            return Ok((Self::load(&default)?, Some(default)));
        }
        Ok((Self::default(), None))
    }

    fn validate(&self) -> Result<()> {
        if let Some(link) = self.properties.iter().find(|p| p.name.trim().is_empty()) {
            return Err(PomupError::Config(format!(
                "property link with dependencies {:?} has no name",
                link.dependencies
            )));
        }
        Ok(())
    }

    /// Repositories to query: configured ones, then those declared in the POM,
    /// then Maven Central. Duplicate URLs keep their first occurrence.
    pub fn repositories_with(&self, declared: &[RemoteRepository]) -> Vec<RemoteRepository> {
        let mut merged: Vec<RemoteRepository> = Vec::new();
        let candidates = self
            .repositories
            .iter()
            .chain(declared)
            .cloned()
            .chain(std::iter::once(RemoteRepository::central()));

        for repository in candidates {
            let url = normalize_url(&repository.url);
            if !merged.iter().any(|r| normalize_url(&r.url) == url) {
                merged.push(repository);
            }
        }
        merged
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_ascii_lowercase()
}
