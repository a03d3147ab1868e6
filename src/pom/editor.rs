use crate::error::{PomupError, Result};
use crate::pom::model::{self, DependencySection, PomModel, Site};
use crate::pom::xml::{self, XmlElement};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

pub const BACKUP_SUFFIX: &str = ".versionsBackup";

/// Single owner of the POM text. Every edit re-reads the current buffer, so a
/// patch never works from offsets computed before an earlier patch moved them.
#[derive(Debug, Clone)]
pub struct PomDocument {
    path: Option<PathBuf>,
    original: String,
    text: String,
}

impl PomDocument {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            PomupError::ManifestParsing(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            original: text.clone(),
            text,
        })
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            path: None,
            original: text.clone(),
            text,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_modified(&self) -> bool {
        self.text != self.original
    }

    pub fn model(&self) -> Result<PomModel> {
        PomModel::parse(&self.text)
    }

    /// Replace the value at `site` when it currently reads exactly `old`.
    ///
    /// Returns `Ok(false)` when no such value exists in the text (for instance
    /// because it is written through a property); nothing is changed then.
    pub fn apply(&mut self, site: &Site, old: &str, new: &str) -> Result<bool> {
        if old == new {
            return Ok(false);
        }

        let root = xml::parse_document(&self.text)?;
        let mut spans = locate(&root, &self.text, site, old);
        if spans.is_empty() {
            return Ok(false);
        }

        spans.sort_by_key(|span| span.start);
        for span in spans.into_iter().rev() {
            self.text.replace_range(span, new);
        }
        Ok(true)
    }

    /// Write the buffer back to its file, keeping the original text next to it
    /// as `<file>.versionsBackup` when `backup` is set.
    pub fn save(&self, backup: bool) -> Result<()> {
        let path = self.path.as_deref().ok_or_else(|| {
            PomupError::ProjectValidation("document was not loaded from a file".to_string())
        })?;

        if backup {
            let mut backup_path = path.as_os_str().to_owned();
            backup_path.push(BACKUP_SUFFIX);
            fs::write(PathBuf::from(backup_path), &self.original)?;
        }

        fs::write(path, &self.text)?;
        Ok(())
    }
}

fn locate(root: &XmlElement, source: &str, site: &Site, old: &str) -> Vec<Range<usize>> {
    let matching = |element: Option<&XmlElement>| {
        element
            .and_then(|e| e.text_span(source))
            .filter(|span| &source[span.clone()] == old)
    };

    match site {
        Site::Parent { coordinate } => {
            let Some(parent) = root.child("parent") else {
                return Vec::new();
            };
            let same_parent = parent.child_text("groupId", source)
                == Some(coordinate.group.as_str())
                && parent.child_text("artifactId", source) == Some(coordinate.artifact.as_str());
            if !same_parent {
                return Vec::new();
            }
            matching(parent.child("version")).into_iter().collect()
        }
        Site::Property { name, profile } => scope(root, source, profile.as_deref())
            .and_then(|scope| matching(scope.descend(&["properties", name.as_str()])))
            .into_iter()
            .collect(),
        Site::Dependency {
            coordinate,
            section,
            profile,
        } => {
            let Some(scope) = scope(root, source, profile.as_deref()) else {
                return Vec::new();
            };
            let list = match section {
                DependencySection::Dependencies => scope.child("dependencies"),
                DependencySection::DependencyManagement => {
                    scope.descend(&["dependencyManagement", "dependencies"])
                }
            };
            list.into_iter()
                .flat_map(|list| list.children_named("dependency"))
                .filter(|dependency| {
                    model::dependency_coordinate(dependency, source).as_ref() == Some(coordinate)
                })
                .filter_map(|dependency| matching(dependency.child("version")))
                .collect()
        }
    }
}

/// The project itself, or the `<profile>` with the given id.
fn scope<'a>(root: &'a XmlElement, source: &str, profile: Option<&str>) -> Option<&'a XmlElement> {
    match profile {
        None => Some(root),
        Some(id) => root
            .child("profiles")?
            .children_named("profile")
            .find(|p| p.child_text("id", source) == Some(id)),
    }
}
