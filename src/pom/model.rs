use crate::error::{PomupError, Result};
use crate::maven::RemoteRepository;
use crate::pom::xml::{self, XmlElement};
use crate::repository::{Coordinate, DEFAULT_TYPE};
use regex::{Captures, Regex};
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

static EXPRESSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^${}]+)\}").expect("expression pattern is valid"));

// nested property references are followed at most this deep
const MAX_INTERPOLATION_DEPTH: usize = 8;

/// Which `<dependencies>` list a dependency is declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencySection {
    Dependencies,
    DependencyManagement,
}

/// A manifest location governed by the updater.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Site {
    Dependency {
        coordinate: Coordinate,
        section: DependencySection,
        #[serde(skip_serializing_if = "Option::is_none")]
        profile: Option<String>,
    },
    Property {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        profile: Option<String>,
    },
    Parent {
        coordinate: Coordinate,
    },
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let profile = match self {
            Site::Dependency {
                coordinate,
                section,
                profile,
            } => {
                match section {
                    DependencySection::Dependencies => write!(f, "dependency {coordinate}")?,
                    DependencySection::DependencyManagement => {
                        write!(f, "managed dependency {coordinate}")?
                    }
                }
                profile
            }
            Site::Property { name, profile } => {
                write!(f, "property ${{{name}}}")?;
                profile
            }
            Site::Parent { coordinate } => return write!(f, "parent {coordinate}"),
        };
        match profile {
            Some(id) => write!(f, " (profile {id})"),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentReference {
    pub coordinate: Coordinate,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDeclaration {
    pub name: String,
    pub value: String,
    pub profile: Option<String>,
}

impl PropertyDeclaration {
    pub fn site(&self) -> Site {
        Site::Property {
            name: self.name.clone(),
            profile: self.profile.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySite {
    /// Coordinate exactly as written; this is what addresses the element.
    pub coordinate: Coordinate,
    /// Coordinate with `${...}` expressions resolved against the project.
    pub resolved: Coordinate,
    /// Raw `<version>` text; `None` when the version is inherited from management.
    pub version: Option<String>,
    pub section: DependencySection,
    pub profile: Option<String>,
}

impl DependencySite {
    pub fn site(&self) -> Site {
        Site::Dependency {
            coordinate: self.coordinate.clone(),
            section: self.section,
            profile: self.profile.clone(),
        }
    }
}

/// The governed sites of one POM, read from its raw (uninterpolated) text.
#[derive(Debug, Clone, Default)]
pub struct PomModel {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub parent: Option<ParentReference>,
    pub properties: Vec<PropertyDeclaration>,
    pub dependencies: Vec<DependencySite>,
    pub modules: Vec<String>,
    pub repositories: Vec<RemoteRepository>,
}

impl PomModel {
    pub fn parse(source: &str) -> Result<Self> {
        let root = xml::parse_document(source)?;
        if root.name != "project" {
            return Err(PomupError::ManifestParsing(format!(
                "expected <project> root element, found <{}>",
                root.name
            )));
        }

        let text = |element: &XmlElement, name: &str| {
            element
                .child_text(name, source)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let parent = root.child("parent").and_then(|parent| {
            Some(ParentReference {
                coordinate: Coordinate::new(
                    text(parent, "groupId")?,
                    text(parent, "artifactId")?,
                )
                .with_type("pom"),
                version: text(parent, "version")?,
            })
        });

        let mut model = PomModel {
            group_id: text(&root, "groupId"),
            artifact_id: text(&root, "artifactId"),
            version: text(&root, "version"),
            parent,
            ..Default::default()
        };

        model.read_scope(&root, None, source);
        if let Some(profiles) = root.child("profiles") {
            for profile in profiles.children_named("profile") {
                // profiles without an id cannot be addressed by the editor
                let Some(id) = text(profile, "id") else {
                    continue;
                };
                model.read_scope(profile, Some(id), source);
            }
        }

        let resolved: Vec<Coordinate> = model
            .dependencies
            .iter()
            .map(|d| model.resolve_coordinate(&d.coordinate, d.profile.as_deref()))
            .collect();
        for (dependency, coordinate) in model.dependencies.iter_mut().zip(resolved) {
            dependency.resolved = coordinate;
        }

        Ok(model)
    }

    /// Read the sections a profile shares with the project itself.
    fn read_scope(&mut self, scope: &XmlElement, profile: Option<String>, source: &str) {
        if let Some(properties) = scope.child("properties") {
            for property in &properties.children {
                if let Some(value) = property.text(source) {
                    self.properties.push(PropertyDeclaration {
                        name: property.name.clone(),
                        value: value.to_string(),
                        profile: profile.clone(),
                    });
                }
            }
        }

        let sections = [
            (
                DependencySection::DependencyManagement,
                scope.descend(&["dependencyManagement", "dependencies"]),
            ),
            (DependencySection::Dependencies, scope.child("dependencies")),
        ];
        for (section, list) in sections {
            let Some(list) = list else { continue };
            for dependency in list.children_named("dependency") {
                if let Some(coordinate) = dependency_coordinate(dependency, source) {
                    self.dependencies.push(DependencySite {
                        resolved: coordinate.clone(),
                        coordinate,
                        version: dependency
                            .child_text("version", source)
                            .filter(|v| !v.is_empty())
                            .map(str::to_string),
                        section,
                        profile: profile.clone(),
                    });
                }
            }
        }

        if let Some(modules) = scope.child("modules") {
            for module in modules.children_named("module") {
                if let Some(path) = module.text(source).filter(|p| !p.is_empty()) {
                    if !self.modules.iter().any(|m| m == path) {
                        self.modules.push(path.to_string());
                    }
                }
            }
        }

        if let Some(repositories) = scope.child("repositories") {
            for repository in repositories.children_named("repository") {
                if let Some(url) = repository.child_text("url", source).filter(|u| !u.is_empty()) {
                    let id = repository.child_text("id", source).unwrap_or(url);
                    self.repositories.push(RemoteRepository::new(id, url));
                }
            }
        }
    }

    /// `groupId`, falling back to the parent's as Maven inheritance does.
    pub fn effective_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or_else(|| self.parent.as_ref().map(|p| p.coordinate.group.as_str()))
    }

    /// Expand `${...}` expressions in `raw`. Project coordinates, the parent's
    /// coordinates and declared properties are known; in profile `profile` its own
    /// properties shadow the project-level ones. Unknown expressions stay as written.
    pub fn interpolate(&self, raw: &str, profile: Option<&str>) -> String {
        let mut value = raw.to_string();
        for _ in 0..MAX_INTERPOLATION_DEPTH {
            if !value.contains("${") {
                break;
            }
            let next = EXPRESSION_RE
                .replace_all(&value, |caps: &Captures| {
                    self.expression(&caps[1], profile)
                        .unwrap_or(&caps[0])
                        .to_string()
                })
                .into_owned();
            if next == value {
                break;
            }
            value = next;
        }
        value
    }

    fn expression(&self, name: &str, profile: Option<&str>) -> Option<&str> {
        let parent = self.parent.as_ref();
        match name {
            "project.groupId" | "pom.groupId" => self.effective_group_id(),
            "project.artifactId" | "pom.artifactId" => self.artifact_id.as_deref(),
            "project.version" | "pom.version" => self
                .version
                .as_deref()
                .or_else(|| parent.map(|p| p.version.as_str())),
            "project.parent.groupId" => parent.map(|p| p.coordinate.group.as_str()),
            "project.parent.artifactId" => parent.map(|p| p.coordinate.artifact.as_str()),
            "project.parent.version" => parent.map(|p| p.version.as_str()),
            _ => profile
                .and_then(|id| self.property(name, Some(id)))
                .or_else(|| self.property(name, None))
                .map(|p| p.value.as_str()),
        }
    }

    fn resolve_coordinate(&self, raw: &Coordinate, profile: Option<&str>) -> Coordinate {
        Coordinate::new(
            self.interpolate(&raw.group, profile),
            self.interpolate(&raw.artifact, profile),
        )
        .with_type(self.interpolate(&raw.kind, profile))
        .with_classifier(
            raw.classifier
                .as_deref()
                .map(|classifier| self.interpolate(classifier, profile)),
        )
    }

    pub fn dependencies_in(
        &self,
        section: DependencySection,
    ) -> impl Iterator<Item = &DependencySite> {
        self.dependencies.iter().filter(move |d| d.section == section)
    }

    pub fn property(&self, name: &str, profile: Option<&str>) -> Option<&PropertyDeclaration> {
        self.properties
            .iter()
            .find(|p| p.name == name && p.profile.as_deref() == profile)
    }
}

/// Coordinate of a `<dependency>` element; `None` when group or artifact is missing.
pub(crate) fn dependency_coordinate(dependency: &XmlElement, source: &str) -> Option<Coordinate> {
    let value = |name: &str| {
        dependency
            .child_text(name, source)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Some(
        Coordinate::new(value("groupId")?, value("artifactId")?)
            .with_type(value("type").unwrap_or_else(|| DEFAULT_TYPE.to_string()))
            .with_classifier(value("classifier")),
    )
}
