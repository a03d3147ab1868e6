use crate::agents::update::eligibility::{ArtifactPattern, parse_patterns};
use crate::config::PropertyLinkConfig;
use crate::error::Result;
use crate::pom::{DependencySite, PomModel, PropertyDeclaration, Site};
use crate::utils::compile_glob;
use regex::Regex;

/// Name of the property when `version` is exactly one `${name}` reference.
pub fn property_reference(version: &str) -> Option<&str> {
    let name = version.trim().strip_prefix("${")?.strip_suffix('}')?;
    if name.is_empty() || name.contains(['$', '{', '}']) {
        return None;
    }
    Some(name)
}

/// A property explicitly tied to the dependencies matching `dependencies`.
/// An empty pattern list keeps whatever auto-detection finds.
#[derive(Debug, Clone)]
pub struct PropertyLink {
    pub name: String,
    pub dependencies: Vec<ArtifactPattern>,
}

impl PropertyLink {
    pub fn from_config(config: &PropertyLinkConfig) -> Result<Self> {
        Ok(Self {
            name: config.name.trim().to_string(),
            dependencies: parse_patterns(&config.dependencies)?,
        })
    }

    fn admits(&self, dependency: &DependencySite) -> bool {
        self.dependencies.is_empty()
            || self
                .dependencies
                .iter()
                .any(|pattern| pattern.matches(&dependency.resolved))
    }
}

/// `--include-properties` / `--exclude-properties` name globs.
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl PropertyFilter {
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self> {
        let compile = |names: &[String]| {
            names
                .iter()
                .map(|name| compile_glob(name.trim()))
                .collect::<Result<Vec<_>>>()
        };
        Ok(Self {
            includes: compile(includes)?,
            excludes: compile(excludes)?,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        let included = self.includes.is_empty() || self.includes.iter().any(|r| r.is_match(name));
        included && !self.excludes.iter().any(|r| r.is_match(name))
    }
}

/// A declared property and the dependencies whose version is `${property}`.
#[derive(Debug, Clone)]
pub struct PropertyGroup {
    pub property: PropertyDeclaration,
    pub associations: Vec<DependencySite>,
}

#[derive(Debug, Clone, Default)]
pub struct Linkage {
    pub groups: Vec<PropertyGroup>,
    /// Referenced properties with no declaration in reach.
    pub undeclared: Vec<Site>,
}

pub struct LinkageResolver {
    links: Vec<PropertyLink>,
    auto_link: bool,
}

impl LinkageResolver {
    pub fn new(links: Vec<PropertyLink>, auto_link: bool) -> Self {
        Self { links, auto_link }
    }

    fn link(&self, name: &str) -> Option<&PropertyLink> {
        self.links.iter().find(|link| link.name == name)
    }

    /// Group dependencies by the property declaration their version refers to.
    ///
    /// A dependency inside profile `P` binds to `P`'s own declaration when there
    /// is one and to the project-level declaration otherwise. Groups come out in
    /// declaration order; explicitly linked properties appear even when nothing
    /// references them.
    pub fn resolve(&self, model: &PomModel) -> Linkage {
        let mut associations: Vec<Vec<DependencySite>> = vec![Vec::new(); model.properties.len()];
        let mut undeclared: Vec<Site> = Vec::new();

        for dependency in &model.dependencies {
            let Some(name) = dependency.version.as_deref().and_then(property_reference) else {
                continue;
            };

            let declaration = dependency
                .profile
                .as_deref()
                .and_then(|profile| Self::position(model, name, Some(profile)))
                .or_else(|| Self::position(model, name, None));

            let Some(index) = declaration else {
                let site = Site::Property {
                    name: name.to_string(),
                    profile: dependency.profile.clone(),
                };
                if !undeclared.contains(&site) {
                    undeclared.push(site);
                }
                continue;
            };

            let linked = match self.link(name) {
                Some(link) => link.admits(dependency),
                None => self.auto_link,
            };
            if linked {
                associations[index].push(dependency.clone());
            }
        }

        let groups = model
            .properties
            .iter()
            .zip(associations)
            .filter(|(property, associations)| {
                !associations.is_empty() || self.link(&property.name).is_some()
            })
            .map(|(property, associations)| PropertyGroup {
                property: property.clone(),
                associations,
            })
            .collect();

        Linkage { groups, undeclared }
    }

    fn position(model: &PomModel, name: &str, profile: Option<&str>) -> Option<usize> {
        model
            .properties
            .iter()
            .position(|p| p.name == name && p.profile.as_deref() == profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POM: &str = r#"<project>
  <properties>
    <jackson.version>2.15.0</jackson.version>
    <java.version>17</java.version>
    <unused.version>1.0</unused.version>
  </properties>
  <dependencies>
    <dependency>
      <groupId>com.fasterxml.jackson.core</groupId>
      <artifactId>jackson-databind</artifactId>
      <version>${jackson.version}</version>
    </dependency>
    <dependency>
      <groupId>com.fasterxml.jackson.core</groupId>
      <artifactId>jackson-core</artifactId>
      <version>${jackson.version}</version>
    </dependency>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>lib</artifactId>
      <version>${lib.version}</version>
    </dependency>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>mixed</artifactId>
      <version>${jackson.version}-custom</version>
    </dependency>
  </dependencies>
  <profiles>
    <profile>
      <id>legacy</id>
      <properties>
        <jackson.version>2.9.0</jackson.version>
      </properties>
      <dependencies>
        <dependency>
          <groupId>com.fasterxml.jackson.core</groupId>
          <artifactId>jackson-annotations</artifactId>
          <version>${jackson.version}</version>
        </dependency>
        <dependency>
          <groupId>com.fasterxml.jackson.core</groupId>
          <artifactId>jackson-yaml</artifactId>
          <version>${java.version}</version>
        </dependency>
      </dependencies>
    </profile>
  </profiles>
</project>"#;

    fn artifacts(group: &PropertyGroup) -> Vec<&str> {
        group
            .associations
            .iter()
            .map(|d| d.coordinate.artifact.as_str())
            .collect()
    }

    #[test]
    fn reference_must_be_the_whole_value() {
        assert_eq!(property_reference("${a.version}"), Some("a.version"));
        assert_eq!(property_reference(" ${a} "), Some("a"));
        assert_eq!(property_reference("${a}-b"), None);
        assert_eq!(property_reference("${a}${b}"), None);
        assert_eq!(property_reference("${}"), None);
        assert_eq!(property_reference("1.0"), None);
    }

    #[test]
    fn auto_detection_respects_profile_scope() {
        let model = PomModel::parse(POM).unwrap();
        let linkage = LinkageResolver::new(Vec::new(), true).resolve(&model);

        let names: Vec<(&str, Option<&str>)> = linkage
            .groups
            .iter()
            .map(|g| (g.property.name.as_str(), g.property.profile.as_deref()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("jackson.version", None),
                ("java.version", None),
                ("jackson.version", Some("legacy")),
            ]
        );
        assert_eq!(artifacts(&linkage.groups[0]), vec!["jackson-databind", "jackson-core"]);
        assert_eq!(artifacts(&linkage.groups[1]), vec!["jackson-yaml"]);
        assert_eq!(artifacts(&linkage.groups[2]), vec!["jackson-annotations"]);

        assert_eq!(
            linkage.undeclared,
            vec![Site::Property {
                name: "lib.version".to_string(),
                profile: None
            }]
        );
    }

    #[test]
    fn explicit_links_restrict_associations() {
        let model = PomModel::parse(POM).unwrap();
        let link = PropertyLink::from_config(&PropertyLinkConfig {
            name: "jackson.version".to_string(),
            dependencies: vec!["*:jackson-databind".to_string()],
        })
        .unwrap();
        let linkage = LinkageResolver::new(vec![link], false).resolve(&model);

        assert_eq!(linkage.groups.len(), 2);
        assert_eq!(artifacts(&linkage.groups[0]), vec!["jackson-databind"]);
        assert_eq!(linkage.groups[1].property.profile.as_deref(), Some("legacy"));
        assert!(linkage.groups[1].associations.is_empty());
    }

    #[test]
    fn property_name_filter() {
        let filter =
            PropertyFilter::new(&["*.version".to_string()], &["java.*".to_string()]).unwrap();
        assert!(filter.matches("jackson.version"));
        assert!(!filter.matches("java.version"));
        assert!(!filter.matches("encoding"));
        assert!(PropertyFilter::default().matches("anything"));
    }
}
