use crate::agents::update::context::{SkipReason, UpdateReport};
use crate::agents::update::eligibility::EligibilityFilter;
use crate::agents::update::handlers::{eligibility_skip, propose};
use crate::agents::update::linkage::property_reference;
use crate::agents::update::policy::UpdatePolicy;
use crate::error::Result;
use crate::maven::{Version, snapshot};
use crate::pom::{DependencySite, PomDocument};
use crate::repository::RepositoryClient;

/// Handles `<dependency>` entries with a literal version, in either the
/// dependencies or the dependency management section.
pub struct DependencyHandler<'a> {
    client: &'a dyn RepositoryClient,
    eligibility: &'a EligibilityFilter,
    policy: UpdatePolicy,
}

impl<'a> DependencyHandler<'a> {
    pub fn new(
        client: &'a dyn RepositoryClient,
        eligibility: &'a EligibilityFilter,
        policy: UpdatePolicy,
    ) -> Self {
        Self {
            client,
            eligibility,
            policy,
        }
    }

    pub fn update<'d>(
        &self,
        doc: &mut PomDocument,
        dependencies: impl IntoIterator<Item = &'d DependencySite>,
    ) -> Result<UpdateReport> {
        let mut report = UpdateReport::new();
        for dependency in dependencies {
            self.update_dependency(doc, dependency, &mut report)?;
        }
        Ok(report)
    }

    fn update_dependency(
        &self,
        doc: &mut PomDocument,
        dependency: &DependencySite,
        report: &mut UpdateReport,
    ) -> Result<()> {
        let site = dependency.site();

        if let Some(reason) = eligibility_skip(self.eligibility.evaluate(&dependency.resolved)) {
            report.skip(site, reason);
            return Ok(());
        }

        let Some(raw) = dependency.version.as_deref() else {
            report.skip(site, SkipReason::NoVersion);
            return Ok(());
        };

        if let Some(property) = property_reference(raw) {
            // the property pass owns this one
            report.skip(
                site,
                SkipReason::ManagedByProperty {
                    property: property.to_string(),
                },
            );
            return Ok(());
        }

        if self.policy.snapshots_only && !snapshot::is_snapshot(raw) {
            report.skip(
                site,
                SkipReason::NotSnapshot {
                    version: raw.to_string(),
                },
            );
            return Ok(());
        }

        let Ok(current) = Version::parse(raw) else {
            report.skip(
                site,
                SkipReason::UnparsableVersion {
                    version: raw.to_string(),
                },
            );
            return Ok(());
        };

        let Some(target) = propose(self.client, &dependency.resolved, &current, &self.policy)?
        else {
            report.skip(
                site,
                SkipReason::NoEligibleCandidate {
                    current: raw.to_string(),
                },
            );
            return Ok(());
        };

        if doc.apply(&site, raw, target.as_str())? {
            report.add_change(site, raw, target.as_str());
        } else {
            report.skip(
                site,
                SkipReason::PatchMiss {
                    expected: raw.to_string(),
                },
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::update::context::DiagnosticLevel;
    use crate::agents::update::eligibility::ArtifactFilter;
    use crate::agents::update::policy::SegmentLock;
    use crate::error::PomupError;
    use crate::repository::testing::FakeCatalog;
    use std::collections::HashSet;
    use std::sync::Arc;

    const POM: &str = r#"<project>
  <groupId>org.example</groupId>
  <artifactId>app</artifactId>
  <dependencies>
    <!-- logging -->
    <dependency>
      <groupId>org.slf4j</groupId>
      <artifactId>slf4j-api</artifactId>
      <version>1.2.3</version>
    </dependency>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>core</artifactId>
      <version>1.0.0-SNAPSHOT</version>
    </dependency>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
    </dependency>
    <dependency>
      <groupId>com.fasterxml.jackson.core</groupId>
      <artifactId>jackson-databind</artifactId>
      <version>${jackson.version}</version>
    </dependency>
  </dependencies>
</project>"#;

    fn filter(reactor: &[&str]) -> EligibilityFilter {
        let members: HashSet<String> = reactor.iter().map(|k| k.to_string()).collect();
        EligibilityFilter::new(true, Arc::new(members), ArtifactFilter::default())
    }

    fn run(
        catalog: &FakeCatalog,
        eligibility: &EligibilityFilter,
        policy: UpdatePolicy,
    ) -> (PomDocument, Result<UpdateReport>) {
        let mut doc = PomDocument::from_text(POM);
        let model = doc.model().unwrap();
        let handler = DependencyHandler::new(catalog, eligibility, policy);
        let result = handler.update(&mut doc, &model.dependencies);
        (doc, result)
    }

    #[test]
    fn locked_latest_update() {
        let catalog = FakeCatalog::new()
            .with("org.slf4j:slf4j-api", &["1.2.4", "1.3.0", "2.0.0"])
            .with("org.example:core", &["1.0.0", "1.0.1-SNAPSHOT"]);
        let eligibility = filter(&[]);
        let policy = UpdatePolicy::latest(SegmentLock::Minor, false);
        let (doc, report) = run(&catalog, &eligibility, policy);
        let report = report.unwrap();

        assert_eq!(report.changes.len(), 2);
        assert_eq!(report.changes[0].old_value, "1.2.3");
        assert_eq!(report.changes[0].new_value, "1.2.4");
        assert_eq!(report.changes[1].new_value, "1.0.0");
        assert!(doc.text().contains("<!-- logging -->"));
        assert!(doc.text().contains("<version>1.2.4</version>"));

        let reasons: Vec<&SkipReason> = report.diagnostics.iter().map(|d| &d.reason).collect();
        assert_eq!(
            reasons,
            vec![
                &SkipReason::NoVersion,
                &SkipReason::ManagedByProperty {
                    property: "jackson.version".to_string()
                },
            ]
        );
        assert!(report.diagnostics.iter().all(|d| d.level == DiagnosticLevel::Debug));
    }

    #[test]
    fn reactor_member_is_never_looked_up() {
        let catalog = FakeCatalog::new().with("org.example:core", &["9.9"]);
        let eligibility = filter(&["org.example:core"]);
        let (doc, report) = run(&catalog, &eligibility, UpdatePolicy::next(true));
        let report = report.unwrap();

        assert!(!catalog.lookups().contains(&"org.example:core".to_string()));
        let core: Vec<_> = report
            .diagnostics
            .iter()
            .filter(|d| d.site.to_string() == "dependency org.example:core")
            .collect();
        assert_eq!(core.len(), 1);
        assert_eq!(core[0].reason, SkipReason::ReactorExcluded);
        assert!(doc.text().contains("<version>1.0.0-SNAPSHOT</version>"));
        assert!(report.changes.is_empty());
    }

    #[test]
    fn snapshots_only_skips_releases() {
        let catalog = FakeCatalog::new()
            .with("org.slf4j:slf4j-api", &["1.2.4"])
            .with("org.example:core", &["1.0.0", "1.0.1-SNAPSHOT"]);
        let eligibility = filter(&[]);
        let policy = UpdatePolicy::next(true).snapshots_only(true);
        let (_, report) = run(&catalog, &eligibility, policy);
        let report = report.unwrap();

        assert_eq!(catalog.lookups(), vec!["org.example:core"]);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.changes[0].new_value, "1.0.0");
        assert_eq!(
            report.diagnostics[0].reason,
            SkipReason::NotSnapshot {
                version: "1.2.3".to_string()
            }
        );
    }

    #[test]
    fn nothing_newer_is_reported() {
        let catalog =
            FakeCatalog::new().with("org.slf4j:slf4j-api", &["1.0", "1.2.3", "not-a-version"]);
        let eligibility = filter(&["org.example:core"]);
        let policy = UpdatePolicy::latest(SegmentLock::None, false);
        let (doc, report) = run(&catalog, &eligibility, policy);
        let report = report.unwrap();

        assert!(report.changes.is_empty());
        assert!(!doc.is_modified());
        assert_eq!(
            report.diagnostics[0].reason,
            SkipReason::NoEligibleCandidate {
                current: "1.2.3".to_string()
            }
        );
    }

    #[test]
    fn interpolated_coordinates_are_resolved() {
        const SIBLINGS: &str = r#"<project>
  <groupId>org.example</groupId>
  <artifactId>app</artifactId>
  <properties>
    <lib.group>org.slf4j</lib.group>
  </properties>
  <dependencies>
    <dependency>
      <groupId>${project.groupId}</groupId>
      <artifactId>core</artifactId>
      <version>1.0-SNAPSHOT</version>
    </dependency>
    <dependency>
      <groupId>${lib.group}</groupId>
      <artifactId>slf4j-api</artifactId>
      <version>1.2.3</version>
    </dependency>
  </dependencies>
</project>"#;
        let catalog = FakeCatalog::new()
            .with("org.example:core", &["1.0"])
            .with("org.slf4j:slf4j-api", &["1.2.4"]);
        let eligibility = filter(&["org.example:core"]);
        let mut doc = PomDocument::from_text(SIBLINGS);
        let model = doc.model().unwrap();
        let report = DependencyHandler::new(&catalog, &eligibility, UpdatePolicy::next(false))
            .update(&mut doc, &model.dependencies)
            .unwrap();

        assert_eq!(catalog.lookups(), vec!["org.slf4j:slf4j-api"]);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].reason, SkipReason::ReactorExcluded);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.changes[0].new_value, "1.2.4");
        assert!(doc.text().contains("<groupId>${lib.group}</groupId>"));
        assert!(doc.text().contains("<version>1.2.4</version>"));
        assert!(doc.text().contains("<version>1.0-SNAPSHOT</version>"));
    }

    #[test]
    fn catalog_failure_aborts() {
        let catalog = FakeCatalog::new().failing("org.slf4j:slf4j-api");
        let eligibility = filter(&[]);
        let policy = UpdatePolicy::latest(SegmentLock::None, false);
        let (_, report) = run(&catalog, &eligibility, policy);
        assert!(matches!(report.unwrap_err(), PomupError::Catalog { .. }));
        assert_eq!(catalog.lookups(), vec!["org.slf4j:slf4j-api"]);
    }
}
