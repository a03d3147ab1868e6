use crate::agents::update::context::{Proposal, SkipReason, UpdateReport};
use crate::agents::update::eligibility::EligibilityFilter;
use crate::agents::update::handlers::propose;
use crate::agents::update::linkage::{Linkage, PropertyFilter, PropertyGroup};
use crate::agents::update::policy::UpdatePolicy;
use crate::error::Result;
use crate::maven::{Version, snapshot};
use crate::pom::PomDocument;
use crate::repository::RepositoryClient;

/// Handles `<properties>` entries that supply dependency versions.
///
/// A property moves only when every dependency using it is eligible and all of
/// them independently select the very same version string.
pub struct PropertyHandler<'a> {
    client: &'a dyn RepositoryClient,
    eligibility: &'a EligibilityFilter,
    filter: &'a PropertyFilter,
    policy: UpdatePolicy,
}

impl<'a> PropertyHandler<'a> {
    pub fn new(
        client: &'a dyn RepositoryClient,
        eligibility: &'a EligibilityFilter,
        filter: &'a PropertyFilter,
        policy: UpdatePolicy,
    ) -> Self {
        Self {
            client,
            eligibility,
            filter,
            policy,
        }
    }

    pub fn update(&self, doc: &mut PomDocument, linkage: &Linkage) -> Result<UpdateReport> {
        let mut report = UpdateReport::new();

        for site in &linkage.undeclared {
            report.skip(site.clone(), SkipReason::PropertyUndeclared);
        }

        for group in &linkage.groups {
            self.update_group(doc, group, &mut report)?;
        }
        Ok(report)
    }

    fn update_group(
        &self,
        doc: &mut PomDocument,
        group: &PropertyGroup,
        report: &mut UpdateReport,
    ) -> Result<()> {
        let property = &group.property;
        let site = property.site();

        if !self.filter.matches(&property.name) {
            report.skip(site, SkipReason::PropertyNotSelected);
            return Ok(());
        }

        if group.associations.is_empty() {
            report.skip(site, SkipReason::NoAssociations);
            return Ok(());
        }

        // all associations are checked before any lookup happens
        if let Some(blocked) = group
            .associations
            .iter()
            .find(|a| !self.eligibility.is_eligible(&a.resolved))
        {
            report.skip(
                site,
                SkipReason::AssociationNotEligible {
                    dependency: blocked.resolved.to_string(),
                },
            );
            return Ok(());
        }

        let raw = property.value.as_str();
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

        let mut proposals: Vec<Proposal> = Vec::with_capacity(group.associations.len());
        for association in &group.associations {
            let target = propose(self.client, &association.resolved, &current, &self.policy)?;
            proposals.push(Proposal {
                dependency: association.resolved.to_string(),
                version: target.map(|v| v.as_str().to_string()),
            });
        }

        if proposals.iter().all(|p| p.version.is_none()) {
            report.skip(
                site,
                SkipReason::NoEligibleCandidate {
                    current: raw.to_string(),
                },
            );
            return Ok(());
        }

        let agreed = proposals[0]
            .version
            .clone()
            .filter(|first| proposals.iter().all(|p| p.version.as_ref() == Some(first)));
        let Some(target) = agreed else {
            report.skip(site, SkipReason::PropertyConflict { proposals });
            return Ok(());
        };

        if doc.apply(&site, raw, &target)? {
            report.add_change(site, raw, target);
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
    use crate::agents::update::eligibility::ArtifactFilter;
    use crate::agents::update::linkage::LinkageResolver;
    use crate::agents::update::policy::SegmentLock;
    use crate::pom::Site;
    use crate::repository::testing::FakeCatalog;
    use std::collections::HashSet;
    use std::sync::Arc;

    const POM: &str = r#"<project>
  <properties>
    <jackson.version>2.15.0</jackson.version> <!-- shared -->
    <netty.version>4.1.100.Final</netty.version>
  </properties>
  <dependencyManagement>
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
        <groupId>io.netty</groupId>
        <artifactId>netty-handler</artifactId>
        <version>${netty.version}</version>
      </dependency>
      <dependency>
        <groupId>org.example</groupId>
        <artifactId>thing</artifactId>
        <version>${thing.version}</version>
      </dependency>
    </dependencies>
  </dependencyManagement>
</project>"#;

    fn eligibility(excludes: &[&str]) -> EligibilityFilter {
        EligibilityFilter::new(
            true,
            Arc::new(HashSet::<String>::new()),
            ArtifactFilter::new(Vec::<String>::new(), excludes.iter().copied()).unwrap(),
        )
    }

    fn run(
        catalog: &FakeCatalog,
        eligibility: &EligibilityFilter,
        filter: &PropertyFilter,
        policy: UpdatePolicy,
    ) -> (PomDocument, UpdateReport) {
        let mut doc = PomDocument::from_text(POM);
        let linkage = LinkageResolver::new(Vec::new(), true).resolve(&doc.model().unwrap());
        let report = PropertyHandler::new(catalog, eligibility, filter, policy)
            .update(&mut doc, &linkage)
            .unwrap();
        (doc, report)
    }

    fn reason_for<'r>(report: &'r UpdateReport, name: &str) -> &'r SkipReason {
        let site = Site::Property {
            name: name.to_string(),
            profile: None,
        };
        &report
            .diagnostics
            .iter()
            .find(|d| d.site == site)
            .unwrap()
            .reason
    }

    #[test]
    fn agreeing_associations_move_the_property() {
        let catalog = FakeCatalog::new()
            .with("com.fasterxml.jackson.core:jackson-databind", &["2.15.0", "2.16.1", "3.0.0"])
            .with("com.fasterxml.jackson.core:jackson-core", &["2.16.1", "2.16.0"])
            .with("io.netty:netty-handler", &["4.1.100.Final", "4.1.101.Final"]);
        let filter = PropertyFilter::default();
        let (doc, report) = run(
            &catalog,
            &eligibility(&[]),
            &filter,
            UpdatePolicy::latest(SegmentLock::Major, false),
        );

        assert_eq!(report.changes.len(), 2);
        assert_eq!(report.changes[0].new_value, "2.16.1");
        assert_eq!(report.changes[1].new_value, "4.1.101.Final");
        assert!(doc.text().contains("<jackson.version>2.16.1</jackson.version> <!-- shared -->"));
        assert_eq!(reason_for(&report, "thing.version"), &SkipReason::PropertyUndeclared);
    }

    #[test]
    fn disagreement_changes_nothing() {
        let catalog = FakeCatalog::new()
            .with("com.fasterxml.jackson.core:jackson-databind", &["2.16.1"])
            .with("com.fasterxml.jackson.core:jackson-core", &["2.16.0"]);
        let filter = PropertyFilter::new(&["jackson.*".to_string()], &[]).unwrap();
        let (doc, report) = run(
            &catalog,
            &eligibility(&[]),
            &filter,
            UpdatePolicy::latest(SegmentLock::None, false),
        );

        assert!(report.changes.is_empty());
        assert!(!doc.is_modified());
        match reason_for(&report, "jackson.version") {
            SkipReason::PropertyConflict { proposals } => {
                let versions: Vec<_> = proposals.iter().map(|p| p.version.as_deref()).collect();
                assert_eq!(versions, vec![Some("2.16.1"), Some("2.16.0")]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(reason_for(&report, "netty.version"), &SkipReason::PropertyNotSelected);
    }

    #[test]
    fn one_association_without_target_is_a_conflict() {
        let catalog = FakeCatalog::new()
            .with("com.fasterxml.jackson.core:jackson-databind", &["2.16.1"])
            .with("com.fasterxml.jackson.core:jackson-core", &["2.15.0"]);
        let filter = PropertyFilter::new(&["jackson.version".to_string()], &[]).unwrap();
        let (_, report) = run(
            &catalog,
            &eligibility(&[]),
            &filter,
            UpdatePolicy::next(false),
        );
        assert!(matches!(
            reason_for(&report, "jackson.version"),
            SkipReason::PropertyConflict { .. }
        ));
    }

    #[test]
    fn ineligible_association_blocks_before_lookups() {
        let catalog = FakeCatalog::new()
            .with("com.fasterxml.jackson.core:jackson-databind", &["2.16.1"])
            .with("com.fasterxml.jackson.core:jackson-core", &["2.16.1"]);
        let filter = PropertyFilter::new(&["jackson.version".to_string()], &[]).unwrap();
        let (doc, report) = run(
            &catalog,
            &eligibility(&["*:jackson-core"]),
            &filter,
            UpdatePolicy::latest(SegmentLock::None, false),
        );

        assert!(catalog.lookups().is_empty());
        assert!(!doc.is_modified());
        assert_eq!(
            reason_for(&report, "jackson.version"),
            &SkipReason::AssociationNotEligible {
                dependency: "com.fasterxml.jackson.core:jackson-core".to_string()
            }
        );
    }

    #[test]
    fn snapshot_only_gate_applies_to_property_value() {
        let catalog = FakeCatalog::new();
        let filter = PropertyFilter::default();
        let (_, report) = run(
            &catalog,
            &eligibility(&[]),
            &filter,
            UpdatePolicy::next(true).snapshots_only(true),
        );
        assert!(catalog.lookups().is_empty());
        assert_eq!(
            reason_for(&report, "netty.version"),
            &SkipReason::NotSnapshot {
                version: "4.1.100.Final".to_string()
            }
        );
    }
}
