use crate::agents::update::context::{SkipReason, UpdateReport};
use crate::agents::update::eligibility::EligibilityFilter;
use crate::agents::update::handlers::{eligibility_skip, propose};
use crate::agents::update::policy::UpdatePolicy;
use crate::error::Result;
use crate::maven::{Version, VersionRange, snapshot};
use crate::pom::model::ParentReference;
use crate::pom::{PomDocument, Site};
use crate::repository::RepositoryClient;

/// Handles the `<parent>` reference.
pub struct ParentHandler<'a> {
    client: &'a dyn RepositoryClient,
    eligibility: &'a EligibilityFilter,
    policy: UpdatePolicy,
}

impl<'a> ParentHandler<'a> {
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

    /// A malformed version range on the parent aborts the run.
    pub fn update(
        &self,
        doc: &mut PomDocument,
        parent: Option<&ParentReference>,
    ) -> Result<UpdateReport> {
        let mut report = UpdateReport::new();
        let Some(parent) = parent else {
            return Ok(report);
        };
        let site = Site::Parent {
            coordinate: parent.coordinate.clone(),
        };

        if self.eligibility.is_reactor_member(&parent.coordinate) {
            report.skip(site, SkipReason::ParentInReactor);
            return Ok(report);
        }
        if let Some(reason) = eligibility_skip(self.eligibility.evaluate(&parent.coordinate)) {
            report.skip(site, reason);
            return Ok(report);
        }

        let raw = parent.version.as_str();
        if self.policy.snapshots_only && !snapshot::is_snapshot(raw) {
            report.skip(
                site,
                SkipReason::NotSnapshot {
                    version: raw.to_string(),
                },
            );
            return Ok(report);
        }

        let range = VersionRange::parse(raw)?;
        let Some(recommended) = range.recommended() else {
            report.skip(
                site,
                SkipReason::VersionRange {
                    spec: raw.to_string(),
                },
            );
            return Ok(report);
        };

        let Ok(current) = Version::parse(recommended) else {
            report.skip(
                site,
                SkipReason::UnparsableVersion {
                    version: raw.to_string(),
                },
            );
            return Ok(report);
        };

        let Some(target) = propose(self.client, &parent.coordinate, &current, &self.policy)? else {
            report.skip(
                site,
                SkipReason::NoEligibleCandidate {
                    current: raw.to_string(),
                },
            );
            return Ok(report);
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
        Ok(report)
    }
}
