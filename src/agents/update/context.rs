use crate::pom::Site;
use serde::Serialize;
use std::fmt;

/// One edit performed on the POM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedChange {
    pub site: Site,
    pub old_value: String,
    pub new_value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Debug,
    Info,
}

/// What one association of a property would move to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Proposal {
    pub dependency: String,
    pub version: Option<String>,
}

/// Why a site was left alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SkipReason {
    ReactorExcluded,
    Excluded,
    NotIncluded,
    NotSnapshot { version: String },
    NoVersion,
    ManagedByProperty { property: String },
    UnparsableVersion { version: String },
    NoEligibleCandidate { current: String },
    PropertyConflict { proposals: Vec<Proposal> },
    AssociationNotEligible { dependency: String },
    PropertyUndeclared,
    PropertyNotSelected,
    NoAssociations,
    ParentInReactor,
    VersionRange { spec: String },
    PatchMiss { expected: String },
}

impl SkipReason {
    pub fn level(&self) -> DiagnosticLevel {
        match self {
            SkipReason::NoVersion
            | SkipReason::ManagedByProperty { .. }
            | SkipReason::UnparsableVersion { .. }
            | SkipReason::PropertyUndeclared
            | SkipReason::PropertyNotSelected
            | SkipReason::NoAssociations => DiagnosticLevel::Debug,
            _ => DiagnosticLevel::Info,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ReactorExcluded => f.write_str("built by this reactor"),
            SkipReason::Excluded => f.write_str("matches an exclusion pattern"),
            SkipReason::NotIncluded => f.write_str("matches no inclusion pattern"),
            SkipReason::NotSnapshot { version } => {
                write!(f, "{version} is not a snapshot")
            }
            SkipReason::NoVersion => f.write_str("no version declared"),
            SkipReason::ManagedByProperty { property } => {
                write!(f, "version comes from ${{{property}}}")
            }
            SkipReason::UnparsableVersion { version } => {
                write!(f, "'{version}' is not a comparable version")
            }
            SkipReason::NoEligibleCandidate { current } => {
                write!(f, "no newer eligible version than {current}")
            }
            SkipReason::PropertyConflict { proposals } => {
                f.write_str("associated dependencies disagree (")?;
                for (i, proposal) in proposals.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match &proposal.version {
                        Some(version) => write!(f, "{} -> {}", proposal.dependency, version)?,
                        None => write!(f, "{} -> none", proposal.dependency)?,
                    }
                }
                f.write_str(")")
            }
            SkipReason::AssociationNotEligible { dependency } => {
                write!(f, "associated dependency {dependency} is not eligible")
            }
            SkipReason::PropertyUndeclared => f.write_str("property is not declared"),
            SkipReason::PropertyNotSelected => f.write_str("property filtered out"),
            SkipReason::NoAssociations => f.write_str("no dependency uses this property"),
            SkipReason::ParentInReactor => f.write_str("parent is part of this reactor"),
            SkipReason::VersionRange { spec } => {
                write!(f, "{spec} is a range without a recommended version")
            }
            SkipReason::PatchMiss { expected } => {
                write!(f, "'{expected}' not found in the POM text")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub site: Site,
    pub reason: SkipReason,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.site, self.reason)
    }
}

/// Changes made during a run plus every skip decision, in discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateReport {
    pub changes: Vec<AppliedChange>,
    pub diagnostics: Vec<Diagnostic>,
}

impl UpdateReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_change(
        &mut self,
        site: Site,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) {
        self.changes.push(AppliedChange {
            site,
            old_value: old_value.into(),
            new_value: new_value.into(),
        });
    }

    pub fn skip(&mut self, site: Site, reason: SkipReason) {
        self.diagnostics.push(Diagnostic {
            level: reason.level(),
            site,
            reason,
        });
    }

    pub fn merge(&mut self, other: UpdateReport) {
        self.changes.extend(other.changes);
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn total_updates(&self) -> usize {
        self.changes.len()
    }

    /// Diagnostics at `level` or above.
    pub fn diagnostics_at(&self, level: DiagnosticLevel) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.level >= level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Coordinate;

    fn property(name: &str) -> Site {
        Site::Property {
            name: name.to_string(),
            profile: None,
        }
    }

    #[test]
    fn skips_carry_their_level() {
        let mut report = UpdateReport::new();
        report.skip(property("a"), SkipReason::PropertyUndeclared);
        report.skip(property("b"), SkipReason::ReactorExcluded);

        assert_eq!(report.diagnostics_at(DiagnosticLevel::Debug).count(), 2);
        let info: Vec<_> = report.diagnostics_at(DiagnosticLevel::Info).collect();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].to_string(), "property ${b}: built by this reactor");
        assert!(report.is_empty());
    }

    #[test]
    fn conflict_lists_every_proposal() {
        let reason = SkipReason::PropertyConflict {
            proposals: vec![
                Proposal {
                    dependency: "g:a".to_string(),
                    version: Some("1.1".to_string()),
                },
                Proposal {
                    dependency: "g:b".to_string(),
                    version: None,
                },
            ],
        };
        assert_eq!(
            reason.to_string(),
            "associated dependencies disagree (g:a -> 1.1, g:b -> none)"
        );
    }

    #[test]
    fn serializes_as_json() {
        let mut report = UpdateReport::new();
        let site = Site::Dependency {
            coordinate: Coordinate::new("junit", "junit"),
            section: crate::pom::DependencySection::Dependencies,
            profile: None,
        };
        report.add_change(site.clone(), "4.12", "4.13.2");
        report.skip(site, SkipReason::NoEligibleCandidate { current: "4.13.2".to_string() });

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["changes"][0]["site"]["kind"], "dependency");
        assert_eq!(json["changes"][0]["site"]["coordinate"]["type"], "jar");
        assert_eq!(json["changes"][0]["new_value"], "4.13.2");
        assert_eq!(json["diagnostics"][0]["level"], "info");
        assert_eq!(json["diagnostics"][0]["reason"]["kind"], "no-eligible-candidate");
    }
}
