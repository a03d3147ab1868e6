// Per-site handlers. Each one walks its kind of site in document order and runs
// eligibility, current-version checks, catalog lookup, selection and the patch,
// recording a diagnostic for every site it leaves alone.

pub mod dependency_handler;
pub mod parent_handler;
pub mod property_handler;

pub use dependency_handler::DependencyHandler;
pub use parent_handler::ParentHandler;
pub use property_handler::PropertyHandler;

use crate::agents::update::context::SkipReason;
use crate::agents::update::eligibility::Eligibility;
use crate::agents::update::policy::UpdatePolicy;
use crate::agents::update::selection::{filter_candidates, parse_candidates, select};
use crate::error::Result;
use crate::maven::Version;
use crate::repository::{Coordinate, RepositoryClient};

/// Target version for `coordinate` under `policy`, if any.
pub(crate) fn propose(
    client: &dyn RepositoryClient,
    coordinate: &Coordinate,
    current: &Version,
    policy: &UpdatePolicy,
) -> Result<Option<Version>> {
    let known = client.fetch_available_versions(coordinate)?;
    let universe = parse_candidates(&known);
    let candidates = filter_candidates(current, &universe, policy.lock, policy.include_snapshots);

    if std::env::var("POMUP_VERBOSE").is_ok() {
        eprintln!(
            "[VERBOSE] {}: {} of {} version(s) eligible above {}",
            coordinate,
            candidates.len(),
            known.len(),
            current
        );
    }

    Ok(select(&candidates, policy.selection).cloned())
}

pub(crate) fn eligibility_skip(eligibility: Eligibility) -> Option<SkipReason> {
    match eligibility {
        Eligibility::Eligible => None,
        Eligibility::ReactorProduced => Some(SkipReason::ReactorExcluded),
        Eligibility::Excluded => Some(SkipReason::Excluded),
        Eligibility::NotIncluded => Some(SkipReason::NotIncluded),
    }
}
