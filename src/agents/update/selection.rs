use crate::agents::update::policy::{SegmentLock, Selection};
use crate::maven::Version;

/// Parse catalog strings, dropping every one that is not a comparable version.
pub fn parse_candidates<S: AsRef<str>>(raw: &[S]) -> Vec<Version> {
    raw.iter()
        .filter_map(|version| Version::parse(version.as_ref()).ok())
        .collect()
}

/// Versions strictly above `current`, inside the lock and the snapshot policy,
/// ascending. Equal versions keep their catalog order.
pub fn filter_candidates(
    current: &Version,
    universe: &[Version],
    lock: SegmentLock,
    include_snapshots: bool,
) -> Vec<Version> {
    let mut candidates: Vec<Version> = universe
        .iter()
        .filter(|candidate| *candidate > current)
        .filter(|candidate| lock.permits(current, candidate))
        .filter(|candidate| include_snapshots || !candidate.is_snapshot())
        .cloned()
        .collect();
    candidates.sort();
    candidates
}

pub fn select(candidates: &[Version], selection: Selection) -> Option<&Version> {
    match selection {
        Selection::Latest => candidates.last(),
        Selection::Next => candidates.first(),
    }
}
