use crate::maven::{Segment, Version};

/// The most significant segment an upgrade must leave untouched. Every segment
/// more significant than the locked one is frozen too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentLock {
    #[default]
    None,
    Major,
    Minor,
    Incremental,
}

impl SegmentLock {
    /// Lock implied by the three `allow-*-updates` switches: the most significant
    /// disallowed segment wins, so forbidding major updates freezes only the major
    /// segment while forbidding minor updates freezes major and minor.
    pub fn from_switches(allow_major: bool, allow_minor: bool, allow_incremental: bool) -> Self {
        if !allow_major {
            SegmentLock::Major
        } else if !allow_minor {
            SegmentLock::Minor
        } else if !allow_incremental {
            SegmentLock::Incremental
        } else {
            SegmentLock::None
        }
    }

    fn frozen(self) -> &'static [Segment] {
        match self {
            SegmentLock::None => &[],
            SegmentLock::Major => &[Segment::Major],
            SegmentLock::Minor => &[Segment::Major, Segment::Minor],
            SegmentLock::Incremental => &[Segment::Major, Segment::Minor, Segment::Incremental],
        }
    }

    /// True when `candidate` differs from `current` only below the lock.
    pub fn permits(self, current: &Version, candidate: &Version) -> bool {
        self.frozen()
            .iter()
            .all(|segment| current.segment(*segment) == candidate.segment(*segment))
    }
}

/// How a target is chosen from the filtered candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The greatest eligible version.
    Latest,
    /// The smallest eligible version above the current one.
    Next,
}

/// Selection policy for one pass over a kind of site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatePolicy {
    pub lock: SegmentLock,
    pub include_snapshots: bool,
    pub snapshots_only: bool,
    pub selection: Selection,
}

impl UpdatePolicy {
    pub fn latest(lock: SegmentLock, include_snapshots: bool) -> Self {
        Self {
            lock,
            include_snapshots,
            snapshots_only: false,
            selection: Selection::Latest,
        }
    }

    pub fn next(include_snapshots: bool) -> Self {
        Self {
            lock: SegmentLock::None,
            include_snapshots,
            snapshots_only: false,
            selection: Selection::Next,
        }
    }

    pub fn snapshots_only(mut self, snapshots_only: bool) -> Self {
        self.snapshots_only = snapshots_only;
        self
    }
}
