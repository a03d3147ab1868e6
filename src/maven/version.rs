use crate::maven::snapshot;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Numeric component of a version, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Major,
    Minor,
    Incremental,
}

/// A version string parsed into `[major, minor, incremental, qualifier, build number]`.
///
/// Ordering is total over successfully parsed versions:
/// - numeric segments compare numerically, absent trailing segments count as `0`
/// - at equal numbers a snapshot qualifier sorts below any other qualifier, and any
///   qualifier sorts below no qualifier at all (`1.0-SNAPSHOT < 1.0-RC1 < 1.0`)
/// - qualifiers of the same kind compare lexically
/// - a build number (`1.0-3`) ranks above its absence
#[derive(Debug, Clone)]
pub struct Version {
    original: String,
    major: u64,
    minor: Option<u64>,
    incremental: Option<u64>,
    qualifier: Option<String>,
    build_number: Option<u64>,
    snapshot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{version}' is not a comparable version: {reason}")]
pub struct VersionParseError {
    pub version: String,
    pub reason: &'static str,
}

impl Version {
    pub fn parse(version: &str) -> Result<Self, VersionParseError> {
        let trimmed = version.trim();
        let fail = |reason| VersionParseError {
            version: version.to_string(),
            reason,
        };

        if trimmed.is_empty() {
            return Err(fail("empty version"));
        }

        let (numeric, suffix) = match trimmed.split_once('-') {
            Some((numeric, suffix)) => (numeric, Some(suffix)),
            None => (trimmed, None),
        };

        let mut numbers: Vec<u64> = Vec::with_capacity(3);
        // `2.5.RELEASE` style: the first non-numeric dotted part starts the qualifier
        let mut dotted_qualifier: Option<&str> = None;
        let mut offset = 0;
        for part in numeric.split('.') {
            if part.is_empty() {
                return Err(fail("empty version segment"));
            }
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                if numbers.is_empty() {
                    return Err(fail("version must start with a number"));
                }
                dotted_qualifier = Some(&numeric[offset..]);
                break;
            }
            if numbers.len() == 3 {
                return Err(fail("more than three numeric segments"));
            }
            numbers.push(part.parse().map_err(|_| fail("numeric segment overflows"))?);
            offset += part.len() + 1;
        }

        let mut qualifier = None;
        let mut build_number = None;
        match (dotted_qualifier, suffix) {
            (_, Some("")) => return Err(fail("empty qualifier")),
            (Some(dotted), Some(suffix)) => qualifier = Some(format!("{dotted}-{suffix}")),
            (Some(dotted), None) => qualifier = Some(dotted.to_string()),
            (None, Some(suffix)) if suffix.bytes().all(|b| b.is_ascii_digit()) => {
                build_number = Some(suffix.parse().map_err(|_| fail("build number overflows"))?);
            }
            (None, Some(suffix)) => qualifier = Some(suffix.to_string()),
            (None, None) => {}
        }

        Ok(Version {
            original: trimmed.to_string(),
            major: numbers[0],
            minor: numbers.get(1).copied(),
            incremental: numbers.get(2).copied(),
            qualifier,
            build_number,
            snapshot: snapshot::is_snapshot(trimmed),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }

    pub fn segment(&self, segment: Segment) -> u64 {
        match segment {
            Segment::Major => self.major,
            Segment::Minor => self.minor.unwrap_or(0),
            Segment::Incremental => self.incremental.unwrap_or(0),
        }
    }

    pub fn is_snapshot(&self) -> bool {
        self.snapshot
    }

    fn qualifier_rank(&self) -> u8 {
        match (&self.qualifier, self.snapshot) {
            (Some(_), true) => 0,
            (Some(_), false) => 1,
            (None, _) => 2,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        [Segment::Major, Segment::Minor, Segment::Incremental]
            .iter()
            .map(|s| self.segment(*s).cmp(&other.segment(*s)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.qualifier_rank().cmp(&other.qualifier_rank()))
            .then_with(|| self.qualifier.cmp(&other.qualifier))
            .then_with(|| self.build_number.cmp(&other.build_number))
    }
}
