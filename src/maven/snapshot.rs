use regex::Regex;
use std::sync::LazyLock;

// `<base>-SNAPSHOT` or a deployed snapshot `<base>-yyyyMMdd.HHmmss-<build>`
static SNAPSHOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+)-((SNAPSHOT)|(\d{8}\.\d{6}-\d+))$").expect("snapshot pattern is valid")
});

/// Returns true when `version` names a snapshot build rather than a release.
pub fn is_snapshot(version: &str) -> bool {
    SNAPSHOT_RE.is_match(version.trim())
}
