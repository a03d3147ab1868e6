use crate::error::{PomupError, Result};
use crate::maven::version::Version;

/// Bounds of one bracketed interval, e.g. `[1.0,2.0)`.
#[derive(Debug, Clone)]
struct Restriction {
    lower: Option<Version>,
    upper: Option<Version>,
}

/// A version specification as written in a POM: either a soft version
/// (`1.0`, the recommended version) or a union of bracketed restrictions.
#[derive(Debug, Clone)]
pub struct VersionRange {
    recommended: Option<String>,
}

impl VersionRange {
    pub fn parse(spec: &str) -> Result<Self> {
        let trimmed = spec.trim();
        let invalid = |reason: &str| PomupError::InvalidVersionRange {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("empty specification"));
        }

        if !trimmed.starts_with(['[', '(']) {
            if trimmed.contains(['[', ']', '(', ')', ',']) {
                return Err(invalid("range characters outside of brackets"));
            }
            return Ok(Self {
                recommended: Some(trimmed.to_string()),
            });
        }

        let mut previous: Option<Restriction> = None;
        let mut rest = trimmed;
        while !rest.is_empty() {
            if !rest.starts_with(['[', '(']) {
                return Err(invalid("only fully-qualified sets are allowed"));
            }
            let close = rest
                .find([']', ')'])
                .ok_or_else(|| invalid("unbounded range"))?;
            let restriction = Self::parse_restriction(&rest[..=close]).map_err(|r| invalid(r))?;

            if let (Some(upper), Some(lower)) = (
                previous.as_ref().and_then(|r| r.upper.as_ref()),
                restriction.lower.as_ref(),
            ) {
                if lower < upper {
                    return Err(invalid("ranges overlap"));
                }
            }
            previous = Some(restriction);

            rest = rest[close + 1..].trim_start();
            if let Some(stripped) = rest.strip_prefix(',') {
                rest = stripped.trim_start();
                if rest.is_empty() {
                    return Err(invalid("trailing comma"));
                }
            } else if !rest.is_empty() {
                return Err(invalid("only fully-qualified sets are allowed"));
            }
        }

        Ok(Self { recommended: None })
    }

    fn parse_restriction(text: &str) -> std::result::Result<Restriction, &'static str> {
        let lower_inclusive = text.starts_with('[');
        let upper_inclusive = text.ends_with(']');
        let inner = text[1..text.len() - 1].trim();

        let bound = |raw: &str| -> std::result::Result<Option<Version>, &'static str> {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            Version::parse(raw)
                .map(Some)
                .map_err(|_| "bound is not a comparable version")
        };

        match inner.split_once(',') {
            None => {
                if !(lower_inclusive && upper_inclusive) {
                    return Err("single version must be surrounded by []");
                }
                let exact = bound(inner)?.ok_or("empty exact version")?;
                Ok(Restriction {
                    lower: Some(exact.clone()),
                    upper: Some(exact),
                })
            }
            Some((lower, upper)) => {
                if upper.contains(',') {
                    return Err("too many commas in range");
                }
                let lower = bound(lower)?;
                let upper = bound(upper)?;
                if let (Some(lower), Some(upper)) = (&lower, &upper) {
                    if upper < lower {
                        return Err("range defies version ordering");
                    }
                    if upper == lower && !(lower_inclusive && upper_inclusive) {
                        return Err("range cannot have identical boundaries");
                    }
                }
                Ok(Restriction { lower, upper })
            }
        }
    }

    /// The soft version, when the input is not a bracketed range.
    pub fn recommended(&self) -> Option<&str> {
        self.recommended.as_deref()
    }
}
