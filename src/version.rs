//! Dotted numeric versions such as `1.0.2` or `4.1.0.0`.
//!
//! Ordering is lexicographic over the segments, most significant first. When
//! one version is a prefix of the other the shorter one is lower, so
//! `1.2.3 < 1.2.3.0`; missing segments are never treated as zero.

use crate::error::{BumpError, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    segments: Vec<u64>,
}

impl Version {
    /// Builds a version from raw segments. At least one segment is required.
    pub fn new(segments: Vec<u64>) -> Result<Self> {
        if segments.is_empty() {
            return Err(BumpError::format("", "a version needs at least one segment"));
        }
        Ok(Version { segments })
    }

    /// Parses a dot-separated string of non-negative integers.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(BumpError::format(value, "version is empty"));
        }

        let segments = trimmed
            .split('.')
            .map(|segment| {
                if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(BumpError::format(
                        value,
                        format!("segment '{segment}' is not a non-negative integer"),
                    ));
                }
                segment.parse::<u64>().map_err(|e| {
                    BumpError::format(value, format!("segment '{segment}' is invalid: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Version { segments })
    }

    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns a copy with the 1-based `segment` incremented by one.
    ///
    /// Lower-order segments are left as they are: bumping segment 2 of
    /// `1.4.7` gives `1.5.7`, not `1.5.0`.
    pub fn bump(&self, segment: usize) -> Result<Version> {
        if segment < 1 || segment > self.segments.len() {
            return Err(BumpError::Index {
                segment,
                version: self.to_string(),
                count: self.segments.len(),
            });
        }

        let mut segments = self.segments.clone();
        let index = segment - 1;
        segments[index] = segments[index]
            .checked_add(1)
            .ok_or_else(|| BumpError::format(self.to_string(), format!("segment {segment} overflows")))?;

        Ok(Version { segments })
    }

    /// Appends a segment, e.g. `1.2.3` with `0` becomes `1.2.3.0`.
    pub fn with_segment(&self, value: u64) -> Version {
        let mut segments = self.segments.clone();
        segments.push(value);
        Version { segments }
    }

    /// Drops the last segment. A single-segment version is returned unchanged.
    pub fn without_last_segment(&self) -> Version {
        let mut segments = self.segments.clone();
        if segments.len() > 1 {
            segments.pop();
        }
        Version { segments }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = BumpError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}
