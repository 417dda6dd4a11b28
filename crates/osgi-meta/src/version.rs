//! OSGi versions and version ranges.
//!
//! Bundle versions follow the OSGi `major.minor.micro.qualifier` format.
//! Missing numeric components default to `0` and the qualifier defaults to
//! the empty string. Versions are totally ordered: numerically by
//! component, then by plain string comparison of the qualifier.
//!
//! Ranges use interval notation (`[1.0,2.0)`) or a bare version, which
//! means "at least this version".
//!
//! # Examples
//!
//! ```
//! use osgi_meta::{Version, VersionRange};
//!
//! let range = VersionRange::parse("[1.0,2.0)").unwrap();
//! assert!(range.includes(&Version::parse("1.5.3.v20240101").unwrap()));
//! assert!(!range.includes(&Version::new(2, 0, 0)));
//!
//! // A bare version has no upper bound
//! let at_least = VersionRange::parse("3.1").unwrap();
//! assert!(at_least.includes(&Version::new(10, 0, 0)));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// An OSGi bundle version.
///
/// Field order matters: the derived ordering compares `major`, `minor`,
/// `micro` and finally the qualifier string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    major: u32,
    minor: u32,
    micro: u32,
    qualifier: String,
}

impl Version {
    /// The empty version `0.0.0`.
    pub const ZERO: Version = Version {
        major: 0,
        minor: 0,
        micro: 0,
        qualifier: String::new(),
    };

    /// Create a version without qualifier.
    pub fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
            qualifier: String::new(),
        }
    }

    /// Create a version with a qualifier.
    pub fn with_qualifier(major: u32, minor: u32, micro: u32, qualifier: impl Into<String>) -> Self {
        Self {
            major,
            minor,
            micro,
            qualifier: qualifier.into(),
        }
    }

    /// Parse a version string.
    ///
    /// An empty string parses to [`Version::ZERO`], as in the OSGi
    /// framework API.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self::ZERO);
        }

        let invalid = |reason: &str| Error::InvalidVersion {
            version: input.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = trimmed.splitn(4, '.');
        let mut numbers = [0u32; 3];
        for (slot, number) in numbers.iter_mut().enumerate() {
            match parts.next() {
                Some(part) => *number = parse_component(part).ok_or_else(|| {
                    invalid(&format!("component {} is not a non-negative integer", slot + 1))
                })?,
                None => break,
            }
        }

        let qualifier = parts.next().unwrap_or_default();
        if !qualifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(invalid("qualifier may only contain letters, digits, '_' and '-'"));
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            micro: numbers[2],
            qualifier: qualifier.to_string(),
        })
    }

    /// Parse a version, falling back to [`Version::ZERO`] when malformed.
    ///
    /// A broken `Bundle-Version` header must not stop a bundle from being
    /// indexed, it just ranks lowest.
    pub fn parse_lenient(input: &str) -> Self {
        Self::parse(input).unwrap_or_else(|e| {
            tracing::debug!("{e}; treating as 0.0.0");
            Self::ZERO
        })
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn micro(&self) -> u32 {
        self.micro
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }
}

fn parse_component(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}

/// An OSGi version range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    floor: Version,
    floor_inclusive: bool,
    /// `None` means unbounded.
    ceiling: Option<Version>,
    ceiling_inclusive: bool,
}

impl VersionRange {
    /// A range matching `version` and everything above it.
    pub fn at_least(version: Version) -> Self {
        Self {
            floor: version,
            floor_inclusive: true,
            ceiling: None,
            ceiling_inclusive: false,
        }
    }

    /// Parse a range in interval notation or a bare version.
    ///
    /// Surrounding double quotes (as written in manifest attributes) are
    /// accepted and ignored.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let unquoted = trimmed
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(trimmed)
            .trim();

        let invalid = |reason: String| Error::InvalidVersionRange {
            range: input.to_string(),
            reason,
        };

        let floor_inclusive = match unquoted.chars().next() {
            Some('[') => true,
            Some('(') => false,
            _ => {
                let floor = Version::parse(unquoted).map_err(|e| invalid(e.to_string()))?;
                return Ok(Self::at_least(floor));
            }
        };

        let ceiling_inclusive = match unquoted.chars().last() {
            Some(']') if unquoted.len() > 1 => true,
            Some(')') if unquoted.len() > 1 => false,
            _ => return Err(invalid("missing closing ']' or ')'".to_string())),
        };

        let inner = &unquoted[1..unquoted.len() - 1];
        let (left, right) = inner
            .split_once(',')
            .ok_or_else(|| invalid("expected two comma separated versions".to_string()))?;
        if right.contains(',') {
            return Err(invalid("expected two comma separated versions".to_string()));
        }

        let floor = Version::parse(left).map_err(|e| invalid(e.to_string()))?;
        let ceiling = Version::parse(right).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            floor,
            floor_inclusive,
            ceiling: Some(ceiling),
            ceiling_inclusive,
        })
    }

    /// Check whether `version` lies within this range.
    pub fn includes(&self, version: &Version) -> bool {
        let above_floor = if self.floor_inclusive {
            version >= &self.floor
        } else {
            version > &self.floor
        };
        let below_ceiling = match &self.ceiling {
            None => true,
            Some(ceiling) if self.ceiling_inclusive => version <= ceiling,
            Some(ceiling) => version < ceiling,
        };
        above_floor && below_ceiling
    }

    pub fn floor(&self) -> &Version {
        &self.floor
    }

    pub fn ceiling(&self) -> Option<&Version> {
        self.ceiling.as_ref()
    }
}

impl FromStr for VersionRange {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ceiling {
            None => write!(f, "{}", self.floor),
            Some(ceiling) => write!(
                f,
                "{}{},{}{}",
                if self.floor_inclusive { '[' } else { '(' },
                self.floor,
                ceiling,
                if self.ceiling_inclusive { ']' } else { ')' },
            ),
        }
    }
}
