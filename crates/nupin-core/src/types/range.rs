//! Version ranges in interval notation.
//!
//! | text          | meaning              |
//! |---------------|----------------------|
//! | `1.0`         | `1.0 <= x`           |
//! | `(1.0,)`      | `1.0 < x`            |
//! | `[1.0]`       | `x == 1.0`           |
//! | `(,1.0]`      | `x <= 1.0`           |
//! | `(,1.0)`      | `x < 1.0`            |
//! | `[1.0,2.0]`   | `1.0 <= x <= 2.0`    |
//! | `(1.0,2.0)`   | `1.0 < x < 2.0`      |
//! | `[1.0,2.0)`   | `1.0 <= x < 2.0`     |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::version::{Version, VersionError};

/// One side of a version range
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Bound {
    Unbounded,
    Inclusive(Version),
    Exclusive(Version),
}

/// Interval of acceptable versions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
    lower: Bound,
    upper: Bound,
}

impl Bound {
    fn version(&self) -> Option<&Version> {
        match self {
            Bound::Unbounded => None,
            Bound::Inclusive(v) | Bound::Exclusive(v) => Some(v),
        }
    }

    fn is_inclusive(&self) -> bool {
        matches!(self, Bound::Inclusive(_))
    }
}

impl VersionRange {
    /// Build a range from two bounds, rejecting inverted or empty intervals
    pub fn new(lower: Bound, upper: Bound) -> Result<Self, VersionError> {
        let range = Self { lower, upper };
        range.validate()?;
        Ok(range)
    }

    /// Range accepting every version
    pub fn any() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    /// Minimum-version range, the shape of a bare version string
    pub fn at_least(version: Version) -> Self {
        Self {
            lower: Bound::Inclusive(version),
            upper: Bound::Unbounded,
        }
    }

    /// Single-version range
    pub fn exact(version: Version) -> Self {
        Self {
            lower: Bound::Inclusive(version.clone()),
            upper: Bound::Inclusive(version),
        }
    }

    pub fn lower(&self) -> &Bound {
        &self.lower
    }

    pub fn upper(&self) -> &Bound {
        &self.upper
    }

    /// The version this range is pinned to, if it admits exactly one
    pub fn exact_version(&self) -> Option<&Version> {
        match (&self.lower, &self.upper) {
            (Bound::Inclusive(a), Bound::Inclusive(b)) if a == b => Some(a),
            _ => None,
        }
    }

    /// Check whether a version satisfies both bounds
    pub fn contains(&self, version: &Version) -> bool {
        let lower_ok = match &self.lower {
            Bound::Unbounded => true,
            Bound::Inclusive(min) => version >= min,
            Bound::Exclusive(min) => version > min,
        };
        let upper_ok = match &self.upper {
            Bound::Unbounded => true,
            Bound::Inclusive(max) => version <= max,
            Bound::Exclusive(max) => version < max,
        };
        lower_ok && upper_ok
    }

    fn validate(&self) -> Result<(), VersionError> {
        if let (Some(min), Some(max)) = (self.lower.version(), self.upper.version()) {
            let empty = min > max
                || (min == max && !(self.lower.is_inclusive() && self.upper.is_inclusive()));
            if empty {
                return Err(VersionError::InvertedRange {
                    input: self.to_string(),
                });
            }
        }
        Ok(())
    }

    fn parse_interval(input: &str) -> Result<Self, VersionError> {
        let invalid = |reason: &str| VersionError::InvalidRange {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let lower_inclusive = input.starts_with('[');
        let upper_inclusive = match input.chars().last() {
            Some(']') if input.len() > 1 => true,
            Some(')') if input.len() > 1 => false,
            _ => return Err(invalid("missing closing bracket")),
        };

        let inner = &input[1..input.len() - 1];
        if inner.contains(['[', ']', '(', ')']) {
            return Err(invalid("unbalanced brackets"));
        }

        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        let range = match parts.as_slice() {
            [single] => {
                if single.is_empty() {
                    return Err(invalid("empty interval"));
                }
                if !(lower_inclusive && upper_inclusive) {
                    return Err(invalid("a single-version range must use inclusive brackets"));
                }
                Self::exact(Version::from_str(single)?)
            },
            [min, max] => Self {
                lower: Self::parse_endpoint(min, lower_inclusive)?,
                upper: Self::parse_endpoint(max, upper_inclusive)?,
            },
            _ => return Err(invalid("too many endpoints")),
        };

        range.validate().map_err(|_| VersionError::InvertedRange {
            input: input.to_string(),
        })?;
        Ok(range)
    }

    fn parse_endpoint(text: &str, inclusive: bool) -> Result<Bound, VersionError> {
        if text.is_empty() {
            return Ok(Bound::Unbounded);
        }
        let version = Version::from_str(text)?;
        Ok(if inclusive {
            Bound::Inclusive(version)
        } else {
            Bound::Exclusive(version)
        })
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();

        match input.chars().next() {
            None => Err(VersionError::InvalidRange {
                input: input.to_string(),
                reason: "empty range".to_string(),
            }),
            Some('[') | Some('(') => Self::parse_interval(input),
            _ if input.contains(['[', ']', '(', ')', ',']) => Err(VersionError::InvalidRange {
                input: input.to_string(),
                reason: "unbalanced brackets".to_string(),
            }),
            _ => Ok(Self::at_least(Version::from_str(input)?)),
        }
    }
}

impl TryFrom<String> for VersionRange {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionRange> for String {
    fn from(range: VersionRange) -> Self {
        range.to_string()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Bound::Inclusive(min), Bound::Unbounded) = (&self.lower, &self.upper) {
            return write!(f, "{}", min);
        }
        if let Some(exact) = self.exact_version() {
            return write!(f, "[{}]", exact);
        }

        match &self.lower {
            Bound::Unbounded => write!(f, "(")?,
            Bound::Inclusive(v) => write!(f, "[{}", v)?,
            Bound::Exclusive(v) => write!(f, "({}", v)?,
        }
        write!(f, ", ")?;
        match &self.upper {
            Bound::Unbounded => write!(f, ")"),
            Bound::Inclusive(v) => write!(f, "{}]", v),
            Bound::Exclusive(v) => write!(f, "{})", v),
        }
    }
}
