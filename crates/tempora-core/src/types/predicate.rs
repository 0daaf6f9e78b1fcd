//! Predicates with optional time anchors.
//!
//! A [`Predicate`] names the relation of a triple. Predicates come in two
//! kinds that share one type:
//!
//! - **Immutable** predicates hold forever and print as `"name"@[]`.
//! - **Temporal** predicates hold at a point in time and print as
//!   `"name"@[anchor]`, where the anchor is rendered in a fixed-width
//!   RFC 3339 form (nanosecond precision) so the printed text sorts
//!   chronologically.
//!
//! Predicates compare by `(name, anchor)`; an immutable predicate sorts
//! before every temporal predicate of the same name.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use tempora_core::Predicate;
//!
//! let immutable = Predicate::immutable("parent_of");
//! assert_eq!(immutable.to_string(), "\"parent_of\"@[]");
//!
//! let when = Utc.with_ymd_and_hms(2021, 4, 10, 4, 21, 0).unwrap();
//! let temporal = Predicate::temporal("met", when);
//! assert!(temporal.is_temporal());
//! assert_eq!(temporal.anchor(), Some(when));
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Render a time anchor in the canonical fixed-width form.
///
/// The output always carries nanosecond precision and a `Z` offset, which
/// keeps lexicographic order of the rendered text equal to chronological
/// order of the anchors.
#[must_use]
pub fn format_anchor(anchor: &DateTime<Utc>) -> String {
    anchor.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a time anchor previously rendered by [`format_anchor`].
///
/// Any valid RFC 3339 text is accepted; the result is normalized to UTC.
pub fn parse_anchor(s: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| CoreError::InvalidAnchor(s.to_owned()))
}

/// A named relation with an optional time anchor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Predicate {
    name: String,
    anchor: Option<DateTime<Utc>>,
}

impl Predicate {
    /// Create an immutable predicate.
    #[inline]
    #[must_use]
    pub fn immutable(name: impl Into<String>) -> Self {
        Self { name: name.into(), anchor: None }
    }

    /// Create a temporal predicate anchored at the given instant.
    #[inline]
    #[must_use]
    pub fn temporal(name: impl Into<String>, anchor: DateTime<Utc>) -> Self {
        Self { name: name.into(), anchor: Some(anchor) }
    }

    /// The predicate's name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The time anchor, or `None` for an immutable predicate.
    #[inline]
    #[must_use]
    pub fn anchor(&self) -> Option<DateTime<Utc>> {
        self.anchor
    }

    /// Whether this predicate carries a time anchor.
    #[inline]
    #[must_use]
    pub fn is_temporal(&self) -> bool {
        self.anchor.is_some()
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.anchor {
            None => write!(f, "\"{}\"@[]", self.name),
            Some(t) => write!(f, "\"{}\"@[{}]", self.name, format_anchor(t)),
        }
    }
}

impl FromStr for Predicate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidPredicate(s.to_owned());
        let rest = s.strip_prefix('"').ok_or_else(invalid)?;
        let quote = rest.find('"').ok_or_else(invalid)?;
        let name = &rest[..quote];
        let anchor_text = rest[quote + 1..]
            .strip_prefix("@[")
            .and_then(|t| t.strip_suffix(']'))
            .ok_or_else(invalid)?;
        if name.is_empty() {
            return Err(invalid());
        }
        if anchor_text.is_empty() {
            Ok(Self::immutable(name))
        } else {
            Ok(Self::temporal(name, parse_anchor(anchor_text)?))
        }
    }
}
