//! Typed node identifiers.
//!
//! A [`Node`] names an entity in a graph. Nodes have a kind (a namespace
//! such as `u` or `city`) and an id unique within the kind, and print as
//! `/kind<id>`.
//!
//! # Example
//!
//! ```
//! use tempora_core::Node;
//!
//! let joe = Node::new("u", "joe");
//! assert_eq!(joe.to_string(), "/u<joe>");
//!
//! let parsed: Node = "/u<joe>".parse().unwrap();
//! assert_eq!(parsed, joe);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A typed identifier for a graph entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Node {
    kind: String,
    id: String,
}

impl Node {
    /// Create a new node of the given kind and id.
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self { kind: kind.into(), id: id.into() }
    }

    /// The node's kind (its type namespace).
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The node's id within its kind.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}<{}>", self.kind, self.id)
    }
}

impl FromStr for Node {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidNode(s.to_owned());
        let rest = s.strip_prefix('/').ok_or_else(invalid)?;
        let open = rest.find('<').ok_or_else(invalid)?;
        let kind = &rest[..open];
        let id = rest[open + 1..].strip_suffix('>').ok_or_else(invalid)?;
        if kind.is_empty() || id.contains('>') {
            return Err(invalid());
        }
        Ok(Self::new(kind, id))
    }
}
