//! Result-table cells.
//!
//! A [`Cell`] is one column value in a result row: a node, a predicate, a
//! literal, or raw text (used for projected identity aliases). Cells are
//! immutable once placed in a row. All comparisons between cells go
//! through [`Cell::comparable_string`], a canonical serialization that
//! avoids cross-variant equality surprises.

use serde::{Deserialize, Serialize};
use std::fmt;

use tempora_core::{Literal, Node, Predicate};

/// One column value in a result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    /// A graph node.
    Node(Node),
    /// A predicate, possibly with a time anchor.
    Predicate(Predicate),
    /// A literal value.
    Literal(Literal),
    /// Raw text, as produced by identity and anchor aliases.
    Text(String),
}

impl Cell {
    /// The node payload, if this cell holds a node.
    #[inline]
    #[must_use]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(n) => Some(n),
            _ => None,
        }
    }

    /// The predicate payload, if this cell holds a predicate.
    #[inline]
    #[must_use]
    pub fn as_predicate(&self) -> Option<&Predicate> {
        match self {
            Self::Predicate(p) => Some(p),
            _ => None,
        }
    }

    /// The literal payload, if this cell holds a literal.
    #[inline]
    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// The text payload, if this cell holds raw text.
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical comparable string.
    ///
    /// Two cells are considered equal by the join and sort machinery when
    /// their comparable strings are equal. Within a variant, the strings
    /// order by the value's natural order (nodes by kind then id,
    /// predicates by name then anchor, literals by type then value).
    #[must_use]
    pub fn comparable_string(&self) -> String {
        match self {
            Self::Node(n) => n.to_string(),
            Self::Predicate(p) => p.to_string(),
            Self::Literal(l) => l.comparable_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(n) => n.fmt(f),
            Self::Predicate(p) => p.fmt(f),
            Self::Literal(l) => l.fmt(f),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<Node> for Cell {
    fn from(n: Node) -> Self {
        Self::Node(n)
    }
}

impl From<Predicate> for Cell {
    fn from(p: Predicate) -> Self {
        Self::Predicate(p)
    }
}

impl From<Literal> for Cell {
    fn from(l: Literal) -> Self {
        Self::Literal(l)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
