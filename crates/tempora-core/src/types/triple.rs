//! Triples and their object position.
//!
//! A [`Triple`] is one fact: `(subject, predicate, object)`. The subject
//! is always a [`Node`] and the predicate a [`Predicate`]; the object may
//! be a node, a predicate, or a [`Literal`], which is what [`Object`]
//! captures.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Literal, Node, Predicate};

/// The object position of a triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Object {
    /// The object is another node.
    Node(Node),
    /// The object is a predicate.
    Predicate(Predicate),
    /// The object is a literal value.
    Literal(Literal),
}

impl Object {
    /// The node payload, if the object is a node.
    #[inline]
    #[must_use]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(n) => Some(n),
            _ => None,
        }
    }

    /// The predicate payload, if the object is a predicate.
    #[inline]
    #[must_use]
    pub fn as_predicate(&self) -> Option<&Predicate> {
        match self {
            Self::Predicate(p) => Some(p),
            _ => None,
        }
    }

    /// The literal payload, if the object is a literal.
    #[inline]
    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(l) => Some(l),
            _ => None,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(n) => n.fmt(f),
            Self::Predicate(p) => p.fmt(f),
            Self::Literal(l) => l.fmt(f),
        }
    }
}

impl From<Node> for Object {
    fn from(n: Node) -> Self {
        Self::Node(n)
    }
}

impl From<Predicate> for Object {
    fn from(p: Predicate) -> Self {
        Self::Predicate(p)
    }
}

impl From<Literal> for Object {
    fn from(l: Literal) -> Self {
        Self::Literal(l)
    }
}

/// One stored fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    subject: Node,
    predicate: Predicate,
    object: Object,
}

impl Triple {
    /// Create a new triple.
    #[inline]
    #[must_use]
    pub fn new(subject: Node, predicate: Predicate, object: impl Into<Object>) -> Self {
        Self { subject, predicate, object: object.into() }
    }

    /// The subject node.
    #[inline]
    #[must_use]
    pub fn subject(&self) -> &Node {
        &self.subject
    }

    /// The predicate.
    #[inline]
    #[must_use]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// The object.
    #[inline]
    #[must_use]
    pub fn object(&self) -> &Object {
        &self.object
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_space_separated() {
        let t = Triple::new(
            Node::new("u", "joe"),
            Predicate::immutable("parent_of"),
            Node::new("u", "mary"),
        );
        assert_eq!(t.to_string(), "/u<joe> \"parent_of\"@[] /u<mary>");
    }

    #[test]
    fn object_accessors() {
        let o = Object::from(Literal::Int64(7));
        assert!(o.as_node().is_none());
        assert_eq!(o.as_literal().and_then(Literal::as_int64), Some(7));
    }

    #[test]
    fn serde_round_trip() {
        let t = Triple::new(
            Node::new("u", "joe"),
            Predicate::immutable("height_cm"),
            Literal::Int64(183),
        );
        let encoded = serde_json::to_string(&t).unwrap();
        let decoded: Triple = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, t);
    }
}
