//! Typed literal values.
//!
//! A [`Literal`] is a scalar stored in the object position of a triple.
//! Literals print as `"value"^^type:tag` and expose a canonical
//! *comparable string* whose lexicographic order equals the natural order
//! of the underlying values, including across negative numbers.
//!
//! The numeric encodings use the sign-flip transformations common to
//! order-preserving key encodings: integers flip the sign bit and render
//! as fixed-width decimal; floats flip the sign bit when positive and all
//! bits when negative, then render as fixed-width hex.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Constant for flipping the sign bit of a 64-bit value.
const SIGN_FLIP: u64 = 0x8000_0000_0000_0000;

/// A typed scalar value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit floating point number.
    Float64(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl Literal {
    /// The literal's type tag, as used in the printed form.
    #[must_use]
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int64(_) => "int64",
            Self::Float64(_) => "float64",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }

    /// The boolean payload, if this is a `Bool`.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer payload, if this is an `Int64`.
    #[inline]
    #[must_use]
    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// The float payload, if this is a `Float64`.
    #[inline]
    #[must_use]
    pub fn as_float64(&self) -> Option<f64> {
        match self {
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// The text payload, if this is a `Text`.
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The bytes payload, if this is a `Blob`.
    #[inline]
    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Self::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Canonical comparable string.
    ///
    /// Comparing two of these strings lexicographically gives the same
    /// result as comparing the literals: values order within a type by
    /// their natural order, and across types by the type tag.
    #[must_use]
    pub fn comparable_string(&self) -> String {
        match self {
            Self::Bool(b) => format!("type:bool:{}", if *b { 't' } else { 'f' }),
            Self::Int64(v) => format!("type:int64:{:020}", (*v as u64) ^ SIGN_FLIP),
            Self::Float64(v) => {
                let bits = v.to_bits();
                let flipped = if bits & SIGN_FLIP == 0 { bits ^ SIGN_FLIP } else { !bits };
                format!("type:float64:{flipped:016x}")
            }
            Self::Text(s) => format!("type:text:{s}"),
            Self::Blob(b) => {
                let mut out = String::with_capacity(10 + b.len() * 2);
                out.push_str("type:blob:");
                for byte in b {
                    out.push_str(&format!("{byte:02x}"));
                }
                out
            }
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "\"{b}\"^^type:bool"),
            Self::Int64(v) => write!(f, "\"{v}\"^^type:int64"),
            Self::Float64(v) => write!(f, "\"{v}\"^^type:float64"),
            Self::Text(s) => write!(f, "\"{s}\"^^type:text"),
            Self::Blob(b) => {
                write!(f, "\"")?;
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                write!(f, "\"^^type:blob")
            }
        }
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
