//! Boolean expressions over result rows.
//!
//! The HAVING clause of a query is represented as an [`Expr`] tree and
//! evaluated once per row. Comparisons resolve their operands to cells -
//! from the row for bindings, verbatim for constants - and compare their
//! canonical comparable strings, so literals compare by their normalized
//! form rather than their printed text. Binary nodes evaluate both
//! children before combining them.

use std::fmt;

use crate::error::{QueryError, QueryResult};
use crate::table::{Cell, Row};

/// A comparison between two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// Equality of the two cells.
    Eq,
    /// The left cell orders before the right one.
    Lt,
    /// The left cell orders after the right one.
    Gt,
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Gt => ">",
        };
        f.write_str(s)
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Resolved against the row at evaluation time.
    Binding(String),
    /// A fixed cell from the query text.
    Constant(Cell),
}

impl Operand {
    /// An operand resolved from the row.
    #[must_use]
    pub fn binding(name: impl Into<String>) -> Self {
        Self::Binding(name.into())
    }

    /// A fixed operand.
    #[must_use]
    pub fn constant(cell: impl Into<Cell>) -> Self {
        Self::Constant(cell.into())
    }

    fn resolve(&self, row: &Row) -> QueryResult<String> {
        match self {
            Self::Binding(name) => row
                .get(name)
                .map(|cell| cell.comparable_string().trim().to_owned())
                .ok_or_else(|| {
                    QueryError::Evaluation(format!(
                        "comparison requires the binding {name:?} to exist in the row"
                    ))
                }),
            Self::Constant(cell) => Ok(cell.comparable_string().trim().to_owned()),
        }
    }
}

/// A boolean expression tree evaluated against one row at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Compares two operands.
    Comparison {
        /// The comparison operator.
        op: ComparisonOp,
        /// The left operand.
        left: Operand,
        /// The right operand.
        right: Operand,
    },
    /// Both children must hold.
    And(Box<Expr>, Box<Expr>),
    /// At least one child must hold.
    Or(Box<Expr>, Box<Expr>),
    /// The child must not hold.
    Not(Box<Expr>),
}

impl Expr {
    /// Builds a comparison leaf.
    ///
    /// # Errors
    ///
    /// Rejects binding operands that are empty after trimming; a
    /// comparison with nothing to resolve can never evaluate.
    pub fn comparison(op: ComparisonOp, left: Operand, right: Operand) -> QueryResult<Self> {
        for operand in [&left, &right] {
            if let Operand::Binding(name) = operand {
                if name.trim().is_empty() {
                    return Err(QueryError::Evaluation(
                        "comparison bindings cannot be empty".to_owned(),
                    ));
                }
            }
        }
        Ok(Self::Comparison { op, left, right })
    }

    /// Compares two bindings.
    pub fn bindings(
        op: ComparisonOp,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> QueryResult<Self> {
        Self::comparison(op, Operand::binding(left), Operand::binding(right))
    }

    /// Builds a conjunction.
    #[must_use]
    pub fn and(left: Expr, right: Expr) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    /// Builds a disjunction.
    #[must_use]
    pub fn or(left: Expr, right: Expr) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    /// Builds a negation.
    #[must_use]
    pub fn not(child: Expr) -> Self {
        Self::Not(Box::new(child))
    }

    /// Evaluates the expression against `row`.
    ///
    /// # Errors
    ///
    /// Fails when a binding operand is absent from the row.
    pub fn evaluate(&self, row: &Row) -> QueryResult<bool> {
        match self {
            Self::Comparison { op, left, right } => {
                let l = left.resolve(row)?;
                let r = right.resolve(row)?;
                Ok(match op {
                    ComparisonOp::Eq => l == r,
                    ComparisonOp::Lt => l < r,
                    ComparisonOp::Gt => l > r,
                })
            }
            Self::And(left, right) => {
                let l = left.evaluate(row)?;
                let r = right.evaluate(row)?;
                Ok(l && r)
            }
            Self::Or(left, right) => {
                let l = left.evaluate(row)?;
                let r = right.evaluate(row)?;
                Ok(l || r)
            }
            Self::Not(child) => Ok(!child.evaluate(row)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempora_core::Literal;

    use super::*;

    fn row(pairs: &[(&str, Cell)]) -> Row {
        let mut r = Row::new();
        for (b, c) in pairs {
            r.set(*b, c.clone());
        }
        r
    }

    #[test]
    fn constructor_rejects_empty_bindings() {
        assert!(Expr::bindings(ComparisonOp::Eq, " ", "?b").is_err());
        assert!(Expr::bindings(ComparisonOp::Eq, "?a", "").is_err());
        assert!(Expr::bindings(ComparisonOp::Eq, "?a", "?b").is_ok());
    }

    #[test]
    fn comparisons_use_normalized_literal_forms() {
        let r = row(&[
            ("?a", Cell::Literal(Literal::Int64(7))),
            ("?b", Cell::Literal(Literal::Int64(7))),
            ("?c", Cell::Literal(Literal::Int64(11))),
        ]);

        let eq = Expr::bindings(ComparisonOp::Eq, "?a", "?b").unwrap();
        assert!(eq.evaluate(&r).unwrap());

        // 7 < 11 numerically, which the comparable encoding preserves
        // even though "7" > "11" as plain text.
        let lt = Expr::bindings(ComparisonOp::Lt, "?a", "?c").unwrap();
        assert!(lt.evaluate(&r).unwrap());

        let gt = Expr::bindings(ComparisonOp::Gt, "?c", "?a").unwrap();
        assert!(gt.evaluate(&r).unwrap());
    }

    #[test]
    fn constants_compare_against_bindings() {
        let r = row(&[("?n", Cell::Literal(Literal::Int64(2)))]);
        let above_one = Expr::comparison(
            ComparisonOp::Gt,
            Operand::binding("?n"),
            Operand::constant(Literal::Int64(1)),
        )
        .unwrap();
        let above_two = Expr::comparison(
            ComparisonOp::Gt,
            Operand::binding("?n"),
            Operand::constant(Literal::Int64(2)),
        )
        .unwrap();

        assert!(above_one.evaluate(&r).unwrap());
        assert!(!above_two.evaluate(&r).unwrap());
    }

    #[test]
    fn missing_binding_fails_evaluation() {
        let r = row(&[("?a", Cell::from("x"))]);
        let e = Expr::bindings(ComparisonOp::Eq, "?a", "?missing").unwrap();
        let err = e.evaluate(&r).unwrap_err();
        assert!(matches!(err, QueryError::Evaluation(_)));
    }

    #[test]
    fn boolean_combinators() {
        let r = row(&[("?a", Cell::from("x")), ("?b", Cell::from("x")), ("?c", Cell::from("y"))]);

        let same = Expr::bindings(ComparisonOp::Eq, "?a", "?b").unwrap();
        let diff = Expr::bindings(ComparisonOp::Eq, "?a", "?c").unwrap();

        assert!(Expr::and(same.clone(), Expr::not(diff.clone())).evaluate(&r).unwrap());
        assert!(Expr::or(diff.clone(), same.clone()).evaluate(&r).unwrap());
        assert!(!Expr::and(same, diff).evaluate(&r).unwrap());
    }

    #[test]
    fn errors_propagate_from_either_side() {
        let r = row(&[("?a", Cell::from("x"))]);
        let ok = Expr::bindings(ComparisonOp::Eq, "?a", "?a").unwrap();
        let bad = Expr::bindings(ComparisonOp::Eq, "?a", "?missing").unwrap();

        // Evaluation is eager, so the failing right child surfaces even
        // when the left child already determines the result.
        assert!(Expr::or(ok, bad).evaluate(&r).is_err());
    }
}
