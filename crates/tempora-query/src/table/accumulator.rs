//! Per-group accumulators for the reduce operation.
//!
//! An [`Accumulator`] folds the cells of one group into a single output
//! cell. Accumulators are reused across groups: the reduce loop calls
//! [`Accumulator::reset`] before each group, feeds every row's input
//! cell through [`Accumulator::accumulate`], and reads the group's
//! output from [`Accumulator::resulting`].

use std::collections::HashSet;
use std::fmt;

use tempora_core::Literal;

use super::cell::Cell;
use crate::error::{QueryError, QueryResult};

/// Folds a group of cells into one output cell.
pub trait Accumulator: fmt::Debug + Send {
    /// Feeds one cell into the accumulator.
    fn accumulate(&mut self, cell: &Cell) -> QueryResult<()>;

    /// The accumulated output for the current group.
    fn resulting(&self) -> Cell;

    /// Clears the state for the next group.
    fn reset(&mut self);
}

/// Pairs an input binding with an output alias and the accumulator that
/// folds the group, if any. Without an accumulator the first row's input
/// cell is copied through.
#[derive(Debug)]
pub struct AliasAccPair {
    /// The binding read from each group row.
    pub in_alias: String,
    /// The binding written on the output row.
    pub out_alias: String,
    /// The group folder; `None` copies the first row's cell through.
    pub acc: Option<Box<dyn Accumulator>>,
}

impl AliasAccPair {
    /// A pair that copies the group's first cell through unchanged.
    #[must_use]
    pub fn identity(in_alias: impl Into<String>, out_alias: impl Into<String>) -> Self {
        Self { in_alias: in_alias.into(), out_alias: out_alias.into(), acc: None }
    }

    /// A pair that folds the group through `acc`.
    #[must_use]
    pub fn with_accumulator(
        in_alias: impl Into<String>,
        out_alias: impl Into<String>,
        acc: Box<dyn Accumulator>,
    ) -> Self {
        Self { in_alias: in_alias.into(), out_alias: out_alias.into(), acc: Some(acc) }
    }
}

/// Counts the cells in the group.
#[derive(Debug, Default)]
pub struct CountAccumulator {
    count: i64,
}

impl CountAccumulator {
    /// Creates a zeroed counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Accumulator for CountAccumulator {
    fn accumulate(&mut self, _cell: &Cell) -> QueryResult<()> {
        self.count += 1;
        Ok(())
    }

    fn resulting(&self) -> Cell {
        Cell::Literal(Literal::Int64(self.count))
    }

    fn reset(&mut self) {
        self.count = 0;
    }
}

/// Counts the distinct cell values in the group, compared by their
/// canonical comparable strings.
#[derive(Debug, Default)]
pub struct CountDistinctAccumulator {
    seen: HashSet<String>,
}

impl CountDistinctAccumulator {
    /// Creates an empty distinct counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Accumulator for CountDistinctAccumulator {
    fn accumulate(&mut self, cell: &Cell) -> QueryResult<()> {
        self.seen.insert(cell.comparable_string());
        Ok(())
    }

    fn resulting(&self) -> Cell {
        Cell::Literal(Literal::Int64(self.seen.len() as i64))
    }

    fn reset(&mut self) {
        self.seen.clear();
    }
}

/// Sums `int64` literals; any other cell fails the aggregation.
#[derive(Debug, Default)]
pub struct SumInt64Accumulator {
    sum: i64,
}

impl SumInt64Accumulator {
    /// Creates a zeroed sum.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Accumulator for SumInt64Accumulator {
    fn accumulate(&mut self, cell: &Cell) -> QueryResult<()> {
        let value = cell.as_literal().and_then(Literal::as_int64).ok_or_else(|| {
            QueryError::Aggregation(format!("can only sum int64 literals; found {cell}"))
        })?;
        self.sum = self.sum.checked_add(value).ok_or_else(|| {
            QueryError::Aggregation("int64 sum overflowed".to_owned())
        })?;
        Ok(())
    }

    fn resulting(&self) -> Cell {
        Cell::Literal(Literal::Int64(self.sum))
    }

    fn reset(&mut self) {
        self.sum = 0;
    }
}

/// Sums `float64` literals; any other cell fails the aggregation.
#[derive(Debug, Default)]
pub struct SumFloat64Accumulator {
    sum: f64,
}

impl SumFloat64Accumulator {
    /// Creates a zeroed sum.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Accumulator for SumFloat64Accumulator {
    fn accumulate(&mut self, cell: &Cell) -> QueryResult<()> {
        let value = cell.as_literal().and_then(Literal::as_float64).ok_or_else(|| {
            QueryError::Aggregation(format!("can only sum float64 literals; found {cell}"))
        })?;
        self.sum += value;
        Ok(())
    }

    fn resulting(&self) -> Cell {
        Cell::Literal(Literal::Float64(self.sum))
    }

    fn reset(&mut self) {
        self.sum = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_ignores_cell_contents() {
        let mut acc = CountAccumulator::new();
        acc.accumulate(&Cell::from("a")).unwrap();
        acc.accumulate(&Cell::from("a")).unwrap();
        acc.accumulate(&Cell::Literal(Literal::Bool(true))).unwrap();
        assert_eq!(acc.resulting(), Cell::Literal(Literal::Int64(3)));

        acc.reset();
        assert_eq!(acc.resulting(), Cell::Literal(Literal::Int64(0)));
    }

    #[test]
    fn count_distinct_dedupes_by_comparable_string() {
        let mut acc = CountDistinctAccumulator::new();
        acc.accumulate(&Cell::from("a")).unwrap();
        acc.accumulate(&Cell::from("a")).unwrap();
        acc.accumulate(&Cell::from("b")).unwrap();
        assert_eq!(acc.resulting(), Cell::Literal(Literal::Int64(2)));
    }

    #[test]
    fn sum_int64_accumulates_and_rejects_other_types() {
        let mut acc = SumInt64Accumulator::new();
        acc.accumulate(&Cell::Literal(Literal::Int64(2))).unwrap();
        acc.accumulate(&Cell::Literal(Literal::Int64(40))).unwrap();
        assert_eq!(acc.resulting(), Cell::Literal(Literal::Int64(42)));

        let err = acc.accumulate(&Cell::Literal(Literal::Float64(1.0))).unwrap_err();
        assert!(matches!(err, QueryError::Aggregation(_)));
    }

    #[test]
    fn sum_int64_reports_overflow() {
        let mut acc = SumInt64Accumulator::new();
        acc.accumulate(&Cell::Literal(Literal::Int64(i64::MAX))).unwrap();
        let err = acc.accumulate(&Cell::Literal(Literal::Int64(1))).unwrap_err();
        assert!(matches!(err, QueryError::Aggregation(_)));
    }

    #[test]
    fn sum_float64_accumulates() {
        let mut acc = SumFloat64Accumulator::new();
        acc.accumulate(&Cell::Literal(Literal::Float64(1.5))).unwrap();
        acc.accumulate(&Cell::Literal(Literal::Float64(2.25))).unwrap();
        assert_eq!(acc.resulting(), Cell::Literal(Literal::Float64(3.75)));
    }
}
