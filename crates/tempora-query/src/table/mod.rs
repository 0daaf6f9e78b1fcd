//! Result tables.
//!
//! A [`Table`] is the working row set of a query plan: an ordered list of
//! bindings (the schema, authoritative for projection, sort, and output)
//! plus an ordered sequence of [`Row`]s. Every operation keeps the schema
//! duplicate-free and every row's keys a subset of it, except transiently
//! while a single operation extends both.
//!
//! Row order is meaningful only after [`Table::sort`]; before that it is
//! implementation-defined but stable under no-op transformations.

mod accumulator;
mod cell;

pub use accumulator::{
    Accumulator, AliasAccPair, CountAccumulator, CountDistinctAccumulator,
    SumFloat64Accumulator, SumInt64Accumulator,
};
pub use cell::Cell;

use std::collections::BTreeMap;

use crate::error::{QueryError, QueryResult};

/// One result row: a mapping from binding name to cell.
///
/// Binding names are case-sensitive and unique per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: BTreeMap<String, Cell>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cell bound to `binding`, if any.
    #[inline]
    #[must_use]
    pub fn get(&self, binding: &str) -> Option<&Cell> {
        self.cells.get(binding)
    }

    /// Binds `binding` to `cell`, replacing any previous cell.
    pub fn set(&mut self, binding: impl Into<String>, cell: Cell) {
        self.cells.insert(binding.into(), cell);
    }

    /// Whether the row binds `binding`.
    #[inline]
    #[must_use]
    pub fn contains(&self, binding: &str) -> bool {
        self.cells.contains_key(binding)
    }

    /// Number of bound cells.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row binds nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates over `(binding, cell)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Removes every binding not accepted by `keep`.
    fn retain_bindings<F: FnMut(&str) -> bool>(&mut self, mut keep: F) {
        self.cells.retain(|k, _| keep(k));
    }
}

/// Merges rows left to right into a single row; later keys win on
/// collision.
#[must_use]
pub fn merge_rows(rows: &[&Row]) -> Row {
    let mut out = Row::new();
    for row in rows {
        for (binding, cell) in row.iter() {
            out.set(binding, cell.clone());
        }
    }
    out
}

/// One sort criterion: a binding and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortCondition {
    /// The binding supplying the sort key.
    pub binding: String,
    /// Sort descending instead of ascending.
    pub descending: bool,
}

impl SortCondition {
    /// Creates an ascending sort condition.
    #[must_use]
    pub fn ascending(binding: impl Into<String>) -> Self {
        Self { binding: binding.into(), descending: false }
    }

    /// Creates a descending sort condition.
    #[must_use]
    pub fn descending(binding: impl Into<String>) -> Self {
        Self { binding: binding.into(), descending: true }
    }
}

/// A lexicographic sort specification, applied left to right.
pub type SortConfig = Vec<SortCondition>;

/// The working row set of a query plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    bindings: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table with the given schema. Duplicate bindings
    /// are dropped, keeping the first occurrence.
    #[must_use]
    pub fn new<I, S>(bindings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut t = Self::default();
        t.add_bindings(bindings);
        t
    }

    /// Extends the schema with the given bindings; existing rows keep
    /// their cells and simply lack the new columns.
    pub fn add_bindings<I, S>(&mut self, bindings: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for b in bindings {
            let b = b.into();
            if !self.bindings.contains(&b) {
                self.bindings.push(b);
            }
        }
    }

    /// Appends a row. Keys outside the current schema are added to the
    /// schema as a side effect.
    pub fn add_row(&mut self, row: Row) {
        let unseen: Vec<String> = row
            .iter()
            .map(|(b, _)| b.to_owned())
            .filter(|b| !self.bindings.contains(b))
            .collect();
        self.add_bindings(unseen);
        self.rows.push(row);
    }

    /// The rows, in current order.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Mutable access to the rows. Callers must not introduce keys
    /// outside the schema.
    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// The schema, in column order.
    #[inline]
    #[must_use]
    pub fn bindings(&self) -> &[String] {
        &self.bindings
    }

    /// Whether the schema contains `binding`.
    #[inline]
    #[must_use]
    pub fn has_binding(&self, binding: &str) -> bool {
        self.bindings.iter().any(|b| b == binding)
    }

    /// Removes all rows; the schema is preserved.
    pub fn truncate(&mut self) {
        self.rows.clear();
    }

    /// Removes the row at `index`; subsequent rows shift down by one.
    /// Returns `false` when the index is out of range.
    pub fn delete_row(&mut self, index: usize) -> bool {
        if index < self.rows.len() {
            self.rows.remove(index);
            true
        } else {
            false
        }
    }

    /// Appends every row of `other`.
    ///
    /// If either table has an empty schema the other schema wins;
    /// otherwise the schemas must be equal as sets and the result keeps
    /// this table's column order.
    pub fn append_table(&mut self, other: Table) -> QueryResult<()> {
        if other.bindings.is_empty() {
            // Rows of an empty-schema table carry no keys.
            self.rows.extend(other.rows);
            return Ok(());
        }
        if self.bindings.is_empty() {
            self.bindings = other.bindings;
        } else if !equal_as_sets(&self.bindings, &other.bindings) {
            return Err(QueryError::Input(format!(
                "cannot append table with bindings {:?} to table with bindings {:?}",
                other.bindings, self.bindings
            )));
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Joins this table with `other` on their shared bindings.
    ///
    /// For every pair of rows that agree on all shared bindings, emits
    /// the merged row; with no shared bindings this is the Cartesian
    /// product. The result schema is the union of both schemas, and an
    /// empty side yields an empty result.
    pub fn dot_product(&mut self, other: &Table) {
        let shared: Vec<String> = self
            .bindings
            .iter()
            .filter(|b| other.has_binding(b.as_str()))
            .cloned()
            .collect();

        let mut joined = Vec::new();
        for left in &self.rows {
            for right in &other.rows {
                let matches = shared.iter().all(|b| {
                    match (left.get(b), right.get(b)) {
                        (Some(l), Some(r)) => l.comparable_string() == r.comparable_string(),
                        _ => false,
                    }
                });
                if matches {
                    joined.push(merge_rows(&[left, right]));
                }
            }
        }

        self.add_bindings(other.bindings.iter().cloned());
        self.rows = joined;
    }

    /// Restricts the schema to `bindings`, in that order, dropping every
    /// other column from every row.
    ///
    /// Fails if any requested binding is missing from the schema.
    pub fn project_bindings(&mut self, bindings: &[String]) -> QueryResult<()> {
        for b in bindings {
            if !self.has_binding(b) {
                return Err(QueryError::Input(format!(
                    "cannot project unknown binding {b:?}; table has {:?}",
                    self.bindings
                )));
            }
        }
        let mut projected = Vec::with_capacity(bindings.len());
        for b in bindings {
            if !projected.contains(b) {
                projected.push(b.clone());
            }
        }
        for row in &mut self.rows {
            row.retain_bindings(|b| projected.iter().any(|p| p == b));
        }
        self.bindings = projected;
        Ok(())
    }

    /// Removes every row for which `drop` returns true, visiting rows in
    /// order.
    pub fn filter<F: FnMut(&Row) -> bool>(&mut self, mut drop: F) {
        self.rows.retain(|row| !drop(row));
    }

    /// Stable sort by the lexicographic key described by `cfg`. Rows
    /// missing a sort binding compare as the empty string.
    pub fn sort(&mut self, cfg: &SortConfig) {
        if cfg.is_empty() {
            return;
        }
        self.rows.sort_by(|a, b| {
            for cond in cfg {
                let ka = a.get(&cond.binding).map(Cell::comparable_string).unwrap_or_default();
                let kb = b.get(&cond.binding).map(Cell::comparable_string).unwrap_or_default();
                let ord = if cond.descending { kb.cmp(&ka) } else { ka.cmp(&kb) };
                if ord != std::cmp::Ordering::Equal {
                    return ord;
                }
            }
            std::cmp::Ordering::Equal
        });
    }

    /// Group-by reduce.
    ///
    /// Sorts on `cfg`, then scans maximal runs of rows equal on all
    /// `cfg` bindings. For each run, each [`AliasAccPair`] produces one
    /// output cell: pairs without an accumulator copy the first row's
    /// `in_alias` cell, pairs with one fold every row's `in_alias` cell.
    /// The output schema is the group-by bindings followed by the output
    /// aliases.
    pub fn reduce(&mut self, cfg: &SortConfig, accumulators: &mut [AliasAccPair]) -> QueryResult<()> {
        self.sort(cfg);
        let group_bindings: Vec<String> = cfg.iter().map(|c| c.binding.clone()).collect();

        let mut schema: Vec<String> = Vec::new();
        for b in &group_bindings {
            if !schema.contains(b) {
                schema.push(b.clone());
            }
        }
        for pair in accumulators.iter() {
            if !schema.contains(&pair.out_alias) {
                schema.push(pair.out_alias.clone());
            }
        }

        let rows = std::mem::take(&mut self.rows);
        let mut reduced = Vec::new();
        let mut start = 0;
        while start < rows.len() {
            let mut end = start + 1;
            while end < rows.len() && same_group(&rows[start], &rows[end], &group_bindings) {
                end += 1;
            }
            let group = &rows[start..end];

            let mut out = Row::new();
            for b in &group_bindings {
                if let Some(cell) = group[0].get(b) {
                    out.set(b.clone(), cell.clone());
                }
            }
            for pair in accumulators.iter_mut() {
                match &mut pair.acc {
                    None => {
                        if let Some(cell) = group[0].get(&pair.in_alias) {
                            out.set(pair.out_alias.clone(), cell.clone());
                        }
                    }
                    Some(acc) => {
                        acc.reset();
                        for row in group {
                            let cell = row.get(&pair.in_alias).ok_or_else(|| {
                                QueryError::Aggregation(format!(
                                    "row misses binding {:?} required by the accumulator",
                                    pair.in_alias
                                ))
                            })?;
                            acc.accumulate(cell)?;
                        }
                        out.set(pair.out_alias.clone(), acc.resulting());
                    }
                }
            }
            reduced.push(out);
            start = end;
        }

        self.bindings = schema;
        self.rows = reduced;
        Ok(())
    }

    /// Keeps only the first `n` rows; a no-op when the table is smaller.
    pub fn limit(&mut self, n: usize) {
        self.rows.truncate(n);
    }
}

fn same_group(a: &Row, b: &Row, bindings: &[String]) -> bool {
    bindings.iter().all(|binding| match (a.get(binding), b.get(binding)) {
        (Some(l), Some(r)) => l.comparable_string() == r.comparable_string(),
        (None, None) => true,
        _ => false,
    })
}

fn equal_as_sets(a: &[String], b: &[String]) -> bool {
    a.iter().all(|x| b.contains(x)) && b.iter().all(|x| a.contains(x))
}
