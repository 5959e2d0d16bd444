//! Primary-key projection with whole-row fallback

use crate::table::Row;
use crate::value::Value;

/// A row projected onto its key columns
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrimaryKey<'r>(Vec<&'r Value>);

impl<'r> PrimaryKey<'r> {
    pub fn values(&self) -> &[&'r Value] {
        &self.0
    }
}

/// Projects rows of one table onto that table's declared primary key
///
/// Tables without a declared key fall back to whole-row identity, so two
/// rows of such a table share a key only when they are identical.
#[derive(Debug, Clone, Copy)]
pub struct PrimaryKeyExtractor<'t> {
    indices: &'t [usize],
    width: usize,
}

impl<'t> PrimaryKeyExtractor<'t> {
    /// `indices` are key column positions in key order; `width` is the
    /// table's column count
    pub fn new(indices: &'t [usize], width: usize) -> Self {
        Self { indices, width }
    }

    pub fn is_whole_row(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn extract<'r>(&self, row: &'r Row) -> PrimaryKey<'r> {
        if self.is_whole_row() {
            return PrimaryKey(row.iter().collect());
        }
        PrimaryKey(self.indices.iter().filter_map(|&i| row.get(i)).collect())
    }

    /// Column positions identifying a row: the declared key, or every column
    pub fn key_columns(&self) -> Vec<usize> {
        if self.is_whole_row() {
            (0..self.width).collect()
        } else {
            self.indices.to_vec()
        }
    }
}
