//! Per-table change sets

use dumpdelta_core::{Row, SchemaMismatch, Table, TableChangeSummary};

use crate::row_diff::{RowDiffer, RowOperation};

/// A row whose content changed while its key stayed the same
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowUpdate<'a> {
    pub old: &'a Row,
    pub new: &'a Row,
}

/// The operations turning the previous version of a table into the current one
///
/// Rows are borrowed from the snapshots the change set was computed from.
#[derive(Debug, Clone)]
pub struct ChangeSet<'a> {
    table: &'a Table,
    is_new_table: bool,
    inserted: Vec<&'a Row>,
    updated: Vec<RowUpdate<'a>>,
    deleted: Vec<&'a Row>,
}

impl<'a> ChangeSet<'a> {
    /// Change set for a table that only exists in the current snapshot:
    /// every row is an insert
    pub fn added_table(table: &'a Table) -> Self {
        Self {
            table,
            is_new_table: true,
            inserted: table.rows().collect(),
            updated: Vec::new(),
            deleted: Vec::new(),
        }
    }

    /// Compare two versions of a table
    ///
    /// Fails without looking at any row when the schemas differ.
    pub fn compare(current: &'a Table, previous: &'a Table) -> Result<Self, SchemaMismatch> {
        current.schema().check_compatible(previous.schema(), current.name())?;
        Ok(Self::from_operations(current, RowDiffer::new(current, previous)))
    }

    /// Collect operations for `table` (the current version)
    pub fn from_operations(table: &'a Table, operations: impl IntoIterator<Item = RowOperation<'a>>) -> Self {
        let mut change_set = Self {
            table,
            is_new_table: false,
            inserted: Vec::new(),
            updated: Vec::new(),
            deleted: Vec::new(),
        };

        for operation in operations {
            match operation {
                RowOperation::Insert(row) => change_set.inserted.push(row),
                RowOperation::Update { old, new } => change_set.updated.push(RowUpdate { old, new }),
                RowOperation::Delete(row) => change_set.deleted.push(row),
            }
        }

        change_set
    }

    /// The current version of the table
    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn is_new_table(&self) -> bool {
        self.is_new_table
    }

    pub fn inserted(&self) -> &[&'a Row] {
        &self.inserted
    }

    pub fn updated(&self) -> &[RowUpdate<'a>] {
        &self.updated
    }

    pub fn deleted(&self) -> &[&'a Row] {
        &self.deleted
    }

    /// No operations and not a new table
    pub fn is_empty(&self) -> bool {
        !self.is_new_table && self.inserted.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    pub fn summary(&self) -> TableChangeSummary {
        TableChangeSummary {
            table: self.table.name().to_string(),
            added: self.is_new_table,
            inserted: self.inserted.len(),
            updated: self.updated.len(),
            deleted: self.deleted.len(),
        }
    }
}
