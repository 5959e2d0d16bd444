//! Tables and lazy row iteration

use crate::key::PrimaryKeyExtractor;
use crate::schema::{Column, Schema};
use crate::value::Value;

/// One row: values in column order
pub type Row = Vec<Value>;

/// Rows of one `INSERT` statement, in file order
pub type RowGroup = Vec<Row>;

/// A table of one snapshot: definition plus row data
///
/// Tables are assembled once by the snapshot builder and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    schema: Schema,
    primary_key: Vec<usize>,
    definition: String,
    row_groups: Vec<RowGroup>,
}

impl Table {
    /// Create an empty table
    ///
    /// `primary_key` holds column positions in key order; indices outside the
    /// schema are dropped. The definition text defaults to a generated
    /// `CREATE TABLE` statement.
    pub fn new(name: impl Into<String>, schema: Schema, primary_key: Vec<usize>) -> Self {
        let name = name.into();
        let primary_key: Vec<usize> = primary_key
            .into_iter()
            .filter(|&i| i < schema.len())
            .collect();
        let definition = generated_definition(&name, &schema, &primary_key);

        Self {
            name,
            schema,
            primary_key,
            definition,
            row_groups: Vec::new(),
        }
    }

    /// Replace the definition text (the original `CREATE TABLE` statement)
    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }

    /// Attach row groups, in file order
    pub fn with_row_groups(mut self, row_groups: Vec<RowGroup>) -> Self {
        self.row_groups = row_groups;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[Column] {
        &self.schema.columns
    }

    /// Declared primary-key column positions (empty when none declared)
    pub fn primary_key(&self) -> &[usize] {
        &self.primary_key
    }

    pub fn has_primary_key(&self) -> bool {
        !self.primary_key.is_empty()
    }

    /// The `CREATE TABLE` statement text, without a trailing semicolon
    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn row_groups(&self) -> &[RowGroup] {
        &self.row_groups
    }

    /// Total number of rows across all groups
    pub fn row_count(&self) -> usize {
        self.row_groups.iter().map(Vec::len).sum()
    }

    /// Lazy iteration over all rows in file order
    pub fn rows(&self) -> RowSequencer<'_> {
        RowSequencer::new(&self.row_groups)
    }

    /// Key projection for rows of this table
    pub fn key_extractor(&self) -> PrimaryKeyExtractor<'_> {
        PrimaryKeyExtractor::new(&self.primary_key, self.schema.len())
    }
}

fn generated_definition(name: &str, schema: &Schema, primary_key: &[usize]) -> String {
    let mut lines: Vec<String> = schema
        .columns
        .iter()
        .map(|c| format!("  {} {}", c.name, c.data_type))
        .collect();

    if !primary_key.is_empty() {
        let key: Vec<&str> = primary_key
            .iter()
            .map(|&i| schema.columns[i].name.as_str())
            .collect();
        lines.push(format!("  PRIMARY KEY ({})", key.join(", ")));
    }

    format!("CREATE TABLE {} (\n{}\n)", name, lines.join(",\n"))
}

/// Forward-only sequence over a table's row groups
///
/// Holds a reference to the groups plus a (group, row) position, so only the
/// current group is touched at any time. Empty groups are skipped.
#[derive(Debug, Clone)]
pub struct RowSequencer<'a> {
    groups: &'a [RowGroup],
    group: usize,
    row: usize,
}

impl<'a> RowSequencer<'a> {
    pub fn new(groups: &'a [RowGroup]) -> Self {
        let mut sequencer = Self { groups, group: 0, row: 0 };
        sequencer.skip_exhausted();
        sequencer
    }

    /// Whether another row is pending
    pub fn has_next(&self) -> bool {
        self.group < self.groups.len()
    }

    fn skip_exhausted(&mut self) {
        while self.group < self.groups.len() && self.row >= self.groups[self.group].len() {
            self.group += 1;
            self.row = 0;
        }
    }
}

impl<'a> Iterator for RowSequencer<'a> {
    type Item = &'a Row;

    fn next(&mut self) -> Option<&'a Row> {
        let groups: &'a [RowGroup] = self.groups;
        let row = groups.get(self.group)?.get(self.row)?;
        self.row += 1;
        self.skip_exhausted();
        Some(row)
    }
}

impl std::iter::FusedIterator for RowSequencer<'_> {}
