//! Two-phase snapshot construction
//!
//! Statements are collected first; `build` then registers every table
//! definition before attaching any rows, so an INSERT only fails when its
//! table is not defined anywhere in the dump.

use dumpdelta_core::{RowGroup, Schema, Snapshot, Table};
use std::collections::HashMap;

use crate::error::DumpError;
use crate::parser::{DumpStatement, InsertBlock, TableDefinition};

/// Collects parsed statements of one dump and builds its snapshot
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    label: String,
    definitions: Vec<TableDefinition>,
    inserts: Vec<InsertBlock>,
}

impl SnapshotBuilder {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            definitions: Vec::new(),
            inserts: Vec::new(),
        }
    }

    pub fn push(&mut self, statement: DumpStatement) {
        match statement {
            DumpStatement::CreateTable(definition) => self.definitions.push(definition),
            DumpStatement::Insert(block) => self.inserts.push(block),
        }
    }

    pub fn extend(&mut self, statements: impl IntoIterator<Item = DumpStatement>) {
        for statement in statements {
            self.push(statement);
        }
    }

    /// Build the immutable snapshot
    pub fn build(self) -> Result<Snapshot, DumpError> {
        // phase 1: table definitions
        let mut index: HashMap<String, usize> = HashMap::with_capacity(self.definitions.len());
        for (i, definition) in self.definitions.iter().enumerate() {
            if index.insert(definition.name.clone(), i).is_some() {
                return Err(dumpdelta_core::SnapshotError::DuplicateTable(definition.name.clone()).into());
            }
        }

        // phase 2: row data, in file order
        let mut groups: Vec<Vec<RowGroup>> = vec![Vec::new(); self.definitions.len()];
        let mut row_counts = vec![0usize; self.definitions.len()];
        for block in self.inserts {
            let Some(&i) = index.get(&block.table) else {
                return Err(DumpError::MissingCreateTable { table: block.table });
            };

            let width = self.definitions[i].columns.len();
            for row in &block.rows {
                row_counts[i] += 1;
                if row.len() != width {
                    return Err(DumpError::RowArity {
                        table: block.table.clone(),
                        row: row_counts[i],
                        expected: width,
                        actual: row.len(),
                    });
                }
            }
            groups[i].push(block.rows);
        }

        let tables = self
            .definitions
            .into_iter()
            .zip(groups)
            .map(|(definition, row_groups)| table_from_definition(definition, row_groups))
            .collect();

        Ok(Snapshot::from_tables(self.label, tables)?)
    }
}

fn table_from_definition(definition: TableDefinition, row_groups: Vec<RowGroup>) -> Table {
    let schema = Schema::from_columns(definition.columns);

    let mut primary_key = Vec::with_capacity(definition.primary_key.len());
    for name in &definition.primary_key {
        match schema.position(name) {
            Some(i) if !primary_key.contains(&i) => primary_key.push(i),
            Some(_) => {}
            None => tracing::warn!(table = %definition.name, column = %name, "primary key column not found"),
        }
    }
    if primary_key.is_empty() {
        tracing::warn!(table = %definition.name, "no primary key; rows are matched as a whole");
    }

    Table::new(definition.name, schema, primary_key)
        .with_definition(definition.text)
        .with_row_groups(row_groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DumpParser;
    use dumpdelta_core::Value;

    fn build(sql: &str) -> Result<Snapshot, DumpError> {
        let mut builder = SnapshotBuilder::new("test.sql");
        builder.extend(DumpParser::mysql().parse(sql, None)?);
        builder.build()
    }

    #[test]
    fn attaches_rows_in_file_order() {
        let snapshot = build(
            "CREATE TABLE t (id INT, PRIMARY KEY (id));\n\
             INSERT INTO t VALUES (1),(2);\n\
             INSERT INTO t VALUES (3);",
        )
        .unwrap();

        let table = snapshot.get("t").unwrap();
        assert_eq!(table.row_groups().len(), 2);
        let ids: Vec<&Value> = table.rows().map(|r| &r[0]).collect();
        assert_eq!(ids, vec![&Value::number("1"), &Value::number("2"), &Value::number("3")]);
        assert_eq!(table.primary_key(), &[0]);
    }

    #[test]
    fn insert_before_definition_is_accepted() {
        let snapshot = build(
            "INSERT INTO t VALUES (1);\n\
             CREATE TABLE t (id INT);",
        )
        .unwrap();

        assert_eq!(snapshot.get("t").unwrap().row_count(), 1);
    }

    #[test]
    fn missing_create_table() {
        let err = build("CREATE TABLE a (id INT); INSERT INTO b VALUES (1);").unwrap_err();
        assert!(matches!(err, DumpError::MissingCreateTable { ref table } if table == "b"));
    }

    #[test]
    fn duplicate_table() {
        let err = build("CREATE TABLE a (id INT); CREATE TABLE a (id INT);").unwrap_err();
        assert!(matches!(err, DumpError::Snapshot(_)));
    }

    #[test]
    fn row_arity_checked() {
        let err = build("CREATE TABLE a (id INT, v TEXT); INSERT INTO a VALUES (1,'x'),(2);").unwrap_err();
        assert!(matches!(
            err,
            DumpError::RowArity { row: 2, expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn key_columns_matched_case_insensitively() {
        let snapshot = build("CREATE TABLE a (Code CHAR(2), v TEXT, PRIMARY KEY (code));").unwrap();
        assert_eq!(snapshot.get("a").unwrap().primary_key(), &[0]);
    }

    #[test]
    fn table_without_rows() {
        let snapshot = build("CREATE TABLE empty (id INT);").unwrap();
        let table = snapshot.get("empty").unwrap();
        assert_eq!(table.row_count(), 0);
        assert!(!table.rows().has_next());
    }
}
