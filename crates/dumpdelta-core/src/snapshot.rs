//! Immutable snapshot of one dump

use std::collections::HashMap;
use crate::table::Table;

/// All tables of one dump, in definition order
#[derive(Debug, Clone)]
pub struct Snapshot {
    label: String,
    tables: Vec<Table>,
    index: HashMap<String, usize>,
}

impl Snapshot {
    /// Build a snapshot; table names must be unique
    pub fn from_tables(label: impl Into<String>, tables: Vec<Table>) -> Result<Self, SnapshotError> {
        let mut index = HashMap::with_capacity(tables.len());
        for (i, table) in tables.iter().enumerate() {
            if index.insert(table.name().to_string(), i).is_some() {
                return Err(SnapshotError::DuplicateTable(table.name().to_string()));
            }
        }

        Ok(Self {
            label: label.into(),
            tables,
            index,
        })
    }

    /// Where this snapshot came from (usually the dump's file name)
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.index.get(name).map(|&i| &self.tables[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tables in definition order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(Table::name).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("table '{0}' is defined more than once")]
    DuplicateTable(String),
}
