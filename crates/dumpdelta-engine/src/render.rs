//! Rendering change sets as SQL mutation statements
//!
//! Per change set the output is, in order: the table definition (new tables
//! only), one batched DELETE, one batched INSERT, one UPDATE per updated row.
//! Deletes come first because a reordered row is reported as a delete and an
//! insert of the same key.

use std::io::{self, Write};

use dumpdelta_core::value::{quote_ident, render_tuple};
use dumpdelta_core::{Dialect, Row, Table, Value};

use crate::change_set::{ChangeSet, RowUpdate};

/// Writes SQL that turns the previous snapshot's rows into the current ones
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffRenderer {
    dialect: Dialect,
}

impl DiffRenderer {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Render one change set
    pub fn render<W: Write>(&self, changes: &ChangeSet<'_>, out: &mut W) -> io::Result<()> {
        let table = changes.table();
        let name = quote_ident(table.name(), self.dialect);

        if changes.is_new_table() {
            writeln!(out, "{};", table.definition())?;
        }

        let key_columns = table.key_extractor().key_columns();
        self.write_deletes(&name, table, &key_columns, changes.deleted(), out)?;
        self.write_inserts(&name, changes.inserted(), out)?;

        for update in changes.updated() {
            self.write_update(&name, table, &key_columns, update, out)?;
        }
        Ok(())
    }

    /// Render several change sets in order
    pub fn render_all<W: Write>(&self, changes: &[ChangeSet<'_>], out: &mut W) -> io::Result<()> {
        for change_set in changes {
            self.render(change_set, out)?;
        }
        Ok(())
    }

    pub fn render_to_string(&self, changes: &ChangeSet<'_>) -> io::Result<String> {
        let mut buf = Vec::new();
        self.render(changes, &mut buf)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn write_inserts<W: Write>(&self, name: &str, rows: &[&Row], out: &mut W) -> io::Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        writeln!(out, "INSERT INTO {} VALUES", name)?;
        let tuples: Vec<String> = rows.iter().map(|row| render_tuple(row.iter(), self.dialect)).collect();
        writeln!(out, "{};", tuples.join(",\n"))
    }

    fn write_update<W: Write>(
        &self,
        name: &str,
        table: &Table,
        key_columns: &[usize],
        update: &RowUpdate<'_>,
        out: &mut W,
    ) -> io::Result<()> {
        let mut assignments = Vec::new();
        for i in 0..table.columns().len() {
            let (Some(old), Some(new)) = (update.old.get(i), update.new.get(i)) else {
                continue;
            };
            let rendered = new.render(self.dialect);
            if old.render(self.dialect) != rendered {
                assignments.push(format!("{} = {}", self.column(table, i), rendered));
            }
        }
        if assignments.is_empty() {
            return Ok(());
        }

        let conditions: Vec<String> = key_columns
            .iter()
            .filter_map(|&i| update.new.get(i).map(|value| self.condition(table, i, value)))
            .collect();

        write!(out, "UPDATE {} SET {}", name, assignments.join(", "))?;
        if !conditions.is_empty() {
            write!(out, "\nWHERE {}", conditions.join("\n  AND "))?;
        }
        writeln!(out, ";")
    }

    fn write_deletes<W: Write>(
        &self,
        name: &str,
        table: &Table,
        key_columns: &[usize],
        rows: &[&Row],
        out: &mut W,
    ) -> io::Result<()> {
        if rows.is_empty() || key_columns.is_empty() {
            return Ok(());
        }

        // NULL never matches IN, so such keys get their own IS NULL clause
        let (plain, with_null): (Vec<&Row>, Vec<&Row>) = rows
            .iter()
            .copied()
            .partition(|row| !key_of(key_columns, row).iter().any(|v| v.is_null()));

        let mut clauses = Vec::new();
        if !plain.is_empty() {
            let keys: Vec<Vec<&Value>> = plain.iter().map(|row| key_of(key_columns, row)).collect();
            clauses.push(self.membership(table, key_columns, &keys));
        }
        for row in with_null {
            let conditions: Vec<String> = key_columns
                .iter()
                .filter_map(|&i| row.get(i).map(|value| self.condition(table, i, value)))
                .collect();
            clauses.push(format!("({})", conditions.join(" AND ")));
        }

        writeln!(out, "DELETE FROM {}", name)?;
        writeln!(out, "WHERE {};", clauses.join("\n   OR "))
    }

    /// `k IN (..)` for one key column, `(k1, k2) IN ((..), ..)` otherwise
    fn membership(&self, table: &Table, key_columns: &[usize], keys: &[Vec<&Value>]) -> String {
        if let [column] = key_columns {
            let values: Vec<String> = keys
                .iter()
                .filter_map(|key| key.first().map(|v| v.render(self.dialect)))
                .collect();
            return format!("{} IN ({})", self.column(table, *column), values.join(", "));
        }

        let columns: Vec<String> = key_columns.iter().map(|&i| self.column(table, i)).collect();
        let tuples: Vec<String> = keys
            .iter()
            .map(|key| render_tuple(key.iter().copied(), self.dialect))
            .collect();
        format!("({}) IN ({})", columns.join(", "), tuples.join(", "))
    }

    fn condition(&self, table: &Table, column: usize, value: &Value) -> String {
        if value.is_null() {
            format!("{} IS NULL", self.column(table, column))
        } else {
            format!("{} = {}", self.column(table, column), value.render(self.dialect))
        }
    }

    fn column(&self, table: &Table, index: usize) -> String {
        quote_ident(&table.columns()[index].name, self.dialect)
    }
}

/// Values of `row` at the key positions
fn key_of<'r>(key_columns: &[usize], row: &'r Row) -> Vec<&'r Value> {
    key_columns.iter().filter_map(|&i| row.get(i)).collect()
}
