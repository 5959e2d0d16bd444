//! Snapshot-wide comparison
//!
//! Every table of the current snapshot is compared with its namesake in the
//! previous snapshot. Tables that only exist in the previous snapshot are not
//! reported. Schema mismatches follow an explicit policy: by default the
//! table is skipped and the mismatch recorded, so the remaining tables are
//! still compared and the caller can fail the run afterwards.

use dumpdelta_core::{
    Config, Diagnostic, DiagnosticCode, Location, MismatchPolicy, SchemaMismatch, Severity, Snapshot,
    TableChangeSummary, TableFilter,
};

use crate::change_set::ChangeSet;

/// Compares whole snapshots
#[derive(Debug, Clone, Default)]
pub struct SnapshotDiffer {
    policy: MismatchPolicy,
    filter: TableFilter,
}

impl SnapshotDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            policy: config.on_schema_mismatch,
            filter: config.tables.clone(),
        }
    }

    pub fn with_policy(mut self, policy: MismatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_filter(mut self, filter: TableFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Compare `current` (newer) against `previous` (older)
    ///
    /// Returns `Err` only under `MismatchPolicy::Abort`; with the default
    /// policy mismatches are collected in the result.
    pub fn compare<'a>(
        &self,
        current: &'a Snapshot,
        previous: &'a Snapshot,
    ) -> Result<SnapshotDiff<'a>, SchemaMismatch> {
        let mut diff = SnapshotDiff {
            current,
            previous,
            changes: Vec::new(),
            mismatches: Vec::new(),
        };

        for table in current.tables() {
            if self.filter.is_skipped(table.name()) {
                tracing::debug!(table = table.name(), "skipped by configuration");
                continue;
            }

            let Some(old_table) = previous.get(table.name()) else {
                tracing::info!(table = table.name(), rows = table.row_count(), "table added");
                diff.changes.push(ChangeSet::added_table(table));
                continue;
            };

            tracing::debug!(table = table.name(), "comparing rows");
            match ChangeSet::compare(table, old_table) {
                Ok(changes) if changes.is_empty() => {}
                Ok(changes) => diff.changes.push(changes),
                Err(mismatch) => {
                    tracing::warn!(%mismatch, "table not compared");
                    match self.policy {
                        MismatchPolicy::Abort => return Err(mismatch),
                        MismatchPolicy::SkipTable => diff.mismatches.push(mismatch),
                    }
                }
            }
        }

        for table in previous.tables() {
            if !current.contains(table.name()) {
                tracing::debug!(table = table.name(), "table only in previous snapshot, not reported");
            }
        }

        Ok(diff)
    }
}

/// Result of comparing two snapshots
#[derive(Debug, Clone)]
pub struct SnapshotDiff<'a> {
    current: &'a Snapshot,
    previous: &'a Snapshot,

    /// Non-empty change sets, in the current snapshot's table order
    pub changes: Vec<ChangeSet<'a>>,

    /// Tables skipped because their schemas differ
    pub mismatches: Vec<SchemaMismatch>,
}

impl<'a> SnapshotDiff<'a> {
    pub fn current(&self) -> &'a Snapshot {
        self.current
    }

    pub fn previous(&self) -> &'a Snapshot {
        self.previous
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn has_mismatches(&self) -> bool {
        !self.mismatches.is_empty()
    }

    pub fn summaries(&self) -> Vec<TableChangeSummary> {
        self.changes.iter().map(ChangeSet::summary).collect()
    }

    /// Diagnostics for this comparison: added tables, changed tables without
    /// a primary key, and schema mismatches
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let file = self.current.label();
        let mut diagnostics = Vec::new();

        for changes in &self.changes {
            let table = changes.table();
            if changes.is_new_table() {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::TableAdded,
                        Severity::Info,
                        format!("Table '{}' added with {} rows", table.name(), table.row_count()),
                    )
                    .with_location(Location::table(file, table.name())),
                );
            }
            if !table.has_primary_key() {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::TableNoPrimaryKey,
                        Severity::Warn,
                        format!("Table '{}' has no primary key; changed rows appear as delete + insert", table.name()),
                    )
                    .with_location(Location::table(file, table.name())),
                );
            }
        }

        diagnostics.extend(self.mismatches.iter().map(|m| m.to_diagnostic(file)));
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dumpdelta_core::{Column, Row, Schema, Table, Value};

    fn row(id: &str, name: &str) -> Row {
        vec![Value::number(id), Value::text(name)]
    }

    fn table(name: &str, name_type: &str, rows: Vec<Row>) -> Table {
        let schema = Schema::from_columns(vec![
            Column::new("id", "INT"),
            Column::new("name", name_type),
        ]);
        Table::new(name, schema, vec![0]).with_row_groups(vec![rows])
    }

    fn snapshot(label: &str, tables: Vec<Table>) -> Snapshot {
        Snapshot::from_tables(label, tables).unwrap()
    }

    #[test]
    fn snapshot_against_itself_is_empty() {
        let s = snapshot("a.sql", vec![
            table("t1", "TEXT", vec![row("1", "a")]),
            table("t2", "TEXT", vec![row("1", "b"), row("2", "c")]),
        ]);

        let diff = SnapshotDiffer::new().compare(&s, &s).unwrap();
        assert!(!diff.has_changes());
        assert!(!diff.has_mismatches());
        assert!(diff.diagnostics().is_empty());
    }

    #[test]
    fn new_table_is_reported_as_added() {
        let previous = snapshot("old.sql", vec![table("t1", "TEXT", vec![row("1", "a")])]);
        let current = snapshot("new.sql", vec![
            table("t1", "TEXT", vec![row("1", "a")]),
            table("t2", "TEXT", vec![row("1", "x"), row("2", "y")]),
        ]);

        let diff = SnapshotDiffer::new().compare(&current, &previous).unwrap();
        assert_eq!(diff.changes.len(), 1);
        assert!(diff.changes[0].is_new_table());
        assert_eq!(diff.changes[0].inserted().len(), 2);

        let diagnostics = diff.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::TableAdded);
    }

    #[test]
    fn removed_table_is_not_reported() {
        let previous = snapshot("old.sql", vec![
            table("t1", "TEXT", vec![row("1", "a")]),
            table("gone", "TEXT", vec![row("1", "a")]),
        ]);
        let current = snapshot("new.sql", vec![table("t1", "TEXT", vec![row("1", "a")])]);

        let diff = SnapshotDiffer::new().compare(&current, &previous).unwrap();
        assert!(!diff.has_changes());
    }

    #[test]
    fn mismatch_skips_only_that_table() {
        let previous = snapshot("old.sql", vec![
            table("a", "TEXT", vec![row("1", "a")]),
            table("b", "TEXT", vec![row("1", "a")]),
        ]);
        let current = snapshot("new.sql", vec![
            table("a", "VARCHAR(10)", vec![row("1", "changed")]),
            table("b", "TEXT", vec![row("1", "a"), row("2", "b")]),
        ]);

        let diff = SnapshotDiffer::new().compare(&current, &previous).unwrap();
        assert_eq!(diff.mismatches.len(), 1);
        assert_eq!(diff.mismatches[0].table, "a");
        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].table().name(), "b");

        let codes: Vec<DiagnosticCode> = diff.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![DiagnosticCode::SchemaColumnType]);
    }

    #[test]
    fn abort_policy_stops_at_first_mismatch() {
        let previous = snapshot("old.sql", vec![table("a", "TEXT", vec![])]);
        let current = snapshot("new.sql", vec![table("a", "BLOB", vec![])]);

        let result = SnapshotDiffer::new()
            .with_policy(MismatchPolicy::Abort)
            .compare(&current, &previous);
        assert_eq!(result.unwrap_err().table, "a");
    }

    #[test]
    fn skipped_tables_are_ignored() {
        let previous = snapshot("old.sql", vec![table("audit_log", "TEXT", vec![row("1", "a")])]);
        let current = snapshot("new.sql", vec![
            table("audit_log", "TEXT", vec![row("1", "a"), row("2", "b")]),
            table("audit_new", "TEXT", vec![row("1", "a")]),
        ]);

        let filter = TableFilter { skip: vec!["audit_*".to_string()] };
        let diff = SnapshotDiffer::new().with_filter(filter).compare(&current, &previous).unwrap();
        assert!(!diff.has_changes());
    }

    #[test]
    fn changes_follow_table_order() {
        let previous = snapshot("old.sql", vec![
            table("z", "TEXT", vec![row("1", "a")]),
            table("a", "TEXT", vec![row("1", "a")]),
        ]);
        let current = snapshot("new.sql", vec![
            table("z", "TEXT", vec![row("1", "b")]),
            table("a", "TEXT", vec![row("1", "b")]),
        ]);

        let diff = SnapshotDiffer::new().compare(&current, &previous).unwrap();
        let names: Vec<&str> = diff.changes.iter().map(|c| c.table().name()).collect();
        assert_eq!(names, vec!["z", "a"]);
        assert_eq!(diff.summaries()[0].updated, 1);
    }

    #[test]
    fn from_config_reads_policy_and_filter() {
        let config = Config::from_toml(
            "on_schema_mismatch = \"abort\"\n[tables]\nskip = [\"x\"]\n",
        )
        .unwrap();
        let differ = SnapshotDiffer::from_config(&config);
        assert_eq!(differ.policy, MismatchPolicy::Abort);
        assert!(differ.filter.is_skipped("x"));
    }
}
