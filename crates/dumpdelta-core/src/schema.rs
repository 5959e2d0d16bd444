//! Column definitions and cross-version schema compatibility

use serde::{Deserialize, Serialize};
use crate::diagnostic::{Diagnostic, DiagnosticCode, Location, Severity};

/// A column in a table definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Declared type, as canonical SQL text (e.g. `VARCHAR(32)`)
    pub data_type: String,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    /// The declared type without length, precision or value lists
    ///
    /// `VARCHAR(32)` and `varchar(64)` share the base type `VARCHAR`;
    /// `INT(11) UNSIGNED` becomes `INT UNSIGNED`.
    pub fn base_type(&self) -> String {
        let mut base = String::with_capacity(self.data_type.len());
        let mut depth = 0usize;
        let mut quote: Option<char> = None;

        for c in self.data_type.chars() {
            match (quote, c) {
                (Some(q), _) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '\'' | '"') if depth > 0 => quote = Some(c),
                (None, '(') => depth += 1,
                (None, ')') => depth = depth.saturating_sub(1),
                (None, _) if depth == 0 => base.push(c.to_ascii_uppercase()),
                (None, _) => {}
            }
        }

        base.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// An ordered collection of columns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Ordered list of columns
    pub columns: Vec<Column>,
}

impl Schema {
    /// Create a schema from columns
    pub fn from_columns(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column, matching the name case-insensitively
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Check that `self` (the newer version of `table`) can be compared row by
    /// row against `previous`
    ///
    /// Column counts must match, then every column must have the same name
    /// (ignoring ASCII case) and the same base type at the same position.
    /// Length and precision changes such as widening a `VARCHAR` keep the
    /// table comparable.
    pub fn check_compatible(&self, previous: &Schema, table: &str) -> Result<(), SchemaMismatch> {
        if self.len() != previous.len() {
            return Err(SchemaMismatch {
                table: table.to_string(),
                kind: MismatchKind::ColumnCount,
                expected: previous.len().to_string(),
                actual: self.len().to_string(),
            });
        }

        for (position, (current, old)) in self.columns.iter().zip(&previous.columns).enumerate() {
            if !current.name.eq_ignore_ascii_case(&old.name) {
                return Err(SchemaMismatch {
                    table: table.to_string(),
                    kind: MismatchKind::ColumnName { position },
                    expected: old.name.clone(),
                    actual: current.name.clone(),
                });
            }
            if current.base_type() != old.base_type() {
                return Err(SchemaMismatch {
                    table: table.to_string(),
                    kind: MismatchKind::ColumnType { column: current.name.clone() },
                    expected: old.data_type.clone(),
                    actual: current.data_type.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Which part of a table definition diverged between two snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MismatchKind {
    /// Different number of columns
    ColumnCount,

    /// Different column name at a position (0-indexed)
    ColumnName { position: usize },

    /// Same column, different declared type
    ColumnType { column: String },
}

impl std::fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ColumnCount => write!(f, "different column count"),
            Self::ColumnName { position } => write!(f, "different column at position {}", position + 1),
            Self::ColumnType { column } => write!(f, "different type for column '{}'", column),
        }
    }
}

/// Two versions of a table cannot be compared row by row
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("schema mismatch for table '{table}': {kind} (was {expected}, now {actual})")]
pub struct SchemaMismatch {
    /// Table name
    pub table: String,

    /// What diverged
    pub kind: MismatchKind,

    /// Value in the previous snapshot
    pub expected: String,

    /// Value in the current snapshot
    pub actual: String,
}

impl SchemaMismatch {
    /// Convert to a diagnostic located at `file`
    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        let code = match self.kind {
            MismatchKind::ColumnCount => DiagnosticCode::SchemaColumnCount,
            MismatchKind::ColumnName { .. } => DiagnosticCode::SchemaColumnName,
            MismatchKind::ColumnType { .. } => DiagnosticCode::SchemaColumnType,
        };

        Diagnostic::new(code, Severity::Error, self.to_string())
            .with_location(Location::table(file, &self.table))
            .with_comparison(&self.expected, &self.actual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Schema {
        Schema::from_columns(vec![
            Column::new("id", "INT"),
            Column::new("name", "VARCHAR(32)"),
        ])
    }

    #[test]
    fn identical_schemas_are_compatible() {
        assert!(users().check_compatible(&users(), "users").is_ok());
    }

    #[test]
    fn column_count_mismatch() {
        let mut current = users();
        current.columns.push(Column::new("email", "TEXT"));

        let err = current.check_compatible(&users(), "users").unwrap_err();
        assert_eq!(err.kind, MismatchKind::ColumnCount);
        assert_eq!(err.expected, "2");
        assert_eq!(err.actual, "3");
    }

    #[test]
    fn column_name_mismatch() {
        let mut current = users();
        current.columns[1].name = "full_name".to_string();

        let err = current.check_compatible(&users(), "users").unwrap_err();
        assert_eq!(err.kind, MismatchKind::ColumnName { position: 1 });
    }

    #[test]
    fn column_type_mismatch() {
        let mut current = users();
        current.columns[1].data_type = "TEXT".to_string();

        let err = current.check_compatible(&users(), "users").unwrap_err();
        assert_eq!(err.kind, MismatchKind::ColumnType { column: "name".to_string() });
        assert_eq!(err.to_string(), "schema mismatch for table 'users': different type for column 'name' (was VARCHAR(32), now TEXT)");

        let diag = err.to_diagnostic("dump-2.sql");
        assert_eq!(diag.code, DiagnosticCode::SchemaColumnType);
        assert_eq!(diag.severity, Severity::Error);
    }

    #[test]
    fn int_to_text_is_a_type_change() {
        let mut current = users();
        current.columns[0].data_type = "TEXT".to_string();

        let err = current.check_compatible(&users(), "users").unwrap_err();
        assert_eq!(err.kind, MismatchKind::ColumnType { column: "id".to_string() });
    }

    #[test]
    fn widening_keeps_schemas_compatible() {
        let mut current = users();
        current.columns[1].data_type = "VARCHAR(64)".to_string();
        assert!(current.check_compatible(&users(), "users").is_ok());

        let previous = Schema::from_columns(vec![Column::new("price", "DECIMAL(10,2)")]);
        let current = Schema::from_columns(vec![Column::new("price", "decimal(12, 4)")]);
        assert!(current.check_compatible(&previous, "items").is_ok());
    }

    #[test]
    fn column_names_compare_case_insensitively() {
        let mut current = users();
        current.columns[1].name = "Name".to_string();
        assert!(current.check_compatible(&users(), "users").is_ok());
    }

    #[test]
    fn base_types() {
        assert_eq!(Column::new("a", "VARCHAR(32)").base_type(), "VARCHAR");
        assert_eq!(Column::new("a", "INT(11) UNSIGNED").base_type(), "INT UNSIGNED");
        assert_eq!(Column::new("a", "ENUM('a)', 'b')").base_type(), "ENUM");
        assert_eq!(Column::new("a", "int").base_type(), "INT");
        assert_ne!(Column::new("a", "INT UNSIGNED").base_type(), Column::new("a", "INT").base_type());
    }

    #[test]
    fn position_is_case_insensitive() {
        assert_eq!(users().position("NAME"), Some(1));
        assert_eq!(users().position("missing"), None);
    }
}
