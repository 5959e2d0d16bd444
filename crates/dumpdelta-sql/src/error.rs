//! Errors raised while reading a dump

use dumpdelta_core::{Diagnostic, DiagnosticCode, Location, Severity, SnapshotError};
use std::path::PathBuf;

use crate::parser::ParseError;

/// A dump could not be turned into a snapshot
///
/// Every variant means malformed input; none of them is transient.
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unexpected row container in INSERT for table '{table}': {found}")]
    UnknownRowContainer { table: String, found: String },

    #[error("no CREATE TABLE for '{table}'")]
    MissingCreateTable { table: String },

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("row {row} of table '{table}' has {actual} values, expected {expected}")]
    RowArity {
        table: String,
        row: usize,
        expected: usize,
        actual: usize,
    },
}

impl DumpError {
    /// Convert to a diagnostic located at `file`
    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        if let Self::Parse(parse_error) = self {
            return parse_error.to_diagnostic();
        }

        let (code, location) = match self {
            Self::Io { .. } => (DiagnosticCode::DumpIoError, Location::new(file)),
            Self::UnknownRowContainer { table, .. } => {
                (DiagnosticCode::DumpUnknownRowContainer, Location::table(file, table))
            }
            Self::MissingCreateTable { table } => {
                (DiagnosticCode::DumpMissingCreateTable, Location::table(file, table))
            }
            Self::Snapshot(SnapshotError::DuplicateTable(table)) => {
                (DiagnosticCode::DumpDuplicateTable, Location::table(file, table))
            }
            Self::RowArity { table, .. } => (DiagnosticCode::DumpRowArity, Location::table(file, table)),
            Self::Parse(_) => (DiagnosticCode::SqlParseError, Location::new(file)),
        };

        Diagnostic::new(code, Severity::Error, self.to_string()).with_location(location)
    }
}
