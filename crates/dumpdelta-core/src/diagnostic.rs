//! Diagnostic codes and error reporting
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    /// Two versions of a table have a different number of columns
    SchemaColumnCount,

    /// Two versions of a table have different column names
    SchemaColumnName,

    /// A column's declared type changed between versions
    SchemaColumnType,

    /// Table only exists in the newer snapshot
    TableAdded,

    /// Table declares no primary key; whole rows are used as identity
    TableNoPrimaryKey,

    /// Failed to parse SQL
    SqlParseError,

    /// An INSERT does not carry a plain VALUES block
    DumpUnknownRowContainer,

    /// An INSERT references a table without CREATE TABLE
    DumpMissingCreateTable,

    /// A table is defined twice in one dump
    DumpDuplicateTable,

    /// A row has the wrong number of values
    DumpRowArity,

    /// A dump file could not be read
    DumpIoError,

    /// The diff file already exists
    OutputCollision,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SchemaColumnCount => "SCHEMA_COLUMN_COUNT",
            Self::SchemaColumnName => "SCHEMA_COLUMN_NAME",
            Self::SchemaColumnType => "SCHEMA_COLUMN_TYPE",
            Self::TableAdded => "TABLE_ADDED",
            Self::TableNoPrimaryKey => "TABLE_NO_PRIMARY_KEY",
            Self::SqlParseError => "SQL_PARSE_ERROR",
            Self::DumpUnknownRowContainer => "DUMP_UNKNOWN_ROW_CONTAINER",
            Self::DumpMissingCreateTable => "DUMP_MISSING_CREATE_TABLE",
            Self::DumpDuplicateTable => "DUMP_DUPLICATE_TABLE",
            Self::DumpRowArity => "DUMP_ROW_ARITY",
            Self::DumpIoError => "DUMP_IO_ERROR",
            Self::OutputCollision => "OUTPUT_COLLISION",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - should be reviewed but not blocking
    Warn,

    /// Error - the run exits with a failure status
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Where a diagnostic applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Dump file name
    pub file: String,

    /// Table within the dump, if the diagnostic is table-specific
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

impl Location {
    /// Create a new location with just a file name
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            table: None,
        }
    }

    /// Create a location pointing at a table of a dump
    pub fn table(file: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            table: Some(table.into()),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{} ({})", self.file, table),
            None => write!(f, "{}", self.file),
        }
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Source location (best-effort)
    pub location: Option<Location>,

    /// Expected value (for comparison diagnostics)
    pub expected: Option<String>,

    /// Actual value (for comparison diagnostics)
    pub actual: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            location: None,
            expected: None,
            actual: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set expected/actual values
    pub fn with_comparison(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }
}
