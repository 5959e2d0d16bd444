//! dumpdelta core
//!
//! Domain model shared by every dumpdelta crate: literal values, table
//! schemas and row storage, primary-key projection, immutable snapshots,
//! configuration and the stable diagnostic/report types.
//! Never rename diagnostic codes - they are part of the public API.

pub mod config;
pub mod diagnostic;
pub mod key;
pub mod report;
pub mod schema;
pub mod snapshot;
pub mod table;
pub mod value;

pub use config::{Config, ConfigError, Dialect, MismatchPolicy, OutputConfig, TableFilter};
pub use diagnostic::{Diagnostic, DiagnosticCode, Location, Severity};
pub use key::{PrimaryKey, PrimaryKeyExtractor};
pub use report::{PairReport, Report, ReportSummary, ReportVersion, TableChangeSummary};
pub use schema::{Column, MismatchKind, Schema, SchemaMismatch};
pub use snapshot::{Snapshot, SnapshotError};
pub use table::{Row, RowGroup, RowSequencer, Table};
pub use value::Value;
