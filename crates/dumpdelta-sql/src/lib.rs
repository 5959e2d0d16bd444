//! SQL dump reading
//!
//! This crate handles:
//! - Opening dump files, with transparent gzip/bzip2 decompression
//! - Parsing dump text into CREATE TABLE / INSERT statements
//! - Converting SQL literals into core values
//! - Building an immutable snapshot in two phases (definitions, then rows)

pub mod builder;
pub mod error;
pub mod literal;
pub mod parser;
pub mod source;

pub use builder::SnapshotBuilder;
pub use error::DumpError;
pub use parser::{DumpParser, DumpStatement, InsertBlock, ParseError, TableDefinition};
pub use source::{Compression, read_dump};

use dumpdelta_core::Snapshot;
use std::path::Path;

/// Read, parse and build the snapshot stored in `path`
///
/// The snapshot is labelled with the file name.
pub fn load_snapshot(path: &Path, parser: &DumpParser) -> Result<Snapshot, DumpError> {
    let label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let text = read_dump(path)?;
    let statements = parser.parse(&text, Some(&label))?;
    tracing::debug!(file = %label, statements = statements.len(), "parsed dump");

    let mut builder = SnapshotBuilder::new(label);
    builder.extend(statements);
    builder.build()
}
