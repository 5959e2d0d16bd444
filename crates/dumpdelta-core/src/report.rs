//! Run report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use crate::diagnostic::{Diagnostic, Severity};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Row counts for one changed table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableChangeSummary {
    /// Table name
    pub table: String,

    /// Table only exists in the newer dump
    pub added: bool,

    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

/// Result of comparing one pair of dumps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairReport {
    /// Newer dump
    pub current: String,

    /// Older dump
    pub previous: String,

    /// Diff file written for this pair, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Changed tables, in definition order
    pub tables: Vec<TableChangeSummary>,
}

impl PairReport {
    pub fn has_changes(&self) -> bool {
        !self.tables.is_empty()
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of dump pairs compared
    pub pairs_compared: usize,

    /// Number of pairs with at least one change
    pub pairs_changed: usize,

    /// Tables only present in the newer dump of a pair
    pub tables_added: usize,

    /// Tables with row changes (added tables included)
    pub tables_changed: usize,

    pub rows_inserted: usize,
    pub rows_updated: usize,
    pub rows_deleted: usize,

    /// Number of errors
    pub errors: usize,

    /// Number of warnings
    pub warnings: usize,

    /// Number of info messages
    pub info: usize,
}

/// Run report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// One entry per compared pair, in processing order
    pub pairs: Vec<PairReport>,

    /// All diagnostics
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary: ReportSummary::default(),
            pairs: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Record the outcome of one pair
    pub fn add_pair(&mut self, pair: PairReport) {
        self.summary.pairs_compared += 1;
        if pair.has_changes() {
            self.summary.pairs_changed += 1;
        }

        for table in &pair.tables {
            self.summary.tables_changed += 1;
            if table.added {
                self.summary.tables_added += 1;
            }
            self.summary.rows_inserted += table.inserted;
            self.summary.rows_updated += table.updated;
            self.summary.rows_deleted += table.deleted;
        }

        self.pairs.push(pair);
    }

    /// Add a diagnostic to the report
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.summary.errors += 1,
            Severity::Warn => self.summary.warnings += 1,
            Severity::Info => self.summary.info += 1,
        }

        self.diagnostics.push(diagnostic);
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}
