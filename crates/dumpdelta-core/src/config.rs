//! Configuration schema (dumpdelta.toml)

use serde::{Deserialize, Serialize};

/// SQL dialect of the dumps, used both for parsing and for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// MySQL / MariaDB (mysqldump output)
    #[default]
    MySql,

    /// PostgreSQL (pg_dump --inserts output)
    Postgres,

    /// Generic ANSI SQL
    Ansi,
}

impl Dialect {
    /// Character used to quote identifiers
    pub fn identifier_quote(self) -> char {
        match self {
            Self::MySql => '`',
            Self::Postgres | Self::Ansi => '"',
        }
    }

    /// Whether backslash is an escape character inside string literals
    pub fn escapes_backslash(self) -> bool {
        matches!(self, Self::MySql)
    }
}

impl std::str::FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "ansi" | "generic" => Ok(Self::Ansi),
            other => Err(ConfigError::ParseError(format!("unknown dialect '{}'", other))),
        }
    }
}

/// What to do when two versions of a table have incompatible schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchPolicy {
    /// Skip that table, keep comparing the others, fail the run at the end
    #[default]
    SkipTable,

    /// Stop the comparison at the first mismatch
    Abort,
}

/// Where and how diff files are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Suffix appended to the current dump's name (after stripping a
    /// compression suffix)
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Write diffs to stdout instead of files
    #[serde(default)]
    pub stdout: bool,

    /// Sort input names and process them in reverse order
    #[serde(default)]
    pub sort_inputs: bool,
}

fn default_suffix() -> String {
    ".diff".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            stdout: false,
            sort_inputs: false,
        }
    }
}

/// Tables excluded from comparison
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableFilter {
    /// Table names or glob patterns (`*` wildcard)
    #[serde(default)]
    pub skip: Vec<String>,
}

impl TableFilter {
    /// Check if a table should be skipped
    pub fn is_skipped(&self, table: &str) -> bool {
        self.skip.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, table)
            } else {
                pattern == table
            }
        })
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// SQL dialect
    #[serde(default)]
    pub dialect: Dialect,

    /// Schema mismatch handling
    #[serde(default)]
    pub on_schema_mismatch: MismatchPolicy,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Table exclusions
    #[serde(default)]
    pub tables: TableFilter,
}

impl Config {
    /// Default config file name, looked up in the working directory
    pub const FILE_NAME: &'static str = "dumpdelta.toml";

    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Glob matching with any number of `*` wildcards
fn glob_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or_default();
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };

    let parts: Vec<&str> = parts.collect();
    let Some((last, middle)) = parts.split_last() else {
        // no wildcard at all
        return rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }

    rest.len() >= last.len() && rest.ends_with(last)
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
