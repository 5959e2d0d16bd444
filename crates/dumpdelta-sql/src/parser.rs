//! Dump parsing using datafusion-sqlparser-rs
//!
//! Parses dump text into the two statement kinds the differ cares about:
//! table definitions and insert blocks. Everything else a dump contains
//! (`SET`, `LOCK TABLES`, `DROP TABLE`, comments) is ignored.

use dumpdelta_core::{Column, Diagnostic, DiagnosticCode, Dialect, Location, Row, Severity};
use sqlparser::ast::{ColumnOption, CreateTable, Insert, ObjectName, SetExpr, Statement, TableConstraint};
use sqlparser::dialect::{self, GenericDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::{Parser, ParserError};

use crate::error::DumpError;
use crate::literal::row_from_exprs;

/// SQL dump parser with configurable dialect
pub struct DumpParser {
    dialect: Box<dyn dialect::Dialect>,
}

impl DumpParser {
    /// Create a parser for MySQL dumps
    pub fn mysql() -> Self {
        Self {
            dialect: Box::new(MySqlDialect {}),
        }
    }

    /// Create a parser for PostgreSQL dumps
    pub fn postgres() -> Self {
        Self {
            dialect: Box::new(PostgreSqlDialect {}),
        }
    }

    /// Create a parser with the generic dialect
    pub fn generic() -> Self {
        Self {
            dialect: Box::new(GenericDialect {}),
        }
    }

    /// Create a parser from a dialect config
    pub fn from_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::MySql => Self::mysql(),
            Dialect::Postgres => Self::postgres(),
            Dialect::Ansi => Self::generic(),
        }
    }

    /// Parse dump text into table definitions and insert blocks, in file order
    pub fn parse(&self, sql: &str, source_name: Option<&str>) -> Result<Vec<DumpStatement>, DumpError> {
        let statements = Parser::parse_sql(&*self.dialect, sql).map_err(|error| ParseError {
            error,
            source_name: source_name.map(str::to_string),
        })?;

        let mut parsed = Vec::new();
        for statement in statements {
            match statement {
                Statement::CreateTable(create) => {
                    parsed.push(DumpStatement::CreateTable(table_definition(&create)));
                }
                Statement::Insert(insert) => {
                    parsed.push(DumpStatement::Insert(insert_block(&insert)?));
                }
                _ => {}
            }
        }

        Ok(parsed)
    }
}

impl Default for DumpParser {
    fn default() -> Self {
        Self::mysql()
    }
}

/// A statement relevant to the differ
#[derive(Debug, Clone, PartialEq)]
pub enum DumpStatement {
    CreateTable(TableDefinition),
    Insert(InsertBlock),
}

/// A parsed `CREATE TABLE`
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    /// Unqualified table name
    pub name: String,

    /// Columns in declaration order
    pub columns: Vec<Column>,

    /// Primary-key column names in key order
    pub primary_key: Vec<String>,

    /// The statement as canonical SQL text
    pub text: String,
}

/// The rows of one `INSERT ... VALUES` statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertBlock {
    /// Unqualified table name
    pub table: String,

    /// Rows, in statement order
    pub rows: Vec<Row>,
}

fn table_definition(create: &CreateTable) -> TableDefinition {
    let columns = create
        .columns
        .iter()
        .map(|c| Column::new(c.name.value.clone(), c.data_type.to_string()))
        .collect();

    let mut primary_key: Vec<String> = Vec::new();
    for constraint in &create.constraints {
        if let TableConstraint::PrimaryKey { columns, .. } = constraint {
            primary_key.extend(columns.iter().map(|ident| ident.value.clone()));
        }
    }
    // inline `id INT PRIMARY KEY`
    for column in &create.columns {
        let inline_key = column
            .options
            .iter()
            .any(|def| matches!(def.option, ColumnOption::Unique { is_primary: true, .. }));
        if inline_key {
            primary_key.push(column.name.value.clone());
        }
    }

    TableDefinition {
        name: unqualified(&create.name),
        columns,
        primary_key,
        text: create.to_string(),
    }
}

fn insert_block(insert: &Insert) -> Result<InsertBlock, DumpError> {
    let table = unqualified(&insert.table_name);

    let values = match insert.source.as_deref().map(|query| query.body.as_ref()) {
        Some(SetExpr::Values(values)) => values,
        Some(other) => {
            return Err(DumpError::UnknownRowContainer {
                table,
                found: set_expr_kind(other).to_string(),
            });
        }
        None => {
            return Err(DumpError::UnknownRowContainer {
                table,
                found: "no row source".to_string(),
            });
        }
    };

    Ok(InsertBlock {
        table,
        rows: values.rows.iter().map(|exprs| row_from_exprs(exprs)).collect(),
    })
}

fn set_expr_kind(expr: &SetExpr) -> &'static str {
    match expr {
        SetExpr::Select(_) => "SELECT",
        SetExpr::Query(_) => "subquery",
        SetExpr::SetOperation { .. } => "set operation",
        SetExpr::Values(_) => "VALUES",
        SetExpr::Table(_) => "TABLE",
        _ => "statement",
    }
}

/// Last component of a possibly schema-qualified name
fn unqualified(name: &ObjectName) -> String {
    name.0
        .last()
        .map(|ident| ident.value.clone())
        .unwrap_or_else(|| name.to_string())
}

/// SQL parsing error with diagnostic information
#[derive(Debug)]
pub struct ParseError {
    /// Parser error from sqlparser
    pub error: ParserError,

    /// Dump the text came from, if known
    pub source_name: Option<String>,
}

impl ParseError {
    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::new(
            DiagnosticCode::SqlParseError,
            Severity::Error,
            format!("Failed to parse SQL: {}", self.error),
        );

        match &self.source_name {
            Some(name) => diag.with_location(Location::new(name)),
            None => diag,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source_name {
            Some(name) => write!(f, "SQL parse error in {}: {}", name, self.error),
            None => write!(f, "SQL parse error: {}", self.error),
        }
    }
}

impl std::error::Error for ParseError {}
