//! SQL expression to core value conversion

use dumpdelta_core::{Row, Value};
use sqlparser::ast::{self, Expr, UnaryOperator};

/// Convert one `VALUES` tuple into a row
pub fn row_from_exprs(exprs: &[Expr]) -> Row {
    exprs.iter().map(value_from_expr).collect()
}

/// Convert a literal expression into a value
///
/// Anything that is not a plain literal (function calls, casts, ...) is
/// kept as its SQL text.
pub fn value_from_expr(expr: &Expr) -> Value {
    match expr {
        Expr::Value(value) => match value {
            ast::Value::Null => Value::Null,
            ast::Value::Boolean(b) => Value::Bool(*b),
            ast::Value::Number(n, _) => Value::Number(n.clone()),
            ast::Value::SingleQuotedString(s)
            | ast::Value::DoubleQuotedString(s)
            | ast::Value::EscapedStringLiteral(s)
            | ast::Value::NationalStringLiteral(s) => Value::Text(s.clone()),
            other => Value::Raw(other.to_string()),
        },
        Expr::UnaryOp { op: UnaryOperator::Minus, expr: inner } => match inner.as_ref() {
            Expr::Value(ast::Value::Number(n, _)) => Value::Number(format!("-{}", n)),
            _ => Value::Raw(expr.to_string()),
        },
        Expr::Nested(inner) => value_from_expr(inner),
        _ => Value::Raw(expr.to_string()),
    }
}
