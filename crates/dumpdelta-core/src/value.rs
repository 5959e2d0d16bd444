//! Literal values and their canonical SQL text

use serde::{Deserialize, Serialize};
use crate::config::Dialect;

/// A single literal as it appeared in a dump's `INSERT` statement
///
/// Equality is structural: two values are equal only when they have the same
/// kind and the same textual payload. `1` and `1.0` are different values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Value {
    /// SQL NULL
    Null,

    /// Numeric literal, kept verbatim
    Number(String),

    /// Quoted string literal (unescaped contents)
    Text(String),

    /// TRUE / FALSE
    Bool(bool),

    /// Any other expression, kept as its SQL text
    Raw(String),
}

impl Value {
    pub fn number(text: impl Into<String>) -> Self {
        Self::Number(text.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Render this value as a SQL literal for the given dialect
    pub fn render(&self, dialect: Dialect) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Number(n) => n.clone(),
            Self::Bool(true) => "TRUE".to_string(),
            Self::Bool(false) => "FALSE".to_string(),
            Self::Text(s) => quote_string(s, dialect),
            Self::Raw(expr) => expr.clone(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render(Dialect::Ansi))
    }
}

/// Render a row as a parenthesized tuple: `(1, 'a', NULL)`
pub fn render_tuple<'v, I>(values: I, dialect: Dialect) -> String
where
    I: IntoIterator<Item = &'v Value>,
{
    let parts: Vec<String> = values.into_iter().map(|v| v.render(dialect)).collect();
    format!("({})", parts.join(", "))
}

/// Quote an identifier for inclusion in generated SQL
///
/// Identifiers are always quoted; an embedded quote character is doubled.
pub fn quote_ident(name: &str, dialect: Dialect) -> String {
    let quote = dialect.identifier_quote();
    let mut out = String::with_capacity(name.len() + 2);
    out.push(quote);
    for c in name.chars() {
        if c == quote {
            out.push(quote);
        }
        out.push(c);
    }
    out.push(quote);
    out
}

fn quote_string(s: &str, dialect: Dialect) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' if dialect.escapes_backslash() => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_rendering() {
        assert_eq!(Value::Null.render(Dialect::MySql), "NULL");
        assert_eq!(Value::number("-12.50").render(Dialect::MySql), "-12.50");
        assert_eq!(Value::Bool(false).render(Dialect::Ansi), "FALSE");
        assert_eq!(Value::text("it's").render(Dialect::Ansi), "'it''s'");
        assert_eq!(Value::Raw("NOW()".into()).to_string(), "NOW()");
    }

    #[test]
    fn backslash_escaping_is_dialect_specific() {
        let value = Value::text(r"C:\temp");
        assert_eq!(value.render(Dialect::MySql), r"'C:\\temp'");
        assert_eq!(value.render(Dialect::Postgres), r"'C:\temp'");
    }

    #[test]
    fn identifier_quoting() {
        assert_eq!(quote_ident("user", Dialect::MySql), "`user`");
        assert_eq!(quote_ident("odd`name", Dialect::MySql), "`odd``name`");
        assert_eq!(quote_ident("Order", Dialect::Postgres), "\"Order\"");
    }

    #[test]
    fn tuple_rendering() {
        let row = vec![Value::number("1"), Value::text("a"), Value::Null];
        assert_eq!(render_tuple(&row, Dialect::MySql), "(1, 'a', NULL)");
    }

    #[test]
    fn structural_equality() {
        assert_ne!(Value::number("1"), Value::number("1.0"));
        assert_ne!(Value::number("1"), Value::text("1"));
        assert_eq!(Value::text("x"), Value::text("x"));
    }

    #[test]
    fn value_serialization() {
        let json = serde_json::to_string(&Value::text("a")).unwrap();
        assert_eq!(json, r#"{"kind":"text","value":"a"}"#);
    }
}
