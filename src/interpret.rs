//! Read-only walks over a parsed query: view type, source filter, column names.

use std::fmt;

use crate::{
    ast::{Expr, FromExpr, FullClause, SelectClause, UnaryOp},
    grammar::{Precedence, is_name_continue, is_name_start, keyword},
    query::QueryError,
};

/// One conjunct of a `FROM` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Document must list the tag in `metadata.tags`
    Tag(String),
    /// `file.path` must start with this prefix
    Path(String),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Tag(tag) => write!(f, "#{}", tag),
            Source::Path(path) => write!(f, "\"{}\"", path),
        }
    }
}

/// The view keyword exactly as written in the query.
pub fn view_type(clause: &FullClause) -> &str {
    &clause.view_type
}

/// Flattens the `FROM` clause into an ordered conjunction.
///
/// Only `AND` can be expressed as a list of filters; `OR` and `NOT` are
/// rejected.
pub fn sources(clause: &FullClause) -> Result<Vec<Source>, QueryError> {
    let mut out = vec![];
    if let Some(from) = &clause.from {
        collect_sources(from, &mut out)?;
    }
    Ok(out)
}

fn collect_sources(from: &FromExpr, out: &mut Vec<Source>) -> Result<(), QueryError> {
    match from {
        FromExpr::Tag(tag) => out.push(Source::Tag(tag.clone())),
        FromExpr::Path(segments) => out.push(Source::Path(segments.join("/"))),
        FromExpr::And(left, right) => {
            collect_sources(left, out)?;
            collect_sources(right, out)?;
        }
        FromExpr::Or(..) => {
            return Err(QueryError::UnsupportedSource("OR".to_string()));
        }
        FromExpr::Not(_) => {
            return Err(QueryError::UnsupportedSource("NOT".to_string()));
        }
    }
    Ok(())
}

/// Header text per select item: the alias, or the expression as written.
pub fn column_names(select: &SelectClause) -> Vec<String> {
    select
        .items
        .iter()
        .map(|item| match &item.alias {
            Some(alias) => alias.clone(),
            None => item.expr.to_string(),
        })
        .collect()
}

fn precedence(expr: &Expr) -> Precedence {
    match expr {
        Expr::BinaryOp { op, .. } => op.precedence(),
        Expr::UnaryOp { op, .. } => op.precedence(),
        Expr::Integer(n) if *n < 0 => Precedence::Unary,
        Expr::Float(n) if n.is_sign_negative() => Precedence::Unary,
        _ => Precedence::Atom,
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, min: Precedence) -> fmt::Result {
    if precedence(expr) < min {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in s.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            ch => write!(f, "{}", ch)?,
        }
    }
    f.write_str("\"")
}

fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars.next().is_some_and(is_name_start) && chars.all(is_name_continue) && keyword(key).is_none()
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Normalized query text for an expression.
///
/// Operators are separated by single spaces and parentheses appear only where
/// precedence requires them, so `a+b` and `(a + b)` both print as `a + b`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Float(n) => write!(f, "{:?}", n),
            Expr::Integer(n) => write!(f, "{}", n),
            Expr::String(s) => write_quoted(f, s),
            Expr::Boolean(b) => write!(f, "{}", b),
            Expr::Null => f.write_str("null"),
            Expr::Identifier { path, quoted } => {
                if *quoted {
                    write!(f, "`{}`", path.join("."))
                } else {
                    f.write_str(&path.join("."))
                }
            }
            Expr::BinaryOp { op, left, right } => {
                let level = op.precedence();
                // Comparisons do not chain, so neither side may be a comparison
                let left_min = if level == Precedence::Comparison {
                    level.tighter()
                } else {
                    level
                };
                write_operand(f, left, left_min)?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, right, level.tighter())
            }
            Expr::UnaryOp { op, operand } => {
                let symbol = match op {
                    UnaryOp::Not => "NOT ",
                    UnaryOp::Negate => "-",
                    UnaryOp::Plus => "+",
                };
                f.write_str(symbol)?;
                write_operand(f, operand, op.precedence())
            }
            Expr::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                write_list(f, args)?;
                f.write_str(")")
            }
            Expr::Array(items) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
            Expr::Object(pairs) => {
                f.write_str("{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if is_bare_key(key) {
                        f.write_str(key)?;
                    } else {
                        write_quoted(f, key)?;
                    }
                    write!(f, ": {}", value)?;
                }
                f.write_str("}")
            }
        }
    }
}
