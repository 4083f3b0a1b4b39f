use crate::ast::Expr;

/// Complete dataview query.
///
/// ```text
/// TABLE file.link, metadata.status AS "Status" FROM #project WHERE metadata.open
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FullClause {
    /// View keyword as written (`TABLE`, `LIST`)
    pub view_type: String,

    /// Selected expressions, possibly empty for `LIST`
    pub select: SelectClause,

    /// Optional `FROM` source expression
    pub from: Option<FromExpr>,

    /// Optional `WHERE` condition
    pub condition: Option<Expr>,
}

/// Comma-separated select list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectClause {
    pub items: Vec<SelectItem>,
}

impl SelectClause {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// One selected expression with its optional `AS "alias"`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

/// Source expression of a `FROM` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum FromExpr {
    /// `#tag`
    Tag(String),

    /// `"some/path"`, segments as written
    Path(Vec<String>),

    /// `a AND b`
    And(Box<FromExpr>, Box<FromExpr>),

    /// `a OR b`
    Or(Box<FromExpr>, Box<FromExpr>),

    /// `NOT a`
    Not(Box<FromExpr>),
}
