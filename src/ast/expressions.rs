use crate::ast::{BinOp, UnaryOp};

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Used for WHERE conditions, select-list items and inline `= expr` markers.
/// Keywords and punctuation are not kept; operators are carried by
/// [`BinOp`] and [`UnaryOp`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Literal floating point number
    ///
    /// # Example
    /// ```text
    /// 42.5
    /// ```
    Float(f64),

    /// Literal integer
    ///
    /// # Example
    /// ```text
    /// 42
    /// ```
    Integer(i64),

    /// String literal
    ///
    /// # Example
    /// ```text
    /// "hello"
    /// ```
    String(String),

    /// Boolean literal
    Boolean(bool),

    /// Null literal
    Null,

    // References
    /// Dotted path into the resolution context
    ///
    /// `quoted` records whether the path was written between backticks; it
    /// has no effect on lookup.
    ///
    /// # Examples
    /// ```text
    /// file.link               // path: ["file", "link"]
    /// `metadata.featureID`    // path: ["metadata", "featureID"], quoted
    /// ```
    Identifier { path: Vec<String>, quoted: bool },

    // Operations
    /// Binary operation (arithmetic, comparison, membership, logical)
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Unary operation (`NOT`, sign)
    UnaryOp { op: UnaryOp, operand: Box<Expr> },

    /// Built-in function call
    ///
    /// # Examples
    /// ```text
    /// sum(metadata.a, 2)
    /// link(file.path, "Home")
    /// ```
    FunctionCall { name: String, args: Vec<Expr> },

    // Object and Array Literals
    /// Object literal
    ///
    /// # Example
    /// ```text
    /// {key: 1, other: metadata.a}
    /// ```
    Object(Vec<(String, Expr)>),

    /// Array literal
    ///
    /// # Example
    /// ```text
    /// ["a", "b", metadata.c]
    /// ```
    Array(Vec<Expr>),
}

impl Expr {
    /// Builds an identifier from dotted text such as `file.link`.
    pub fn identifier(dotted: &str) -> Self {
        Expr::Identifier {
            path: dotted.split('.').map(str::to_string).collect(),
            quoted: false,
        }
    }
}
