use crate::grammar::Precedence;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Comparison
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Membership (`IN`), sequence on the right
    In,
    /// Membership (`CONTAINS`), sequence on the left
    Contains,

    // Arithmetic
    /// Addition or concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,

    // Logical
    /// Logical AND (`AND`)
    And,
    /// Logical OR (`OR`)
    Or,
}

impl BinOp {
    pub fn precedence(self) -> Precedence {
        match self {
            BinOp::Or => Precedence::Or,
            BinOp::And => Precedence::And,
            BinOp::Equal
            | BinOp::NotEqual
            | BinOp::LessThan
            | BinOp::GreaterThan
            | BinOp::LessEqual
            | BinOp::GreaterEqual
            | BinOp::In
            | BinOp::Contains => Precedence::Comparison,
            BinOp::Add | BinOp::Subtract => Precedence::Sum,
            BinOp::Multiply | BinOp::Divide => Precedence::Product,
        }
    }

    /// Operator as written in query text.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::LessThan => "<",
            BinOp::GreaterThan => ">",
            BinOp::LessEqual => "<=",
            BinOp::GreaterEqual => ">=",
            BinOp::In => "IN",
            BinOp::Contains => "CONTAINS",
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::And => "AND",
            BinOp::Or => "OR",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical negation (`NOT`)
    Not,
    /// Arithmetic negation (`-`)
    Negate,
    /// Arithmetic identity (`+`)
    Plus,
}

impl UnaryOp {
    pub fn precedence(self) -> Precedence {
        match self {
            UnaryOp::Not => Precedence::Not,
            UnaryOp::Negate | UnaryOp::Plus => Precedence::Unary,
        }
    }
}
