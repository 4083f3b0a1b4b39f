//! Lexical and syntactic structure of the dataview language.
//!
//! The parser in [`crate::parser`] is a recursive-descent implementation of
//! the following grammar. Keywords are case-insensitive, whitespace is
//! insignificant.
//!
//! ```text
//! full_clause   := VIEW_TYPE select_clause? ["FROM" from_expr] ["WHERE" expression]
//! select_clause := select_item ("," select_item)*
//! select_item   := expression ["AS" STRING]
//!
//! from_expr     := from_and ("OR" from_and)*
//! from_and      := from_not ("AND" from_not)*
//! from_not      := "NOT" from_not | from_atom
//! from_atom     := "#" IDENTIFIER | STRING | "(" from_expr ")"
//!
//! expression    := or
//! or            := and ("OR" and)*
//! and           := not ("AND" not)*
//! not           := "NOT" not | comparison
//! comparison    := sum [COMPARE_OP sum]
//! sum           := product (("+" | "-") product)*
//! product       := unary (("*" | "/") unary)*
//! unary         := ("-" | "+") unary | atom
//! atom          := literal | function_call | "(" expression ")" | list | object | IDENTIFIER
//!
//! function_call := NAME "(" [expression ("," expression)*] ")"
//! list          := "[" [expression ("," expression)*] "]"
//! object        := "{" [KEY ":" expression ("," KEY ":" expression)*] "}"
//! literal       := STRING | INTEGER | FLOAT | "true" | "false" | "null"
//!
//! COMPARE_OP    := "==" | "!=" | "<" | ">" | "<=" | ">=" | "IN" | "CONTAINS"
//! IDENTIFIER    := CNAME ("." CNAME)* | "`" CNAME ("." CNAME)* "`"
//! ```

use crate::ast::Token;

/// Entry points of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartSymbol {
    /// `TABLE ... [FROM ...] [WHERE ...]`
    FullClause,
    /// A single expression, used by inline `= expr` markers
    Expression,
    /// A bare select list
    SelectClause,
    /// `FROM <source>`
    FromClause,
}

/// Binding strength of operators, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Or,
    And,
    Not,
    Comparison,
    Sum,
    Product,
    Unary,
    Atom,
}

impl Precedence {
    /// The next stronger level; `Atom` is its own successor.
    pub fn tighter(self) -> Precedence {
        match self {
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Not,
            Precedence::Not => Precedence::Comparison,
            Precedence::Comparison => Precedence::Sum,
            Precedence::Sum => Precedence::Product,
            Precedence::Product => Precedence::Unary,
            Precedence::Unary | Precedence::Atom => Precedence::Atom,
        }
    }
}

/// Maps a bare word to its keyword token, if it is one.
///
/// Matching is case-insensitive: `and`, `And` and `AND` are the same keyword.
pub fn keyword(word: &str) -> Option<Token> {
    let token = match word.to_ascii_lowercase().as_str() {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "in" => Token::In,
        "contains" => Token::Contains,
        "from" => Token::From,
        "where" => Token::Where,
        "as" => Token::As,
        "true" => Token::Boolean(true),
        "false" => Token::Boolean(false),
        "null" => Token::Null,
        _ => return None,
    };
    Some(token)
}

/// Whether `c` may start a CNAME segment.
pub fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Whether `c` may continue a CNAME segment.
pub fn is_name_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(keyword("AND"), Some(Token::And));
        assert_eq!(keyword("Contains"), Some(Token::Contains));
        assert_eq!(keyword("TRUE"), Some(Token::Boolean(true)));
        assert_eq!(keyword("featureID"), None);
    }

    #[test]
    fn precedence_order() {
        assert!(Precedence::Or < Precedence::And);
        assert!(Precedence::And < Precedence::Not);
        assert!(Precedence::Not < Precedence::Comparison);
        assert!(Precedence::Comparison < Precedence::Sum);
        assert!(Precedence::Sum < Precedence::Product);
    }
}
