/// Position of a token in the query text, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

/// A token together with the span of source text it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Floating-point number
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 1e3
    /// ```
    Float(f64),

    /// Integer
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0
    /// ```
    Integer(i64),

    /// String literal enclosed in double quotes, escapes already resolved
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// "examples/library"
    /// ```
    String(String),

    /// Boolean values, case-insensitive
    ///
    /// # Examples
    /// ```text
    /// true
    /// False
    /// ```
    Boolean(bool),

    /// Null value, case-insensitive
    Null,

    // Identifiers
    /// Dotted identifier path
    ///
    /// Also used for the view type (`TABLE`, `LIST`), function names and
    /// object keys; the parser decides from position.
    ///
    /// # Examples
    /// ```text
    /// file.link
    /// metadata.tags
    /// sum
    /// ```
    Identifier(String),

    /// Backtick-quoted identifier path, backticks stripped
    ///
    /// # Examples
    /// ```text
    /// `metadata.featureID`
    /// `in`
    /// ```
    QuotedIdentifier(String),

    // Keywords (case-insensitive)
    /// `AND`
    And,
    /// `OR`
    Or,
    /// `NOT`
    Not,
    /// `IN`
    In,
    /// `CONTAINS`
    Contains,
    /// `FROM`
    From,
    /// `WHERE`
    Where,
    /// `AS`
    As,

    // Comparison
    /// Equality operator
    EqEq,

    /// Inequality operator
    NotEq,

    /// Less than
    Lt,

    /// Greater than
    Gt,

    /// Less than or equal
    LtEq,

    /// Greater than or equal
    GtEq,

    // Arithmetic
    /// Addition or string concatenation
    Plus,

    /// Subtraction or negation
    Minus,

    /// Multiplication
    Star,

    /// Division
    Slash,

    // Delimiters
    /// Tag prefix in FROM clauses
    ///
    /// # Examples
    /// ```text
    /// FROM #project
    /// ```
    Hash,

    /// Left bracket for list literals
    LBracket,

    /// Right bracket
    RBracket,

    /// Left parenthesis for grouping or function calls
    LParen,

    /// Right parenthesis
    RParen,

    /// Left brace for object literals
    LBrace,

    /// Right brace
    RBrace,

    /// Comma for separating arguments, list elements and select items
    Comma,

    /// Colon for object literal key-value pairs
    Colon,

    /// End of input
    Eof,
}

impl Token {
    /// Short human-readable description used in syntax errors.
    pub fn describe(&self) -> String {
        match self {
            Token::Float(n) => format!("number {}", n),
            Token::Integer(n) => format!("number {}", n),
            Token::String(s) => format!("string \"{}\"", s),
            Token::Boolean(b) => format!("boolean {}", b),
            Token::Null => "null".to_string(),
            Token::Identifier(name) => format!("identifier '{}'", name),
            Token::QuotedIdentifier(name) => format!("identifier `{}`", name),
            Token::And => "AND".to_string(),
            Token::Or => "OR".to_string(),
            Token::Not => "NOT".to_string(),
            Token::In => "IN".to_string(),
            Token::Contains => "CONTAINS".to_string(),
            Token::From => "FROM".to_string(),
            Token::Where => "WHERE".to_string(),
            Token::As => "AS".to_string(),
            Token::EqEq => "'=='".to_string(),
            Token::NotEq => "'!='".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::LtEq => "'<='".to_string(),
            Token::GtEq => "'>='".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Hash => "'#'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}
