use std::mem;

use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, FromExpr, FullClause, SelectClause, SelectItem, Span, Spanned, Token, UnaryOp},
    grammar::StartSymbol,
    lexer::{LexError, Lexer},
};

/// Longest excerpt of the query quoted back in a syntax error.
const FRAGMENT_LEN: usize = 40;

/// Query text that does not match the grammar.
///
/// `fragment` is the part of the query starting at the offending token.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Syntax error at position {position}: {message} (near `{fragment}`)")]
pub struct SyntaxError {
    pub message: String,
    pub position: usize,
    pub fragment: String,
}

pub type ParseError = SyntaxError;

/// Result of parsing with an explicit [`StartSymbol`].
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    FullClause(FullClause),
    Expression(Expr),
    SelectClause(SelectClause),
    FromClause(FromExpr),
}

pub struct Parser {
    lexer: Lexer,
    current: Spanned,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current = match lexer.next_spanned() {
            Ok(spanned) => spanned,
            Err(e) => return Err(lex_error(&lexer, e)),
        };
        Ok(Parser { lexer, current })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self
            .lexer
            .next_spanned()
            .map_err(|e| lex_error(&self.lexer, e))?;
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.error(format!(
                "expected {}, got {}",
                expected.describe(),
                self.current.token.describe()
            )));
        }
        self.advance()
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current.token) == mem::discriminant(token)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let position = self.current.span.start;
        SyntaxError {
            message: message.into(),
            position,
            fragment: fragment(&self.lexer.rest_from(position)),
        }
    }

    /// Takes the current token, leaving `Eof` in its place, and advances.
    fn take(&mut self) -> Result<(Token, Span), ParseError> {
        let token = mem::replace(&mut self.current.token, Token::Eof);
        let span = self.current.span;
        self.advance()?;
        Ok((token, span))
    }

    /// Parse with an explicit start symbol; the whole input must be consumed.
    pub fn parse_start(&mut self, start: StartSymbol) -> Result<Parsed, ParseError> {
        match start {
            StartSymbol::FullClause => self.parse_full_clause().map(Parsed::FullClause),
            StartSymbol::Expression => self.parse().map(Parsed::Expression),
            StartSymbol::SelectClause => self.parse_select().map(Parsed::SelectClause),
            StartSymbol::FromClause => self.parse_from_clause().map(Parsed::FromClause),
        }
    }

    /// Parse a single expression spanning the whole input
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        self.expect(Token::Eof)?;
        Ok(expr)
    }

    /// Parse a complete query: `VIEW select [FROM ...] [WHERE ...]`
    pub fn parse_full_clause(&mut self) -> Result<FullClause, ParseError> {
        let view_type = match &self.current.token {
            Token::Identifier(name) if !name.contains('.') => name.clone(),
            other => {
                return Err(self.error(format!(
                    "expected view type such as TABLE or LIST, got {}",
                    other.describe()
                )));
            }
        };
        self.advance()?;

        let select = self.parse_select_clause()?;

        let from = if self.check(&Token::From) {
            self.advance()?;
            Some(self.parse_from_expression()?)
        } else {
            None
        };

        let condition = if self.check(&Token::Where) {
            self.advance()?;
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect(Token::Eof)?;

        Ok(FullClause {
            view_type,
            select,
            from,
            condition,
        })
    }

    /// Parse a bare select list spanning the whole input
    pub fn parse_select(&mut self) -> Result<SelectClause, ParseError> {
        let select = self.parse_select_clause()?;
        self.expect(Token::Eof)?;
        Ok(select)
    }

    /// Parse `FROM <source>` spanning the whole input
    pub fn parse_from_clause(&mut self) -> Result<FromExpr, ParseError> {
        self.expect(Token::From)?;
        let from = self.parse_from_expression()?;
        self.expect(Token::Eof)?;
        Ok(from)
    }

    fn at_select_end(&self) -> bool {
        matches!(self.current.token, Token::From | Token::Where | Token::Eof)
    }

    fn parse_select_clause(&mut self) -> Result<SelectClause, ParseError> {
        let mut items = vec![];

        if self.at_select_end() {
            return Ok(SelectClause { items });
        }

        loop {
            let expr = self.parse_expression()?;

            let alias = if self.check(&Token::As) {
                self.advance()?;
                match self.take()? {
                    (Token::String(alias), _) => Some(alias),
                    (other, span) => {
                        return Err(SyntaxError {
                            message: format!("expected quoted alias after AS, got {}", other.describe()),
                            position: span.start,
                            fragment: fragment(&self.lexer.rest_from(span.start)),
                        });
                    }
                }
            } else {
                None
            };

            items.push(SelectItem { expr, alias });

            if self.check(&Token::Comma) {
                self.advance()?;
            } else {
                break;
            }
        }

        Ok(SelectClause { items })
    }

    fn parse_from_expression(&mut self) -> Result<FromExpr, ParseError> {
        let mut left = self.parse_from_and()?;

        while self.check(&Token::Or) {
            self.advance()?;
            let right = self.parse_from_and()?;
            left = FromExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_from_and(&mut self) -> Result<FromExpr, ParseError> {
        let mut left = self.parse_from_not()?;

        while self.check(&Token::And) {
            self.advance()?;
            let right = self.parse_from_not()?;
            left = FromExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_from_not(&mut self) -> Result<FromExpr, ParseError> {
        if self.check(&Token::Not) {
            self.advance()?;
            let operand = self.parse_from_not()?;
            return Ok(FromExpr::Not(Box::new(operand)));
        }
        self.parse_from_atom()
    }

    fn parse_from_atom(&mut self) -> Result<FromExpr, ParseError> {
        match &self.current.token {
            Token::Hash => {
                self.advance()?;
                match &self.current.token {
                    Token::Identifier(name) | Token::QuotedIdentifier(name) => {
                        let name = name.clone();
                        self.advance()?;
                        Ok(FromExpr::Tag(name))
                    }
                    other => Err(self.error(format!("expected tag name after '#', got {}", other.describe()))),
                }
            }
            Token::String(path) => {
                let segments: Vec<String> = path
                    .split('/')
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
                    .collect();
                if segments.is_empty() {
                    return Err(self.error("empty path in FROM clause"));
                }
                self.advance()?;
                Ok(FromExpr::Path(segments))
            }
            Token::LParen => {
                self.advance()?;
                let inner = self.parse_from_expression()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            other => Err(self.error(format!(
                "expected #tag or \"path\" in FROM clause, got {}",
                other.describe()
            ))),
        }
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;

        while self.check(&Token::Or) {
            self.advance()?;
            let right = self.parse_and()?;

            left = Expr::BinaryOp {
                op: BinOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;

        while self.check(&Token::And) {
            self.advance()?;
            let right = self.parse_not()?;

            left = Expr::BinaryOp {
                op: BinOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.check(&Token::Not) {
            self.advance()?;
            let operand = self.parse_not()?;
            return Ok(Expr::UnaryOp {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        if let Some(op) = match &self.current.token {
            Token::EqEq => Some(BinOp::Equal),
            Token::NotEq => Some(BinOp::NotEqual),
            Token::Lt => Some(BinOp::LessThan),
            Token::Gt => Some(BinOp::GreaterThan),
            Token::LtEq => Some(BinOp::LessEqual),
            Token::GtEq => Some(BinOp::GreaterEqual),
            Token::In => Some(BinOp::In),
            Token::Contains => Some(BinOp::Contains),
            _ => None,
        } {
            self.advance()?;
            let right = self.parse_additive()?;

            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match &self.current.token {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Subtract,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_multiplicative()?;

            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match &self.current.token {
                Token::Star => BinOp::Multiply,
                Token::Slash => BinOp::Divide,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_unary()?;

            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// Sign prefixes; signed numeric literals fold into the literal.
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match &self.current.token {
            Token::Minus => UnaryOp::Negate,
            Token::Plus => UnaryOp::Plus,
            _ => return self.parse_primary(),
        };
        self.advance()?;
        let operand = self.parse_unary()?;

        let folded = match (op, operand) {
            (UnaryOp::Negate, Expr::Integer(n)) => Expr::Integer(-n),
            (UnaryOp::Negate, Expr::Float(n)) => Expr::Float(-n),
            (UnaryOp::Plus, number @ (Expr::Integer(_) | Expr::Float(_))) => number,
            (op, operand) => Expr::UnaryOp {
                op,
                operand: Box::new(operand),
            },
        };
        Ok(folded)
    }

    /// Parse primary expressions (atoms): literals, identifiers, calls,
    /// parenthesized expressions, list and object literals
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.span.start;
        let (token, _) = self.take()?;

        match token {
            // Literals
            Token::Float(n) => Ok(Expr::Float(n)),
            Token::Integer(n) => Ok(Expr::Integer(n)),
            Token::String(s) => Ok(Expr::String(s)),
            Token::Boolean(b) => Ok(Expr::Boolean(b)),
            Token::Null => Ok(Expr::Null),

            // References and calls
            Token::Identifier(name) => {
                if self.check(&Token::LParen) {
                    self.advance()?;
                    let args = self.parse_arguments()?;
                    Ok(Expr::FunctionCall { name, args })
                } else {
                    Ok(Expr::Identifier {
                        path: name.split('.').map(str::to_string).collect(),
                        quoted: false,
                    })
                }
            }
            Token::QuotedIdentifier(name) => Ok(Expr::Identifier {
                path: name.split('.').map(str::to_string).collect(),
                quoted: true,
            }),

            Token::LParen => {
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }

            // Array literals
            Token::LBracket => self.parse_array_literal(),
            // Object literals
            Token::LBrace => self.parse_object_literal(),

            token => Err(SyntaxError {
                message: format!("unexpected {} in expression", token.describe()),
                position: start,
                fragment: fragment(&self.lexer.rest_from(start)),
            }),
        }
    }

    /// Arguments after the opening parenthesis of a call, through `)`.
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = vec![];

        while !self.check(&Token::RParen) {
            args.push(self.parse_expression()?);

            if !self.check(&Token::RParen) {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::RParen)?;
        Ok(args)
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let mut elements = vec![];

        while !self.check(&Token::RBracket) {
            elements.push(self.parse_expression()?);

            if !self.check(&Token::RBracket) {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::RBracket)?;
        Ok(Expr::Array(elements))
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let mut pairs = vec![];

        while !self.check(&Token::RBrace) {
            let key = match &self.current.token {
                Token::Identifier(s) if !s.contains('.') => s.clone(),
                Token::String(s) => s.clone(),
                other => {
                    return Err(self.error(format!("expected object key, got {}", other.describe())));
                }
            };

            self.advance()?;

            self.expect(Token::Colon)?;

            let value = self.parse_expression()?;
            pairs.push((key, value));

            if !self.check(&Token::RBrace) {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::RBrace)?;
        Ok(Expr::Object(pairs))
    }
}

fn lex_error(lexer: &Lexer, error: LexError) -> SyntaxError {
    let position = error.position();
    SyntaxError {
        message: error.to_string(),
        position,
        fragment: fragment(&lexer.rest_from(position)),
    }
}

fn fragment(rest: &str) -> String {
    let trimmed = rest.trim_end();
    if trimmed.chars().count() > FRAGMENT_LEN {
        let mut cut: String = trimmed.chars().take(FRAGMENT_LEN).collect();
        cut.push_str("...");
        cut
    } else {
        trimmed.to_string()
    }
}

/// Parse a complete query such as `TABLE file.link FROM #tag`.
pub fn parse_query(text: &str) -> Result<FullClause, ParseError> {
    Parser::new(Lexer::new(text))?.parse_full_clause()
}

/// Parse a standalone expression such as `metadata.a + 1`.
pub fn parse_expression(text: &str) -> Result<Expr, ParseError> {
    Parser::new(Lexer::new(text))?.parse()
}
