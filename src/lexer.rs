use thiserror::Error;

use crate::ast::{Span, Spanned, Token};
use crate::grammar::{is_name_continue, is_name_start, keyword};

/// Errors raised while splitting query text into tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("Unexpected '{ch}' at position {position} (did you mean '{suggestion}'?)")]
    IncompleteOperator {
        ch: char,
        position: usize,
        suggestion: &'static str,
    },

    #[error("Unterminated string starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("Invalid escape sequence '\\{ch}' at position {position}")]
    InvalidEscape { ch: char, position: usize },

    #[error("Unterminated quoted identifier starting at position {position}")]
    UnterminatedIdentifier { position: usize },

    #[error("Invalid quoted identifier `{text}` at position {position}")]
    InvalidQuotedIdentifier { text: String, position: usize },

    #[error("Invalid number '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },
}

impl LexError {
    /// Character offset the error points at.
    pub fn position(&self) -> usize {
        match self {
            LexError::UnexpectedChar { position, .. }
            | LexError::IncompleteOperator { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::InvalidEscape { position, .. }
            | LexError::UnterminatedIdentifier { position }
            | LexError::InvalidQuotedIdentifier { position, .. }
            | LexError::InvalidNumber { position, .. } => *position,
        }
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Source text covered by `span`.
    pub fn slice(&self, span: Span) -> String {
        let end = span.end.min(self.input.len());
        let start = span.start.min(end);
        self.input[start..end].iter().collect()
    }

    /// Source text from `start` to the end of input.
    pub fn rest_from(&self, start: usize) -> String {
        self.slice(Span::new(start, self.input.len()))
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_name(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if is_name_continue(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Reads `name(.name)*`; dots are only consumed when a name follows.
    fn read_dotted_name(&mut self) -> String {
        let mut result = self.read_name();
        while self.current_char() == Some('.') && self.peek_char(1).is_some_and(is_name_start) {
            self.advance();
            result.push('.');
            result.push_str(&self.read_name());
        }
        result
    }

    fn read_quoted_identifier(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        self.advance(); // opening backtick

        let mut text = String::new();
        loop {
            match self.current_char() {
                Some('`') => {
                    self.advance();
                    break;
                }
                Some(ch) => {
                    text.push(ch);
                    self.advance();
                }
                None => return Err(LexError::UnterminatedIdentifier { position: start }),
            }
        }

        let valid = !text.is_empty()
            && text.split('.').all(|segment| {
                let mut chars = segment.chars();
                chars.next().is_some_and(is_name_start) && chars.all(is_name_continue)
            });

        if !valid {
            return Err(LexError::InvalidQuotedIdentifier {
                text,
                position: start,
            });
        }

        Ok(Token::QuotedIdentifier(text))
    }

    fn read_string(&mut self) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('"') => result.push('"'),
                        Some('\\') => result.push('\\'),
                        Some('/') => result.push('/'),
                        Some(ch) => {
                            return Err(LexError::InvalidEscape {
                                ch,
                                position: self.position - 1,
                            });
                        }
                        None => return Err(LexError::UnterminatedString { position: start }),
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { position: start })
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut number = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.' && !is_float && self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Exponent: 1e5, 2.5E-3
        if matches!(self.current_char(), Some('e' | 'E')) {
            let digits_at = match self.peek_char(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self.peek_char(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                for _ in 0..digits_at {
                    if let Some(ch) = self.current_char() {
                        number.push(ch);
                    }
                    self.advance();
                }
                while let Some(ch) = self.current_char() {
                    if ch.is_ascii_digit() {
                        number.push(ch);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }

        let invalid = || LexError::InvalidNumber {
            text: number.clone(),
            position: start,
        };

        if is_float {
            number.parse::<f64>().map(Token::Float).map_err(|_| invalid())
        } else {
            number.parse::<i64>().map(Token::Integer).map_err(|_| invalid())
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn pair_or(&mut self, second: char, paired: Token, single: Token) -> Token {
        if self.peek_char(1) == Some(second) {
            self.advance();
            self.advance();
            paired
        } else {
            self.advance();
            single
        }
    }

    /// Reads the next token together with its source span.
    pub fn next_spanned(&mut self) -> Result<Spanned, LexError> {
        self.skip_whitespace();
        let start = self.position;
        let token = self.read_token()?;
        Ok(Spanned {
            token,
            span: Span::new(start, self.position),
        })
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.next_spanned().map(|spanned| spanned.token)
    }

    fn read_token(&mut self) -> Result<Token, LexError> {
        let token = match self.current_char() {
            None => Token::Eof,
            Some(',') => self.single(Token::Comma),
            Some(':') => self.single(Token::Colon),
            Some('+') => self.single(Token::Plus),
            Some('-') => self.single(Token::Minus),
            Some('*') => self.single(Token::Star),
            Some('/') => self.single(Token::Slash),
            Some('#') => self.single(Token::Hash),
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some('[') => self.single(Token::LBracket),
            Some(']') => self.single(Token::RBracket),
            Some('{') => self.single(Token::LBrace),
            Some('}') => self.single(Token::RBrace),
            Some('>') => self.pair_or('=', Token::GtEq, Token::Gt),
            Some('<') => self.pair_or('=', Token::LtEq, Token::Lt),
            Some('=') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::EqEq
                } else {
                    return Err(LexError::IncompleteOperator {
                        ch: '=',
                        position: self.position,
                        suggestion: "==",
                    });
                }
            }
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::NotEq
                } else {
                    return Err(LexError::IncompleteOperator {
                        ch: '!',
                        position: self.position,
                        suggestion: "!=",
                    });
                }
            }
            Some('"') => Token::String(self.read_string()?),
            Some('`') => self.read_quoted_identifier()?,
            Some(ch) if is_name_start(ch) => {
                let name = self.read_dotted_name();
                if name.contains('.') {
                    Token::Identifier(name)
                } else {
                    keyword(&name).unwrap_or(Token::Identifier(name))
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(ch) => {
                return Err(LexError::UnexpectedChar {
                    ch,
                    position: self.position,
                });
            }
        };
        Ok(token)
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("and OR Not in CONTAINS true False NULL");
    assert_eq!(lexer.next_token().unwrap(), Token::And);
    assert_eq!(lexer.next_token().unwrap(), Token::Or);
    assert_eq!(lexer.next_token().unwrap(), Token::Not);
    assert_eq!(lexer.next_token().unwrap(), Token::In);
    assert_eq!(lexer.next_token().unwrap(), Token::Contains);
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(true));
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(false));
    assert_eq!(lexer.next_token().unwrap(), Token::Null);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_where_clause_tokens() {
    let mut lexer = Lexer::new("WHERE metadata.a + 2 >= 10");
    assert_eq!(lexer.next_token().unwrap(), Token::Where);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("metadata.a".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Plus);
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(2));
    assert_eq!(lexer.next_token().unwrap(), Token::GtEq);
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(10));
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_spans() {
    let mut lexer = Lexer::new("  file.link AS \"x\"");
    let ident = lexer.next_spanned().unwrap();
    assert_eq!(ident.span, Span::new(2, 11));
    assert_eq!(lexer.slice(ident.span), "file.link");
    let alias = lexer.next_spanned().unwrap();
    assert_eq!(alias.token, Token::As);
    let string = lexer.next_spanned().unwrap();
    assert_eq!(lexer.slice(string.span), "\"x\"");
}
