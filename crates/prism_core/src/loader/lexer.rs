//! Tokenizer for `.ray` scene files.
//!
//! Tokens are whitespace separated. `#` starts a comment that runs to the
//! end of the line, strings are double quoted, `[` and `]` delimit number
//! arrays, and any other word is either a number or a bare command name.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use thiserror::Error;

/// Errors that can occur while reading scene file syntax.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Unexpected end of file")]
    UnexpectedEof,

    #[error("Unknown command '{name}' at line {line}")]
    UnknownCommand { line: usize, name: String },

    #[error("Unknown container '{0}', expected \"BVH\" or \"Naive\"")]
    UnknownContainer(String),

    #[error("PopMatrix at line {line} popped the last transform off the stack")]
    TransformStackUnderflow { line: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Named lists of numbers, e.g. `"emission" [1 1 1] "radius" 0.5`.
pub type ParamList = HashMap<String, Vec<f64>>;

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    String(String),
    Number(f64),
    Name(String),
    ArrayBegin,
    ArrayEnd,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::String(s) => write!(f, "STRING:\"{}\"", s),
            TokenKind::Number(n) => write!(f, "NUMBER:{}", n),
            TokenKind::Name(n) => write!(f, "NAME:{}", n),
            TokenKind::ArrayBegin => write!(f, "ARRAY_BEGIN"),
            TokenKind::ArrayEnd => write!(f, "ARRAY_END"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

/// A token and the (1-based) line it starts on.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

/// Scene file tokenizer with typed accessors for the parser.
pub struct Lexer {
    tokens: VecDeque<Token>,
    eof_line: usize,
}

impl Lexer {
    /// Tokenize `source` up front.
    pub fn new(source: &str) -> ParseResult<Self> {
        let mut tokens = VecDeque::new();
        let mut chars = source.chars().peekable();
        let mut line = 1;

        while let Some(&c) = chars.peek() {
            match c {
                '\n' => {
                    line += 1;
                    chars.next();
                }
                c if c.is_whitespace() => {
                    chars.next();
                }
                '#' => {
                    while chars.next_if(|&c| c != '\n').is_some() {}
                }
                '[' => {
                    chars.next();
                    tokens.push_back(Token {
                        kind: TokenKind::ArrayBegin,
                        line,
                    });
                }
                ']' => {
                    chars.next();
                    tokens.push_back(Token {
                        kind: TokenKind::ArrayEnd,
                        line,
                    });
                }
                '"' => {
                    chars.next();
                    let start = line;
                    let mut value = String::new();
                    loop {
                        match chars.next() {
                            Some('"') => break,
                            Some(c) => {
                                if c == '\n' {
                                    line += 1;
                                }
                                value.push(c);
                            }
                            None => {
                                return Err(ParseError::Parse {
                                    line: start,
                                    message: "unterminated string".to_string(),
                                })
                            }
                        }
                    }
                    tokens.push_back(Token {
                        kind: TokenKind::String(value),
                        line: start,
                    });
                }
                _ => {
                    let mut word = String::new();
                    while let Some(c) =
                        chars.next_if(|&c| !c.is_whitespace() && !matches!(c, '[' | ']' | '"' | '#'))
                    {
                        word.push(c);
                    }
                    tokens.push_back(Token {
                        kind: classify_word(word, line)?,
                        line,
                    });
                }
            }
        }

        Ok(Self {
            tokens,
            eof_line: line,
        })
    }

    /// Look at the next token without consuming it.
    pub fn peek(&self) -> Token {
        self.tokens.front().cloned().unwrap_or(Token {
            kind: TokenKind::Eof,
            line: self.eof_line,
        })
    }

    /// Consume the next token.
    pub fn next_token(&mut self) -> Token {
        self.tokens.pop_front().unwrap_or(Token {
            kind: TokenKind::Eof,
            line: self.eof_line,
        })
    }

    /// Line of the next token, for error reporting.
    pub fn line(&self) -> usize {
        self.peek().line
    }

    pub fn is_eof(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Read a bare command name.
    pub fn get_name(&mut self) -> ParseResult<String> {
        match self.next_token() {
            Token {
                kind: TokenKind::Name(name),
                ..
            } => Ok(name),
            other => Err(unexpected("NAME", &other)),
        }
    }

    /// Read a quoted string.
    pub fn get_string(&mut self) -> ParseResult<String> {
        match self.next_token() {
            Token {
                kind: TokenKind::String(value),
                ..
            } => Ok(value),
            other => Err(unexpected("STRING", &other)),
        }
    }

    /// Read either a single number or a `[ ... ]` array of `min..=max` numbers.
    pub fn get_numbers(&mut self, min: usize, max: usize) -> ParseResult<Vec<f64>> {
        let first = self.next_token();
        let line = first.line;

        let values = match first.kind {
            TokenKind::Number(n) => vec![n],
            TokenKind::ArrayBegin => {
                let mut values = Vec::new();
                loop {
                    let token = self.next_token();
                    match token.kind {
                        TokenKind::Number(n) => values.push(n),
                        TokenKind::ArrayEnd => break,
                        _ => return Err(unexpected("NUMBER", &token)),
                    }
                }
                values
            }
            _ => return Err(unexpected("NUMBER", &first)),
        };

        if values.len() < min || values.len() > max {
            return Err(ParseError::Parse {
                line,
                message: format!(
                    "expected {} to {} NUMBERs; got {}",
                    min,
                    max,
                    values.len()
                ),
            });
        }

        Ok(values)
    }

    /// Read exactly one number (bare or as a one-element array).
    pub fn get_number(&mut self) -> ParseResult<f64> {
        Ok(self.get_numbers(1, 1)?[0])
    }

    /// Read `"key" numbers` pairs until the next token is not a string.
    pub fn get_param_list(&mut self, min: usize, max: usize) -> ParseResult<ParamList> {
        let mut params = ParamList::new();
        while matches!(self.peek().kind, TokenKind::String(_)) {
            let key = self.get_string()?;
            let values = self.get_numbers(min, max)?;
            params.insert(key, values);
        }
        Ok(params)
    }
}

fn classify_word(word: String, line: usize) -> ParseResult<TokenKind> {
    let looks_numeric = word
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'));

    if !looks_numeric {
        return Ok(TokenKind::Name(word));
    }

    word.parse::<f64>()
        .map(TokenKind::Number)
        .map_err(|_| ParseError::Parse {
            line,
            message: format!("invalid number '{}'", word),
        })
}

fn unexpected(expected: &str, got: &Token) -> ParseError {
    match got.kind {
        TokenKind::Eof => ParseError::UnexpectedEof,
        _ => ParseError::Parse {
            line: got.line,
            message: format!("expected {}; got {}", expected, got.kind),
        },
    }
}
