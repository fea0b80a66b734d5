//! Turns source text into a flat token list.
//!
//! Tokenization is eager: the whole input is consumed before the parser sees
//! the first token, so lexical errors are always reported before syntax
//! errors.

use std::num::IntErrorKind;

use log::trace;

use crate::lexer::prelude::*;
use crate::token::{Position, Token, TokenKind};

/// The newline sequence produced by the `ENTER` constant.
pub const NEWLINE: &str = if cfg!(windows) { "\r\n" } else { "\n" };

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("{pos}: expected {expected}")]
    Expected { pos: Position, expected: String },
    #[error("{pos}: unexpected character '{found}'")]
    UnexpectedChar { pos: Position, found: char },
    #[error("{pos}: invalid keyword '{word}'")]
    InvalidKeyword { pos: Position, word: String },
    #[error("{pos}: unterminated string literal, expected {expected}")]
    UnterminatedString { pos: Position, expected: String },
    #[error("{pos}: invalid number literal '{text}'")]
    InvalidNumber { pos: Position, text: String },
    #[error("{pos}: integer literal '{text}' does not fit in 32 bits")]
    NumberOverflow { pos: Position, text: String },
}

impl Error {
    pub fn position(&self) -> Position {
        match self {
            Error::Expected { pos, .. }
            | Error::UnexpectedChar { pos, .. }
            | Error::InvalidKeyword { pos, .. }
            | Error::UnterminatedString { pos, .. }
            | Error::InvalidNumber { pos, .. }
            | Error::NumberOverflow { pos, .. } => *pos,
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Recognizers for the multi-character token shapes.
struct Shapes {
    whitespace: RcLexer,
    word: RcLexer,
    symbol_name: RcLexer,
    number: RcLexer,
    string_body: RcLexer,
    string_end: RcLexer,
}

impl Shapes {
    fn new() -> Self {
        let word_char = pred("letter, digit, or underscore", is_word_char);
        Shapes {
            whitespace: many(pred("whitespace", char::is_whitespace)),
            word: many(word_char.clone()),
            symbol_name: some(word_char),
            number: some(pred("digit or '.'", |c| c.is_ascii_digit() || c == '.')),
            string_body: many(pred("anything but '\"'", |c| c != '"')),
            string_end: is('"'),
        }
    }
}

/// Looks up a bare word in the keyword table, ignoring case.
fn keyword(word: &str) -> Option<TokenKind> {
    let kind = match word.to_lowercase().as_str() {
        "point" => TokenKind::KeywordPoint,
        "color" => TokenKind::KeywordColor,
        "rect" => TokenKind::KeywordRect,
        "void" => TokenKind::Void,

        "backspace" => TokenKind::StringConstant("\u{8}".to_string()),
        "empty" => TokenKind::StringConstant(String::new()),
        "enter" => TokenKind::StringConstant(NEWLINE.to_string()),
        "false" => TokenKind::IntConstant(0),
        "pi" => TokenKind::FloatConstant(std::f32::consts::PI),
        "quote" => TokenKind::StringConstant("\"".to_string()),
        "return" => TokenKind::StringConstant("\r".to_string()),
        "space" => TokenKind::StringConstant(" ".to_string()),
        "tab" => TokenKind::StringConstant("\t".to_string()),
        "true" => TokenKind::IntConstant(1),

        _ => return None,
    };
    Some(kind)
}

pub struct Tokenizer<'a> {
    input: &'a str,
    offset: usize,
    line: u32,
    column: u32,
    // A CR was the last character consumed; an LF right after it is part of
    // the same line break.
    after_cr: bool,
    shapes: Shapes,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            input,
            offset: 0,
            line: 1,
            column: 1,
            after_cr: false,
            shapes: Shapes::new(),
        }
    }

    /// Tokenizes the whole input. On success also returns the position just
    /// past the last character, which the parser reports for premature EOF.
    pub fn tokenize(mut self) -> Result<(Vec<Token>, Position), Error> {
        let mut tokens = vec![];
        loop {
            self.skip_whitespace();
            let c = match self.rest().chars().next() {
                Some(c) => c,
                None => break,
            };
            let pos = self.position();
            let kind = match c {
                '[' => self.punct(TokenKind::OpenBracket),
                ']' => self.punct(TokenKind::CloseBracket),
                '(' => self.punct(TokenKind::OpenParen),
                ')' => self.punct(TokenKind::CloseParen),
                ',' => self.punct(TokenKind::Comma),
                ':' => self.punct(TokenKind::Colon),
                '&' => self.punct(TokenKind::Ampersand),
                '-' => self.punct(TokenKind::Hyphen),
                '#' => self.symbol()?,
                '"' => self.string(pos)?,
                c if c.is_ascii_digit() => self.number(pos)?,
                c => self.word(pos, c)?,
            };
            trace!("{}: {:?}", pos, kind);
            tokens.push(Token::new(kind, pos));
        }
        Ok((tokens, self.position()))
    }

    fn rest(&self) -> &'a str {
        let input = self.input;
        &input[self.offset..]
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    /// Consumes `len` bytes, keeping the line and column counters in step.
    /// LF, CR and CR LF each count as a single line break.
    fn bump(&mut self, len: usize) -> &'a str {
        let input = self.input;
        let text = &input[self.offset..self.offset + len];
        for c in text.chars() {
            match c {
                '\n' if self.after_cr => {}
                '\r' | '\n' => {
                    self.line += 1;
                    self.column = 1;
                }
                _ => self.column += 1,
            }
            self.after_cr = c == '\r';
        }
        self.offset += len;
        text
    }

    fn skip_whitespace(&mut self) {
        if let Some(len) = self.shapes.whitespace.lex(self.rest()) {
            self.bump(len);
        }
    }

    fn punct(&mut self, kind: TokenKind) -> TokenKind {
        self.bump(1);
        kind
    }

    fn symbol(&mut self) -> Result<TokenKind, Error> {
        self.bump(1);
        let len = self
            .shapes
            .symbol_name
            .lex_result(self.rest())
            .map_err(|crate::lexer::Error::Expected(expected)| Error::Expected {
                pos: self.position(),
                expected,
            })?;
        Ok(TokenKind::Symbol(self.bump(len).to_string()))
    }

    fn string(&mut self, pos: Position) -> Result<TokenKind, Error> {
        self.bump(1);
        let len = self.shapes.string_body.lex(self.rest()).unwrap_or(0);
        let body = self.bump(len);
        let close = self
            .shapes
            .string_end
            .lex_result(self.rest())
            .map_err(|crate::lexer::Error::Expected(expected)| Error::UnterminatedString {
                pos,
                expected,
            })?;
        self.bump(close);
        Ok(TokenKind::String(body.to_string()))
    }

    fn number(&mut self, pos: Position) -> Result<TokenKind, Error> {
        let len = self.shapes.number.lex(self.rest()).unwrap_or(0);
        let text = self.bump(len);
        if text.contains('.') {
            text.parse::<f32>()
                .map(TokenKind::Float)
                .map_err(|_| Error::InvalidNumber {
                    pos,
                    text: text.to_string(),
                })
        } else {
            text.parse::<i32>().map(TokenKind::Integer).map_err(|e| {
                let text = text.to_string();
                match e.kind() {
                    IntErrorKind::PosOverflow => Error::NumberOverflow { pos, text },
                    _ => Error::InvalidNumber { pos, text },
                }
            })
        }
    }

    fn word(&mut self, pos: Position, first: char) -> Result<TokenKind, Error> {
        let len = self.shapes.word.lex(self.rest()).unwrap_or(0);
        if len == 0 {
            return Err(Error::UnexpectedChar { pos, found: first });
        }
        let word = self.bump(len);
        keyword(word).ok_or_else(|| Error::InvalidKeyword {
            pos,
            word: word.to_string(),
        })
    }
}
