//! Recursive-descent parser over a token queue.
//!
//! Every branch is decided by at most one token of lookahead and nothing is
//! ever pushed back, so each token is popped exactly once.

use std::collections::VecDeque;

use log::debug;

use crate::options::{Options, Trailing};
use crate::token::{Position, Token, TokenKind};
use crate::value::{Color, Point, PropertyList, Rect, Value};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("{pos}: Unexpected EOF")]
    UnexpectedEof { pos: Position },
    #[error("{pos}: Expected {expected}, got {found}")]
    Expected {
        pos: Position,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{pos}: Expected value, got {found}")]
    ExpectedValue { pos: Position, found: &'static str },
    #[error("{pos}: Cannot concatenate {left} and {right}, both operands must be String")]
    Concat {
        pos: Position,
        left: &'static str,
        right: &'static str,
    },
    #[error("{pos}: Lists nested deeper than {limit}")]
    NestingTooDeep { pos: Position, limit: usize },
    #[error("{pos}: Unexpected {found} after end of value")]
    TrailingTokens { pos: Position, found: &'static str },
}

impl Error {
    pub fn position(&self) -> Position {
        match self {
            Error::UnexpectedEof { pos }
            | Error::Expected { pos, .. }
            | Error::ExpectedValue { pos, .. }
            | Error::Concat { pos, .. }
            | Error::NestingTooDeep { pos, .. }
            | Error::TrailingTokens { pos, .. } => *pos,
        }
    }
}

pub struct Parser {
    tokens: VecDeque<Token>,
    /// Reported when the queue runs dry.
    eof: Position,
    options: Options,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: impl Into<VecDeque<Token>>, eof: Position, options: Options) -> Self {
        Parser {
            tokens: tokens.into(),
            eof,
            options,
            depth: 0,
        }
    }

    /// Parses one expression. Leftover tokens are handled per
    /// [`Options::trailing`].
    pub fn parse(mut self) -> Result<Value, Error> {
        debug!("parsing {} tokens", self.tokens.len());
        let value = self.expression()?;
        if let Some(token) = self.tokens.front() {
            match self.options.trailing {
                Trailing::Reject => {
                    return Err(Error::TrailingTokens {
                        pos: token.pos,
                        found: token.kind.name(),
                    })
                }
                Trailing::Ignore => debug!("ignoring {} trailing tokens", self.tokens.len()),
            }
        }
        Ok(value)
    }

    fn peek(&self) -> Result<&Token, Error> {
        self.tokens
            .front()
            .ok_or(Error::UnexpectedEof { pos: self.eof })
    }

    fn next_is(&self, kind: &TokenKind) -> bool {
        matches!(self.tokens.front(), Some(token) if token.kind == *kind)
    }

    fn pop(&mut self) -> Result<Token, Error> {
        self.tokens
            .pop_front()
            .ok_or(Error::UnexpectedEof { pos: self.eof })
    }

    /// Pops a payload-free token of the given kind.
    fn expect(&mut self, kind: TokenKind) -> Result<Token, Error> {
        let token = self.pop()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(Error::Expected {
                pos: token.pos,
                expected: kind.name(),
                found: token.kind.name(),
            })
        }
    }

    fn expect_integer(&mut self) -> Result<i32, Error> {
        let token = self.pop()?;
        match token.kind {
            TokenKind::Integer(n) => Ok(n),
            other => Err(Error::Expected {
                pos: token.pos,
                expected: "Integer",
                found: other.name(),
            }),
        }
    }

    fn expect_symbol(&mut self) -> Result<String, Error> {
        let token = self.pop()?;
        match token.kind {
            TokenKind::Symbol(name) => Ok(name),
            other => Err(Error::Expected {
                pos: token.pos,
                expected: "Symbol",
                found: other.name(),
            }),
        }
    }

    /// An Integer or Float literal, optionally preceded by a hyphen.
    fn signed_number(&mut self) -> Result<f32, Error> {
        let sign = if self.next_is(&TokenKind::Hyphen) {
            self.pop()?;
            -1.0
        } else {
            1.0
        };

        let token = self.pop()?;
        match token.kind {
            TokenKind::Integer(n) => Ok(sign * n as f32),
            TokenKind::Float(f) => Ok(sign * f),
            other => Err(Error::Expected {
                pos: token.pos,
                expected: "Float or Integer",
                found: other.name(),
            }),
        }
    }

    /// `value ("&" value)*`, where `&` joins strings.
    fn expression(&mut self) -> Result<Value, Error> {
        let mut acc = self.value()?;
        while self.next_is(&TokenKind::Ampersand) {
            let op = self.pop()?.pos;
            let rhs = self.value()?;
            acc = concat(op, acc, rhs)?;
        }
        Ok(acc)
    }

    // Lists are the only recursive production. Everything else is read by
    // `scalar`, which stays out of line so its locals are not carried on
    // every nesting level.
    fn value(&mut self) -> Result<Value, Error> {
        let token = self.pop()?;
        match token.kind {
            TokenKind::OpenBracket => self.list(token.pos),
            kind => self.scalar(kind, token.pos),
        }
    }

    #[inline(never)]
    fn scalar(&mut self, kind: TokenKind, pos: Position) -> Result<Value, Error> {
        let value = match kind {
            TokenKind::Void => Value::Void,
            TokenKind::String(s) | TokenKind::StringConstant(s) => Value::String(s),
            TokenKind::Float(f) | TokenKind::FloatConstant(f) => Value::Float(f),
            TokenKind::Integer(n) | TokenKind::IntConstant(n) => Value::Integer(n),

            // Only plain literals may be negated here; `-PI` is an error.
            TokenKind::Hyphen => {
                let number = self.pop()?;
                match number.kind {
                    TokenKind::Float(f) => Value::Float(-f),
                    TokenKind::Integer(n) => Value::Integer(-n),
                    other => {
                        return Err(Error::Expected {
                            pos: number.pos,
                            expected: "Float or Integer",
                            found: other.name(),
                        })
                    }
                }
            }

            TokenKind::KeywordColor => {
                self.expect(TokenKind::OpenParen)?;
                let r = self.expect_integer()?;
                self.expect(TokenKind::Comma)?;
                let g = self.expect_integer()?;
                self.expect(TokenKind::Comma)?;
                let b = self.expect_integer()?;
                self.expect(TokenKind::CloseParen)?;
                Value::Color(Color::new(r, g, b))
            }

            TokenKind::KeywordPoint => {
                let [x, y] = self.number_args::<2>()?;
                Value::Point(Point::new(x, y))
            }

            TokenKind::KeywordRect => {
                let [x, y, width, height] = self.number_args::<4>()?;
                Value::Rect(Rect::new(x, y, width, height))
            }

            other => return Err(Error::ExpectedValue { pos, found: other.name() }),
        };
        Ok(value)
    }

    /// `"(" signed-number ("," signed-number){N-1} ")"`
    fn number_args<const N: usize>(&mut self) -> Result<[f32; N], Error> {
        self.expect(TokenKind::OpenParen)?;
        let mut args = [0.0; N];
        for (i, arg) in args.iter_mut().enumerate() {
            if i > 0 {
                self.expect(TokenKind::Comma)?;
            }
            *arg = self.signed_number()?;
        }
        self.expect(TokenKind::CloseParen)?;
        Ok(args)
    }

    /// Called with the opening bracket already popped. The first token inside
    /// decides the list type: a colon or a symbol starts a property list.
    fn list(&mut self, open: Position) -> Result<Value, Error> {
        self.depth += 1;
        if let Some(limit) = self.options.max_depth {
            if self.depth > limit {
                return Err(Error::NestingTooDeep { pos: open, limit });
            }
        }

        let is_property_list = matches!(
            self.peek()?.kind,
            TokenKind::Colon | TokenKind::Symbol(_)
        );
        let list = if is_property_list {
            Value::PropertyList(self.property_list()?)
        } else {
            Value::LinearList(self.linear_list()?)
        };

        self.depth -= 1;
        Ok(list)
    }

    fn linear_list(&mut self) -> Result<Vec<Value>, Error> {
        let mut items = vec![];
        if self.next_is(&TokenKind::CloseBracket) {
            self.pop()?;
            return Ok(items);
        }

        loop {
            // An elided entry leaves no trace in the list.
            if self.next_is(&TokenKind::Void) {
                self.pop()?;
            } else {
                items.push(self.expression()?);
            }

            if !self.next_is(&TokenKind::Comma) {
                break;
            }
            self.pop()?;
        }

        self.expect(TokenKind::CloseBracket)?;
        Ok(items)
    }

    fn property_list(&mut self) -> Result<PropertyList, Error> {
        let mut props = PropertyList::new();
        if self.next_is(&TokenKind::Colon) {
            self.pop()?;
            self.expect(TokenKind::CloseBracket)?;
            return Ok(props);
        }

        loop {
            let key = self.expect_symbol()?;
            self.expect(TokenKind::Colon)?;
            let value = self.expression()?;
            if !value.is_void() {
                props.insert(key, value);
            }

            if !self.next_is(&TokenKind::Comma) {
                break;
            }
            self.pop()?;
        }

        self.expect(TokenKind::CloseBracket)?;
        Ok(props)
    }
}

#[inline(never)]
fn concat(op: Position, left: Value, right: Value) -> Result<Value, Error> {
    match (left, right) {
        (Value::String(mut left), Value::String(right)) => {
            left.push_str(&right);
            Ok(Value::String(left))
        }
        (left, right) => Err(Error::Concat {
            pos: op,
            left: left.type_name(),
            right: right.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DEFAULT_MAX_DEPTH;
    use crate::tokenizer::Tokenizer;

    fn parse_with(input: &str, options: Options) -> Result<Value, Error> {
        let (tokens, eof) = Tokenizer::new(input).tokenize().unwrap();
        Parser::new(tokens, eof, options).parse()
    }

    fn parse(input: &str) -> Result<Value, Error> {
        parse_with(input, Options::default())
    }

    fn at(line: u32, column: u32) -> Position {
        Position { line, column }
    }

    #[test]
    fn scalars() {
        assert_eq!(parse("void"), Ok(Value::Void));
        assert_eq!(parse("42"), Ok(Value::Integer(42)));
        assert_eq!(parse("-42"), Ok(Value::Integer(-42)));
        assert_eq!(parse("-0.5"), Ok(Value::Float(-0.5)));
        assert_eq!(parse("\"hi\""), Ok(Value::from("hi")));
        assert_eq!(parse("TRUE"), Ok(Value::Integer(1)));
        assert_eq!(parse("pi"), Ok(Value::Float(std::f32::consts::PI)));
    }

    #[test]
    fn negated_constant_is_rejected() {
        assert_eq!(
            parse("-PI"),
            Err(Error::Expected {
                pos: at(1, 2),
                expected: "Float or Integer",
                found: "FloatConstant",
            })
        );
        assert_eq!(
            parse("-TRUE"),
            Err(Error::Expected {
                pos: at(1, 2),
                expected: "Float or Integer",
                found: "IntConstant",
            })
        );
        assert_eq!(parse("[-FALSE]").unwrap_err().position(), at(1, 3));
    }

    #[test]
    fn lone_hyphen_hits_eof() {
        assert_eq!(parse("-"), Err(Error::UnexpectedEof { pos: at(1, 2) }));
    }

    #[test]
    fn empty_input_hits_eof() {
        assert_eq!(parse("  "), Err(Error::UnexpectedEof { pos: at(1, 3) }));
    }

    #[test]
    fn point_and_rect_accept_signed_numbers() {
        assert_eq!(parse("point(1, -2.5)"), Ok(Value::Point(Point::new(1.0, -2.5))));
        assert_eq!(
            parse("rect(-1, 2.5, 10, -0)"),
            Ok(Value::Rect(Rect::new(-1.0, 2.5, 10.0, -0.0)))
        );
        assert_eq!(
            parse("point(1, 2, 3)"),
            Err(Error::Expected {
                pos: at(1, 11),
                expected: "CloseParen",
                found: "Comma",
            })
        );
    }

    #[test]
    fn color_takes_plain_integers() {
        assert_eq!(parse("color(255, 0, 128)"), Ok(Value::Color(Color::new(255, 0, 128))));
        assert_eq!(parse("color(999, 0, 0)"), Ok(Value::Color(Color::new(999, 0, 0))));
        assert_eq!(
            parse("color(1, -2, 3)"),
            Err(Error::Expected {
                pos: at(1, 10),
                expected: "Integer",
                found: "Hyphen",
            })
        );
        assert!(parse("color(1.0, 2, 3)").is_err());
    }

    #[test]
    fn linear_lists() {
        assert_eq!(parse("[]"), Ok(Value::LinearList(vec![])));
        assert_eq!(
            parse("[1, \"a\", [2.5]]"),
            Ok(Value::from(vec![
                Value::Integer(1),
                Value::from("a"),
                Value::from(vec![Value::Float(2.5)]),
            ]))
        );
    }

    #[test]
    fn void_entries_are_skipped() {
        assert_eq!(
            parse("[void, 1, VOID, 2, void]"),
            Ok(Value::from(vec![Value::Integer(1), Value::Integer(2)]))
        );
        assert_eq!(parse("[void]"), Ok(Value::LinearList(vec![])));
    }

    #[test]
    fn property_lists() {
        assert_eq!(parse("[:]"), Ok(Value::PropertyList(PropertyList::new())));

        let value = parse("[#Nm: \"wall\", #sz: point(1, 1), #gone: void, #NM: \"box\"]").unwrap();
        let props = value.as_property_list().unwrap();
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["nm", "sz"]);
        assert_eq!(props.get("nm"), Some(&Value::from("box")));
    }

    #[test]
    fn first_token_decides_list_type() {
        assert!(parse("[#a: 1]").unwrap().as_property_list().is_some());
        assert!(parse("[1, #a: 1]").is_err());
        assert_eq!(
            parse("[#a: 1, 2]"),
            Err(Error::Expected {
                pos: at(1, 9),
                expected: "Symbol",
                found: "Integer",
            })
        );
    }

    #[test]
    fn property_list_needs_colon() {
        assert_eq!(
            parse("[#a 1]"),
            Err(Error::Expected {
                pos: at(1, 5),
                expected: "Colon",
                found: "Integer",
            })
        );
    }

    #[test]
    fn empty_property_list_must_close() {
        assert_eq!(
            parse("[: 1]"),
            Err(Error::Expected {
                pos: at(1, 4),
                expected: "CloseBracket",
                found: "Integer",
            })
        );
    }

    #[test]
    fn concatenation() {
        assert_eq!(
            parse("\"Hello, \" & \"world!\" & RETURN"),
            Ok(Value::from("Hello, world!\r"))
        );
        assert_eq!(
            parse("[#a: \"x\" & QUOTE & \"y\", #b: 1]").unwrap().get("a"),
            Some(&Value::from("x\"y"))
        );
    }

    #[test]
    fn concatenation_requires_strings() {
        assert_eq!(
            parse("\"foo\" & 5"),
            Err(Error::Concat {
                pos: at(1, 7),
                left: "String",
                right: "Integer",
            })
        );
        assert_eq!(
            parse("void & \"a\""),
            Err(Error::Concat {
                pos: at(1, 6),
                left: "Void",
                right: "String",
            })
        );
    }

    #[test]
    fn missing_close_bracket_is_eof() {
        assert_eq!(parse("[1, 2"), Err(Error::UnexpectedEof { pos: at(1, 6) }));
        assert_eq!(parse("[#a: 1,"), Err(Error::UnexpectedEof { pos: at(1, 8) }));
    }

    #[test]
    fn invalid_value_start() {
        assert_eq!(
            parse("]"),
            Err(Error::ExpectedValue {
                pos: at(1, 1),
                found: "CloseBracket",
            })
        );
        assert_eq!(
            parse("[1, ,]"),
            Err(Error::ExpectedValue {
                pos: at(1, 5),
                found: "Comma",
            })
        );
    }

    #[test]
    fn trailing_tokens() {
        assert_eq!(
            parse("[1] 2"),
            Err(Error::TrailingTokens {
                pos: at(1, 5),
                found: "Integer",
            })
        );
        let ignore = Options::default().trailing(Trailing::Ignore);
        assert_eq!(parse_with("[1] 2", ignore), Ok(Value::from(vec![Value::Integer(1)])));
    }

    #[test]
    fn nesting_limit() {
        let options = Options::default().max_depth(Some(2));
        assert!(parse_with("[[1]]", options).is_ok());
        assert_eq!(
            parse_with("[[[1]]]", options),
            Err(Error::NestingTooDeep {
                pos: at(1, 3),
                limit: 2,
            })
        );
        // Siblings do not add up.
        assert!(parse_with("[[1], [2], [#a: [3]]]", options.max_depth(Some(3))).is_ok());

        let deep = nested(300);
        assert!(matches!(
            parse(&deep),
            Err(Error::NestingTooDeep { limit: DEFAULT_MAX_DEPTH, .. })
        ));
    }

    fn nested(depth: usize) -> String {
        format!("{}{}", "[".repeat(depth), "]".repeat(depth))
    }

    fn on_stack<T: Send + 'static>(bytes: usize, f: impl FnOnce() -> T + Send + 'static) -> T {
        std::thread::Builder::new()
            .stack_size(bytes)
            .spawn(f)
            .unwrap()
            .join()
            .unwrap()
    }

    #[test]
    fn default_depth_fits_a_small_stack() {
        let result = on_stack(1 << 20, || {
            let mut deepest = nested(DEFAULT_MAX_DEPTH);
            deepest.insert_str(DEFAULT_MAX_DEPTH, "#a: \"x\" & \"y\", #b: point(1, -2)");
            parse(&deepest).map(|_| ())
        });
        assert_eq!(result, Ok(()));

        let result = on_stack(1 << 20, || parse(&nested(DEFAULT_MAX_DEPTH + 1)).map(|_| ()));
        assert!(matches!(result, Err(Error::NestingTooDeep { .. })));
    }

    #[test]
    fn unlimited_depth() {
        let result = on_stack(64 << 20, || {
            parse_with(&nested(1000), Options::default().max_depth(None)).map(|_| ())
        });
        assert_eq!(result, Ok(()));
    }
}
