//! Character recognizers.
//!
//! A [`Lexer`] looks at the front of a string and reports how many bytes it
//! matches. The tokenizer composes these to measure words, numbers and string
//! bodies; it never needs to know how a run was recognized. When a run is
//! required, [`Lexer::lex_result`] turns a miss into an error naming what was
//! expected.

use std::ops::RangeBounds;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("expected {0}")]
    Expected(String),
}

pub trait Lexer {
    fn lex(&self, input: &str) -> Option<usize>;
    fn expected(&self) -> String;

    fn lex_result(&self, input: &str) -> Result<usize, Error> {
        self.lex(input)
            .ok_or_else(|| Error::Expected(self.expected()))
    }
}

pub type RcLexer = Rc<dyn Lexer>;

pub struct Pred<F>
where
    F: Fn(char) -> bool,
{
    description: String,
    predicate: F,
}

impl<F> Lexer for Pred<F>
where
    F: Fn(char) -> bool,
{
    fn lex(&self, input: &str) -> Option<usize> {
        input.chars().next().and_then(|c| {
            if (self.predicate)(c) {
                Some(c.len_utf8())
            } else {
                None
            }
        })
    }

    fn expected(&self) -> String {
        self.description.clone()
    }
}

/// Matches one character accepted by `predicate`. `description` names the
/// character class in error messages.
pub fn pred(description: impl Into<String>, predicate: impl 'static + Fn(char) -> bool) -> RcLexer {
    Rc::new(Pred {
        description: description.into(),
        predicate,
    })
}

pub struct Is(char);

impl Lexer for Is {
    fn lex(&self, input: &str) -> Option<usize> {
        input.chars().next().and_then(|c| {
            if c == self.0 {
                Some(c.len_utf8())
            } else {
                None
            }
        })
    }

    fn expected(&self) -> String {
        format!("'{}'", self.0)
    }
}

pub fn is(c: char) -> RcLexer {
    Rc::new(Is(c))
}

pub struct Repeat {
    lexer: RcLexer,
    min: usize,
    max: Option<usize>,
}

impl Lexer for Repeat {
    fn lex(&self, input: &str) -> Option<usize> {
        let mut count = 0;
        let mut len = 0;
        while count < self.max.unwrap_or(usize::MAX) {
            match self.lexer.lex(&input[len..]) {
                // A zero-width match would repeat forever.
                Some(0) | None => break,
                Some(n) => {
                    count += 1;
                    len += n;
                }
            }
        }
        if count >= self.min { Some(len) } else { None }
    }

    fn expected(&self) -> String {
        let quantity = match self.max {
            Some(max) => format!("between {} and {}", self.min, max),

            None => format!("at least {}", self.min),
        };
        format!("{} {}", quantity, self.lexer.expected())
    }
}

pub fn repeat(lexer: RcLexer, bounds: impl RangeBounds<usize>) -> RcLexer {
    let (min, max) = crate::get_bounds(bounds);
    Rc::new(Repeat { lexer, min, max })
}

pub fn some(lexer: RcLexer) -> RcLexer {
    repeat(lexer, 1..)
}

pub fn many(lexer: RcLexer) -> RcLexer {
    repeat(lexer, ..)
}

pub mod prelude {
    pub use super::{is, many, pred, some, Lexer, RcLexer};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use super::{repeat, Error};

    fn digit() -> RcLexer {
        pred("digit", |c| c.is_ascii_digit())
    }

    #[test]
    fn repeat_respects_bounds() {
        let two_or_three = repeat(digit(), 2..=3);
        assert_eq!(two_or_three.lex("1"), None);
        assert_eq!(two_or_three.lex("12"), Some(2));
        assert_eq!(two_or_three.lex("12345"), Some(3));
        assert_eq!(repeat(digit(), 0..=1).lex("12"), Some(1));
        assert_eq!(many(digit()).lex("abc"), Some(0));
        assert_eq!(some(digit()).lex("abc"), None);
    }

    #[test]
    fn pred_counts_multibyte_characters() {
        let body = many(pred("anything but '!'", |c| c != '!'));
        assert_eq!(body.lex("é!"), Some('é'.len_utf8()));
        assert_eq!(body.lex("!é"), Some(0));
    }

    #[test]
    fn lex_result_reports_expectation() {
        let word = some(pred("letter", char::is_alphabetic));
        assert_eq!(word.lex_result("abc1"), Ok(3));
        assert_eq!(
            word.lex_result("1abc"),
            Err(Error::Expected("at least 1 letter".to_string()))
        );
        assert_eq!(
            repeat(digit(), 1..=2).expected(),
            "between 1 and 2 digit"
        );
    }

    #[test]
    fn is_names_its_character() {
        assert_eq!(is('"').lex("\"x"), Some(1));
        assert_eq!(is('"').lex_result("x"), Err(Error::Expected("'\"'".to_string())));
    }
}
