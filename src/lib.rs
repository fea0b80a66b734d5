//! Reader for the Lingo data-interchange format.
//!
//! Level files, tile and prop catalogs and editor configuration are all
//! stored as serialized Lingo values: nested linear lists, `#symbol`-keyed
//! property lists, numbers, strings, and `point`/`rect`/`color` literals.
//!
//! ```
//! let value = lingo::read("[#nm: \"Wall\", #sz: point(2, 3)]").unwrap();
//! assert_eq!(value.get("nm").and_then(|v| v.as_str()), Some("Wall"));
//! ```

use std::ops::{Bound, RangeBounds};

use log::debug;

pub mod init;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod token;
pub mod tokenizer;
pub mod value;

pub use options::{Options, Trailing};
pub use token::Position;
pub use value::{Color, Point, PropertyList, Rect, Value};

use parser::Parser;
use tokenizer::Tokenizer;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] tokenizer::Error),
    #[error(transparent)]
    Parse(#[from] parser::Error),
}

impl Error {
    pub fn position(&self) -> Position {
        match self {
            Error::Lex(e) => e.position(),
            Error::Parse(e) => e.position(),
        }
    }

    pub fn line(&self) -> u32 {
        self.position().line
    }

    pub fn column(&self) -> u32 {
        self.position().column
    }
}

/// Reads one serialized value using the default [`Options`].
pub fn read(text: &str) -> Result<Value, Error> {
    read_with(text, &Options::default())
}

/// Reads one serialized value. The whole text is tokenized before parsing
/// starts, and the first error aborts the read.
pub fn read_with(text: &str, options: &Options) -> Result<Value, Error> {
    let (tokens, eof) = Tokenizer::new(text).tokenize()?;
    debug!("read {} tokens from {} bytes", tokens.len(), text.len());
    let value = Parser::new(tokens, eof, *options).parse()?;
    Ok(value)
}

/// Converts a range into an inclusive `(min, max)` pair; `None` is unbounded.
fn get_bounds(bounds: impl RangeBounds<usize>) -> (usize, Option<usize>) {
    let min = match bounds.start_bound() {
        Bound::Included(n) => *n,
        Bound::Excluded(n) => *n + 1,
        Bound::Unbounded => 0,
    };
    let max = match bounds.end_bound() {
        Bound::Included(n) => Some(*n),
        Bound::Excluded(n) => Some(n.saturating_sub(1)),
        Bound::Unbounded => None,
    };
    (min, max)
}
