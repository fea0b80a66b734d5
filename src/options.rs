/// Nesting limit used by [`Options::default`]. Reading this many levels fits
/// comfortably in a 1 MiB thread stack.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// What to do with tokens left over once a complete value has been read.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Trailing {
    Reject,
    Ignore,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Options {
    /// Maximum bracket nesting; `None` means unlimited.
    pub max_depth: Option<usize>,
    pub trailing: Trailing,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            trailing: Trailing::Reject,
        }
    }
}

impl Options {
    /// Behaves like the game's own reader: no nesting limit, and anything
    /// after the first complete value is ignored. Without a limit, deeply
    /// nested input is bounded only by the calling thread's stack.
    pub fn legacy() -> Self {
        Options {
            max_depth: None,
            trailing: Trailing::Ignore,
        }
    }

    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn trailing(mut self, trailing: Trailing) -> Self {
        self.trailing = trailing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let options = Options::default().max_depth(Some(4)).trailing(Trailing::Ignore);
        assert_eq!(options.max_depth, Some(4));
        assert_eq!(options.trailing, Trailing::Ignore);
        assert_eq!(Options::default().max_depth, Some(DEFAULT_MAX_DEPTH));
        assert_eq!(Options::legacy().max_depth(Some(8)).trailing, Trailing::Ignore);
    }
}
