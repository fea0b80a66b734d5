use std::fmt;

/// A 1-based line/column location in the source text.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };
}

impl Default for Position {
    fn default() -> Self {
        Position::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    Comma,
    Colon,
    Hyphen,
    Ampersand,

    Void,
    String(String),
    Float(f32),
    Integer(i32),
    /// Symbol name as written, without the leading `#`.
    Symbol(String),
    KeywordColor,
    KeywordPoint,
    KeywordRect,

    StringConstant(String),
    IntConstant(i32),
    FloatConstant(f32),
}

impl TokenKind {
    /// Name of the kind, without its payload. Used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::OpenBracket => "OpenBracket",
            TokenKind::CloseBracket => "CloseBracket",
            TokenKind::OpenParen => "OpenParen",
            TokenKind::CloseParen => "CloseParen",
            TokenKind::Comma => "Comma",
            TokenKind::Colon => "Colon",
            TokenKind::Hyphen => "Hyphen",
            TokenKind::Ampersand => "Ampersand",
            TokenKind::Void => "Void",
            TokenKind::String(_) => "String",
            TokenKind::Float(_) => "Float",
            TokenKind::Integer(_) => "Integer",
            TokenKind::Symbol(_) => "Symbol",
            TokenKind::KeywordColor => "KeywordColor",
            TokenKind::KeywordPoint => "KeywordPoint",
            TokenKind::KeywordRect => "KeywordRect",
            TokenKind::StringConstant(_) => "StringConstant",
            TokenKind::IntConstant(_) => "IntConstant",
            TokenKind::FloatConstant(_) => "FloatConstant",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Where the first character of the token was read.
    pub pos: Position,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Position) -> Self {
        Token { kind, pos }
    }
}
