use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

use thiserror::Error;

/// Byte range of a token or node within its source buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span(pub Range<usize>);

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self(start..end)
    }
    pub fn combine(a: &Span, b: &Span) -> Span {
        Span::new(a.0.start, b.0.end)
    }
    pub fn str_of<'a>(&self, source: &'a str) -> &'a str {
        &source[self.0.start..self.0.end]
    }
}

/// Human-facing position, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLoc {
    pub line: u32,
    pub column: u32,
}

impl SourceLoc {
    pub const START: SourceLoc = SourceLoc { line: 1, column: 1 };
}

impl Default for SourceLoc {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Lexical problems. The lexer reports these as `TokenKind::Error` and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    /// Carries the contents read before the input ran out.
    #[error("unterminated string literal")]
    UnterminatedString(String),
    #[error("unterminated character literal")]
    UnterminatedChar,
    #[error("empty character literal")]
    EmptyChar,
    #[error("invalid escape sequence '\\{0}' in character literal")]
    InvalidEscape(char),
    #[error("character literal must be a single ASCII character")]
    NonAsciiChar,
    #[error("invalid hexadecimal number: expected digits after 0x")]
    MissingHexDigits,
    #[error("integer literal out of range")]
    IntegerOutOfRange,
    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'s> {
    Int(i64),
    Double(f64),
    /// String literal with escapes already processed.
    Str(Cow<'s, str>),
    Char(u8),
    Ident(&'s str),

    // Keywords
    Lambda,
    If,
    Else,
    While,
    For,
    True,
    False,
    Const,
    Import,
    Return,
    Break,
    Continue,
    Link,
    Extern,
    Struct,
    Match,
    NullPtr,
    Ptr,
    Or,
    And,
    Deref,

    // Two and three character operators
    PlusPlus,
    MinusMinus,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    FloorDivAssign,
    PercentAssign,
    FloorDiv,
    DotDot,
    StarStar,
    EqEq,
    NotEq,
    LessEq,
    GreaterEq,

    // Single character operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Assign,
    Colon,
    Semi,
    Dot,
    Less,
    Greater,
    At,
    Ampersand,

    Error(LexError),
    Eof,
}

impl<'s> TokenKind<'s> {
    pub fn keyword(ident: &str) -> Option<TokenKind<'static>> {
        let kind = match ident {
            "lambda" => TokenKind::Lambda,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "True" => TokenKind::True,
            "False" => TokenKind::False,
            "const" => TokenKind::Const,
            "import" => TokenKind::Import,
            "return" => TokenKind::Return,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "link" => TokenKind::Link,
            "extern" => TokenKind::Extern,
            "struct" => TokenKind::Struct,
            "match" => TokenKind::Match,
            "nullptr" => TokenKind::NullPtr,
            "ptr" => TokenKind::Ptr,
            "or" => TokenKind::Or,
            "and" => TokenKind::And,
            "deref" => TokenKind::Deref,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Lambda
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::For
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Const
                | TokenKind::Import
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Link
                | TokenKind::Extern
                | TokenKind::Struct
                | TokenKind::Match
                | TokenKind::NullPtr
                | TokenKind::Ptr
                | TokenKind::Or
                | TokenKind::And
                | TokenKind::Deref
        )
    }

    /// Short description used in "expected X, found Y" messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Int(_) => "integer".to_string(),
            TokenKind::Double(_) => "double".to_string(),
            TokenKind::Str(_) => "string".to_string(),
            TokenKind::Char(_) => "character".to_string(),
            TokenKind::Ident(name) => format!("identifier '{}'", name),
            TokenKind::Error(_) => "invalid token".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Lambda => "lambda",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::True => "True",
            TokenKind::False => "False",
            TokenKind::Const => "const",
            TokenKind::Import => "import",
            TokenKind::Return => "return",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Link => "link",
            TokenKind::Extern => "extern",
            TokenKind::Struct => "struct",
            TokenKind::Match => "match",
            TokenKind::NullPtr => "nullptr",
            TokenKind::Ptr => "ptr",
            TokenKind::Or => "or",
            TokenKind::And => "and",
            TokenKind::Deref => "deref",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::PlusAssign => "+=",
            TokenKind::MinusAssign => "-=",
            TokenKind::StarAssign => "*=",
            TokenKind::SlashAssign => "/=",
            TokenKind::FloorDivAssign => "//=",
            TokenKind::PercentAssign => "%=",
            TokenKind::FloorDiv => "//",
            TokenKind::DotDot => "..",
            TokenKind::StarStar => "**",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::LessEq => "<=",
            TokenKind::GreaterEq => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Assign => "=",
            TokenKind::Colon => ":",
            TokenKind::Semi => ";",
            TokenKind::Dot => ".",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::At => "@",
            TokenKind::Ampersand => "&",
            TokenKind::Int(_)
            | TokenKind::Double(_)
            | TokenKind::Str(_)
            | TokenKind::Char(_)
            | TokenKind::Ident(_)
            | TokenKind::Error(_)
            | TokenKind::Eof => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'s> {
    pub kind: TokenKind<'s>,
    /// The raw source text of the token.
    pub text: &'s str,
    pub loc: SourceLoc,
    pub span: Span,
}
