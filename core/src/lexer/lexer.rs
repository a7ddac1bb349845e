//! Hand-written scanner producing one located token at a time.

use std::borrow::Cow;

use super::token::{LexError, SourceLoc, Span, Token, TokenKind};

/// Cursor position that can be saved and restored around a nested parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerState {
    pos: usize,
    loc: SourceLoc,
}

pub struct Lexer<'s> {
    source: &'s str,
    bytes: &'s [u8],
    pos: usize,
    loc: SourceLoc,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self::with_location(source, SourceLoc::START)
    }

    /// Start scanning `source` as if it began at `loc` of an enclosing file.
    pub fn with_location(source: &'s str, loc: SourceLoc) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            loc,
        }
    }

    pub fn snapshot(&self) -> LexerState {
        LexerState {
            pos: self.pos,
            loc: self.loc,
        }
    }

    pub fn restore(&mut self, state: LexerState) {
        self.pos = state.pos;
        self.loc = state.loc;
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Advance one byte, keeping line/column in sync.
    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.loc.line += 1;
            self.loc.column = 1;
        } else if b & 0xC0 != 0x80 {
            // UTF-8 continuation bytes do not start a new column.
            self.loc.column += 1;
        }
        Some(b)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'#' {
                while let Some(c) = self.peek() {
                    if c == b'\n' {
                        break;
                    }
                    self.bump();
                }
            } else if b.is_ascii_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    pub fn next_token(&mut self) -> Token<'s> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        let loc = self.loc;
        let kind = self.scan();
        Token {
            kind,
            text: &self.source[start..self.pos],
            loc,
            span: Span::new(start, self.pos),
        }
    }

    fn scan(&mut self) -> TokenKind<'s> {
        let Some(b) = self.peek() else {
            return TokenKind::Eof;
        };

        if let Some(kind) = self.scan_operator() {
            return kind;
        }

        if b == b'0' && matches!(self.peek_at(1), Some(b'x' | b'X')) {
            return self.scan_hex();
        }
        if b.is_ascii_digit() || (b == b'.' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }
        if b == b'"' {
            return self.scan_string();
        }
        if b == b'\'' {
            return self.scan_char();
        }
        if is_ident_start(b) {
            let start = self.pos;
            while self.peek().is_some_and(is_ident_continue) {
                self.bump();
            }
            let text = &self.source[start..self.pos];
            return TokenKind::keyword(text).unwrap_or(TokenKind::Ident(text));
        }

        let single = match b {
            b'+' => Some(TokenKind::Plus),
            b'-' => Some(TokenKind::Minus),
            b'*' => Some(TokenKind::Star),
            b'/' => Some(TokenKind::Slash),
            b'%' => Some(TokenKind::Percent),
            b'(' => Some(TokenKind::LParen),
            b')' => Some(TokenKind::RParen),
            b'[' => Some(TokenKind::LBracket),
            b']' => Some(TokenKind::RBracket),
            b'{' => Some(TokenKind::LBrace),
            b'}' => Some(TokenKind::RBrace),
            b',' => Some(TokenKind::Comma),
            b'=' => Some(TokenKind::Assign),
            b':' => Some(TokenKind::Colon),
            b';' => Some(TokenKind::Semi),
            b'.' => Some(TokenKind::Dot),
            b'<' => Some(TokenKind::Less),
            b'>' => Some(TokenKind::Greater),
            b'@' => Some(TokenKind::At),
            b'&' => Some(TokenKind::Ampersand),
            _ => None,
        };
        if let Some(kind) = single {
            self.bump();
            return kind;
        }

        // Skip the whole character so spans stay on UTF-8 boundaries.
        let ch = self.source[self.pos..].chars().next().unwrap_or('\u{FFFD}');
        for _ in 0..ch.len_utf8() {
            self.bump();
        }
        TokenKind::Error(LexError::UnexpectedChar(ch))
    }

    /// Multi-character operators, longest match first.
    fn scan_operator(&mut self) -> Option<TokenKind<'s>> {
        let (len, kind) = match (self.peek()?, self.peek_at(1), self.peek_at(2)) {
            (b'/', Some(b'/'), Some(b'=')) => (3, TokenKind::FloorDivAssign),
            (b'+', Some(b'+'), _) => (2, TokenKind::PlusPlus),
            (b'-', Some(b'-'), _) => (2, TokenKind::MinusMinus),
            (b'+', Some(b'='), _) => (2, TokenKind::PlusAssign),
            (b'-', Some(b'='), _) => (2, TokenKind::MinusAssign),
            (b'*', Some(b'='), _) => (2, TokenKind::StarAssign),
            (b'/', Some(b'/'), _) => (2, TokenKind::FloorDiv),
            (b'/', Some(b'='), _) => (2, TokenKind::SlashAssign),
            (b'%', Some(b'='), _) => (2, TokenKind::PercentAssign),
            (b'.', Some(b'.'), _) => (2, TokenKind::DotDot),
            (b'*', Some(b'*'), _) => (2, TokenKind::StarStar),
            (b'=', Some(b'='), _) => (2, TokenKind::EqEq),
            (b'!', Some(b'='), _) => (2, TokenKind::NotEq),
            (b'<', Some(b'='), _) => (2, TokenKind::LessEq),
            (b'>', Some(b'='), _) => (2, TokenKind::GreaterEq),
            _ => return None,
        };
        for _ in 0..len {
            self.bump();
        }
        Some(kind)
    }

    fn scan_hex(&mut self) -> TokenKind<'s> {
        self.bump();
        self.bump();
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_hexdigit()) {
            self.bump();
        }
        let digits = &self.source[start..self.pos];
        if digits.is_empty() {
            return TokenKind::Error(LexError::MissingHexDigits);
        }
        match u64::from_str_radix(digits, 16) {
            // Full 64-bit patterns are allowed so addresses can be written directly.
            Ok(value) => TokenKind::Int(value as i64),
            Err(_) => TokenKind::Error(LexError::IntegerOutOfRange),
        }
    }

    fn scan_number(&mut self) -> TokenKind<'s> {
        let start = self.pos;
        let mut has_dot = false;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.bump();
            } else if b == b'.' && !has_dot {
                // `1..5` is a range and `5.hex()` a method call.
                let next = self.peek_at(1);
                if next == Some(b'.') || next.is_some_and(is_ident_start) {
                    break;
                }
                has_dot = true;
                self.bump();
            } else {
                break;
            }
        }

        let text = &self.source[start..self.pos];
        if has_dot {
            match text.parse::<f64>() {
                Ok(value) => TokenKind::Double(value),
                Err(_) => TokenKind::Error(LexError::InvalidNumber(text.to_string())),
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => TokenKind::Int(value),
                Err(_) => TokenKind::Error(LexError::IntegerOutOfRange),
            }
        }
    }

    fn scan_string(&mut self) -> TokenKind<'s> {
        self.bump();
        let bytes = self.bytes;
        let content_start = self.pos;
        let mut owned: Option<Vec<u8>> = None;

        loop {
            let Some(b) = self.peek() else {
                let partial = match owned {
                    Some(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                    None => self.source[content_start..self.pos].to_string(),
                };
                return TokenKind::Error(LexError::UnterminatedString(partial));
            };
            match b {
                b'"' => {
                    let content = match owned {
                        Some(bytes) => Cow::Owned(
                            String::from_utf8(bytes)
                                .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()),
                        ),
                        None => Cow::Borrowed(&self.source[content_start..self.pos]),
                    };
                    self.bump();
                    return TokenKind::Str(content);
                }
                b'\\' => {
                    let escape_at = self.pos;
                    let buf =
                        owned.get_or_insert_with(|| bytes[content_start..escape_at].to_vec());
                    self.pos += 1;
                    self.loc.column += 1;
                    let Some(escaped) = self.peek() else {
                        let partial = String::from_utf8_lossy(buf).into_owned();
                        return TokenKind::Error(LexError::UnterminatedString(partial));
                    };
                    buf.push(match escaped {
                        b'n' => b'\n',
                        b't' => b'\t',
                        b'\\' => b'\\',
                        other => other,
                    });
                    self.bump();
                }
                _ => {
                    if let Some(buf) = owned.as_mut() {
                        buf.push(b);
                    }
                    self.bump();
                }
            }
        }
    }

    fn scan_char(&mut self) -> TokenKind<'s> {
        self.bump();
        let value = match self.peek() {
            None => return TokenKind::Error(LexError::UnterminatedChar),
            Some(b'\'') => {
                self.bump();
                return TokenKind::Error(LexError::EmptyChar);
            }
            Some(b'\\') => {
                self.bump();
                let Some(escaped) = self.bump() else {
                    return TokenKind::Error(LexError::UnterminatedChar);
                };
                match escaped {
                    b'n' => b'\n',
                    b't' => b'\t',
                    b'r' => b'\r',
                    b'0' => 0,
                    b'\\' => b'\\',
                    b'\'' => b'\'',
                    other => {
                        self.skip_to_char_end();
                        return TokenKind::Error(LexError::InvalidEscape(other as char));
                    }
                }
            }
            Some(b) if b.is_ascii() => {
                self.bump();
                b
            }
            Some(_) => {
                self.skip_to_char_end();
                return TokenKind::Error(LexError::NonAsciiChar);
            }
        };

        if self.peek() == Some(b'\'') {
            self.bump();
            TokenKind::Char(value)
        } else {
            TokenKind::Error(LexError::UnterminatedChar)
        }
    }

    /// Recover from a bad char literal by consuming up to the closing quote on this line.
    fn skip_to_char_end(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\n' {
                return;
            }
            self.bump();
            if b == b'\'' {
                return;
            }
        }
    }
}

impl<'s> Iterator for Lexer<'s> {
    type Item = Token<'s>;

    /// Yields tokens up to, but not including, end of input.
    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}
