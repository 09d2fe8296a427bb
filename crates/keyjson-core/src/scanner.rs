//! Single-pass tokenizer over validated UTF-8 input.
//!
//! String and number literals come back as spans into the input; decoding is
//! left to the parser so that cached object keys never pay for it.

use crate::error::{DecodeError, DecodeErrorKind};

/// A byte range `offset..offset + len` within the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    ObjectOpen,
    ObjectClose,
    ArrayOpen,
    ArrayClose,
    Colon,
    Comma,
    /// Contents between the quotes. `escaped` is set when the literal contains
    /// at least one backslash.
    String { span: Span, escaped: bool },
    Number(Span),
    True,
    False,
    Null,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

pub(crate) struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Scanner { input, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// The text covered by `span`. Spans only ever start and end next to ASCII
    /// delimiters, so they fall on character boundaries.
    pub fn slice(&self, span: Span) -> &'a str {
        &self.input[span.offset..span.end()]
    }

    pub fn error(&self, kind: DecodeErrorKind, offset: usize) -> DecodeError {
        DecodeError::at(kind, self.input.as_bytes(), offset)
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while let Some(&b) = bytes.get(self.pos) {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                _ => break,
            }
        }
    }

    /// Skip trailing whitespace and report whether any input remains.
    pub fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.pos >= self.input.len()
    }

    pub fn next_token(&mut self) -> Result<Token, DecodeError> {
        self.skip_whitespace();
        let start = self.pos;
        let bytes = self.input.as_bytes();

        let kind = match bytes.get(start) {
            None => TokenKind::Eof,
            Some(b'{') => self.punct(TokenKind::ObjectOpen),
            Some(b'}') => self.punct(TokenKind::ObjectClose),
            Some(b'[') => self.punct(TokenKind::ArrayOpen),
            Some(b']') => self.punct(TokenKind::ArrayClose),
            Some(b':') => self.punct(TokenKind::Colon),
            Some(b',') => self.punct(TokenKind::Comma),
            Some(b'"') => self.scan_string(start)?,
            Some(b'-' | b'0'..=b'9') => self.scan_number(start),
            Some(b't') => self.scan_keyword(start, b"true", TokenKind::True)?,
            Some(b'f') => self.scan_keyword(start, b"false", TokenKind::False)?,
            Some(b'n') => self.scan_keyword(start, b"null", TokenKind::Null)?,
            Some(_) => return Err(self.error(DecodeErrorKind::UnexpectedByte, start)),
        };

        Ok(Token {
            kind,
            offset: start,
        })
    }

    fn punct(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    /// Find the closing quote. Escapes are only skipped here, not validated:
    /// the byte after a backslash can never close the literal.
    fn scan_string(&mut self, start: usize) -> Result<TokenKind, DecodeError> {
        let bytes = self.input.as_bytes();
        let mut i = start + 1;
        let mut escaped = false;

        loop {
            match bytes.get(i) {
                None => return Err(self.error(DecodeErrorKind::UnterminatedLiteral, start)),
                Some(b'"') => break,
                Some(b'\\') => {
                    escaped = true;
                    i += 2;
                }
                Some(&b) if b < 0x20 => {
                    return Err(self.error(DecodeErrorKind::UnexpectedByte, i));
                }
                Some(_) => i += 1,
            }
        }

        self.pos = i + 1;
        Ok(TokenKind::String {
            span: Span {
                offset: start + 1,
                len: i - start - 1,
            },
            escaped,
        })
    }

    /// Take the longest run of bytes that can appear in a number; the number
    /// parser checks the grammar.
    fn scan_number(&mut self, start: usize) -> TokenKind {
        let bytes = self.input.as_bytes();
        let mut i = start;
        while let Some(b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') = bytes.get(i) {
            i += 1;
        }
        self.pos = i;
        TokenKind::Number(Span {
            offset: start,
            len: i - start,
        })
    }

    fn scan_keyword(
        &mut self,
        start: usize,
        word: &[u8],
        kind: TokenKind,
    ) -> Result<TokenKind, DecodeError> {
        let rest = &self.input.as_bytes()[start..];
        for (i, &expected) in word.iter().enumerate() {
            if rest.get(i) != Some(&expected) {
                return Err(self.error(DecodeErrorKind::UnexpectedByte, start + i));
            }
        }
        self.pos = start + word.len();
        Ok(kind)
    }
}
