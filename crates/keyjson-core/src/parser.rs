//! JSON text → [`Value`] tree.
//!
//! The parser is an explicit state machine over scanner tokens with a frame
//! stack for open containers, so nesting depth costs heap rather than native
//! stack and the depth limit is a plain length check.
//!
//! Object keys go through the key cache before any `Text` is built; string
//! values and escaped keys are built directly. On duplicate keys the last
//! occurrence wins and keeps the position of the first.

use crate::cache::KeyCache;
use crate::error::{DecodeError, DecodeErrorKind};
use crate::map::Map;
use crate::number::parse_number;
use crate::scanner::{Scanner, Span, TokenKind};
use crate::text::Text;
use crate::unescape::unescape;
use crate::value::Value;

/// Nesting limit applied when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum number of simultaneously open arrays/objects.
    pub max_depth: usize,
    /// Route short object keys through the global key cache.
    pub intern_keys: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            intern_keys: true,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        DecodeOptions::default()
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn intern_keys(mut self, intern_keys: bool) -> Self {
        self.intern_keys = intern_keys;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ExpectValue,
    ExpectKeyOrObjectClose,
    /// After a comma inside an object; a closing brace here is a trailing comma.
    ExpectKey,
    ExpectColon,
    ExpectValueInObject,
    ExpectCommaOrObjectClose,
    ExpectValueOrArrayClose,
    ExpectCommaOrArrayClose,
    Done,
    Failed,
}

enum Frame {
    Array(Vec<Value>),
    Object { map: Map, key: Option<Text> },
}

impl Frame {
    fn into_value(self) -> Value {
        match self {
            Frame::Array(items) => Value::Array(items),
            Frame::Object { map, .. } => Value::Object(map),
        }
    }
}

/// Validate `input` as UTF-8 and parse it.
pub(crate) fn parse_bytes(
    input: &[u8],
    options: &DecodeOptions,
    cache: Option<&KeyCache>,
) -> Result<Value, DecodeError> {
    let text = simdutf8::compat::from_utf8(input).map_err(|e| {
        DecodeError::at(DecodeErrorKind::InvalidEncoding, input, e.valid_up_to())
    })?;
    Parser::new(text, options, cache).parse()
}

pub(crate) struct Parser<'a> {
    scanner: Scanner<'a>,
    cache: Option<&'a KeyCache>,
    max_depth: usize,
    stack: Vec<Frame>,
    state: State,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, options: &DecodeOptions, cache: Option<&'a KeyCache>) -> Self {
        Parser {
            scanner: Scanner::new(input),
            cache,
            max_depth: options.max_depth,
            stack: Vec::new(),
            state: State::ExpectValue,
        }
    }

    /// Parse one complete document. On failure every partially built
    /// container is dropped and the parser is left in `Failed`.
    pub fn parse(&mut self) -> Result<Value, DecodeError> {
        match self.run() {
            Ok(value) => Ok(value),
            Err(err) => {
                self.state = State::Failed;
                self.stack.clear();
                Err(err)
            }
        }
    }

    fn run(&mut self) -> Result<Value, DecodeError> {
        use State::*;

        loop {
            let token = self.scanner.next_token()?;
            let value = match (self.state, token.kind) {
                (ExpectValue | ExpectValueInObject | ExpectValueOrArrayClose, kind) if is_value_start(kind) => {
                    match kind {
                        TokenKind::ObjectOpen => {
                            self.open(
                                Frame::Object {
                                    map: Map::new(),
                                    key: None,
                                },
                                token.offset,
                            )?;
                            self.state = ExpectKeyOrObjectClose;
                            continue;
                        }
                        TokenKind::ArrayOpen => {
                            self.open(Frame::Array(Vec::new()), token.offset)?;
                            self.state = ExpectValueOrArrayClose;
                            continue;
                        }
                        TokenKind::String { span, escaped } => {
                            Value::Text(self.string(span, escaped)?)
                        }
                        TokenKind::Number(span) => self.number(span)?,
                        TokenKind::True => Value::Bool(true),
                        TokenKind::False => Value::Bool(false),
                        _ => Value::Null,
                    }
                }

                (ExpectValueOrArrayClose | ExpectCommaOrArrayClose, TokenKind::ArrayClose)
                | (ExpectKeyOrObjectClose | ExpectCommaOrObjectClose, TokenKind::ObjectClose) => {
                    self.close(token.offset)?
                }

                (ExpectKeyOrObjectClose | ExpectKey, TokenKind::String { span, escaped }) => {
                    let key = self.key(span, escaped)?;
                    if let Some(Frame::Object { key: pending, .. }) = self.stack.last_mut() {
                        *pending = Some(key);
                    }
                    self.state = ExpectColon;
                    continue;
                }
                (ExpectKey, TokenKind::ObjectClose) => {
                    return Err(self.fail(DecodeErrorKind::UnexpectedByte, token.offset));
                }
                (ExpectKeyOrObjectClose | ExpectKey, kind) if kind != TokenKind::Eof => {
                    return Err(self.fail(DecodeErrorKind::ObjectKeyNotString, token.offset));
                }

                (ExpectColon, TokenKind::Colon) => {
                    self.state = ExpectValueInObject;
                    continue;
                }
                (ExpectCommaOrObjectClose, TokenKind::Comma) => {
                    self.state = ExpectKey;
                    continue;
                }
                (ExpectCommaOrArrayClose, TokenKind::Comma) => {
                    self.state = ExpectValue;
                    continue;
                }

                (ExpectValue, TokenKind::Eof) if self.stack.is_empty() => {
                    return Err(self.fail(DecodeErrorKind::EmptyDocument, token.offset));
                }
                (_, TokenKind::Eof) => {
                    return Err(self.fail(DecodeErrorKind::UnexpectedEnd, token.offset));
                }
                _ => return Err(self.fail(DecodeErrorKind::UnexpectedByte, token.offset)),
            };

            match self.stack.last_mut() {
                None => {
                    self.state = Done;
                    if !self.scanner.at_end() {
                        let at = self.scanner.position();
                        return Err(self.fail(DecodeErrorKind::TrailingData, at));
                    }
                    return Ok(value);
                }
                Some(Frame::Array(items)) => {
                    items.push(value);
                    self.state = ExpectCommaOrArrayClose;
                }
                Some(Frame::Object { map, key }) => {
                    if let Some(key) = key.take() {
                        map.insert(key, value);
                    }
                    self.state = ExpectCommaOrObjectClose;
                }
            }
        }
    }

    fn fail(&self, kind: DecodeErrorKind, offset: usize) -> DecodeError {
        self.scanner.error(kind, offset)
    }

    fn open(&mut self, frame: Frame, offset: usize) -> Result<(), DecodeError> {
        if self.stack.len() >= self.max_depth {
            return Err(self.fail(DecodeErrorKind::MaxDepthExceeded, offset));
        }
        self.stack.push(frame);
        Ok(())
    }

    fn close(&mut self, offset: usize) -> Result<Value, DecodeError> {
        match self.stack.pop() {
            Some(frame) => Ok(frame.into_value()),
            None => Err(self.fail(DecodeErrorKind::UnexpectedByte, offset)),
        }
    }

    fn key(&self, span: Span, escaped: bool) -> Result<Text, DecodeError> {
        if escaped {
            return self.unescaped(span).map(Text::from);
        }
        let raw = self.scanner.slice(span);
        Ok(match self.cache {
            Some(cache) => cache.intern(raw),
            None => Text::from(raw),
        })
    }

    fn string(&self, span: Span, escaped: bool) -> Result<Text, DecodeError> {
        if escaped {
            self.unescaped(span).map(Text::from)
        } else {
            Ok(Text::from(self.scanner.slice(span)))
        }
    }

    fn unescaped(&self, span: Span) -> Result<String, DecodeError> {
        unescape(self.scanner.slice(span)).map_err(|e| self.fail(e.kind, span.offset + e.at))
    }

    fn number(&self, span: Span) -> Result<Value, DecodeError> {
        parse_number(self.scanner.slice(span))
            .ok_or_else(|| self.fail(DecodeErrorKind::InvalidNumber, span.offset))
    }
}

fn is_value_start(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::ObjectOpen
            | TokenKind::ArrayOpen
            | TokenKind::String { .. }
            | TokenKind::Number(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
    )
}
