//! Error types for parsing and serialization.
//!
//! Every error carries a machine-checkable kind so callers can map failures onto
//! their own error representation. Decode errors also record where in the input
//! the failure was detected.

use thiserror::Error;

/// What went wrong while parsing JSON text.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    /// The input was empty or contained only whitespace.
    #[error("input is empty")]
    EmptyDocument,

    /// A byte that cannot start or continue a token at this position.
    #[error("unexpected byte")]
    UnexpectedByte,

    /// The input ended inside an array or object.
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// A string literal was not closed before the end of input.
    #[error("unterminated string literal")]
    UnterminatedLiteral,

    /// A numeric literal did not match the JSON number grammar, or overflowed to
    /// infinity.
    #[error("invalid number")]
    InvalidNumber,

    /// An unknown escape sequence or malformed `\u` hex digits.
    #[error("invalid escape sequence")]
    InvalidEscape,

    /// A `\u` escape produced an unpaired surrogate.
    #[error("unpaired surrogate in \\u escape")]
    InvalidUnicode,

    /// The input is not valid UTF-8.
    #[error("input is not valid UTF-8")]
    InvalidEncoding,

    /// Something other than a string literal appeared in object-key position.
    #[error("object key must be a string")]
    ObjectKeyNotString,

    /// Arrays and objects were nested deeper than the configured limit.
    #[error("maximum nesting depth exceeded")]
    MaxDepthExceeded,

    /// Non-whitespace input followed the top-level value.
    #[error("trailing data after document")]
    TrailingData,
}

/// A parse failure with its position in the input.
///
/// `offset` is a byte offset; `line` and `column` are 1-based, with the column
/// counted in characters from the start of the line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at line {line}, column {column} (byte {offset})")]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl DecodeError {
    /// Build an error for `kind` detected at `offset` in `input`, deriving the
    /// line and column from the bytes before the offset.
    pub(crate) fn at(kind: DecodeErrorKind, input: &[u8], offset: usize) -> Self {
        let offset = offset.min(input.len());
        let before = &input[..offset];
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |pos| pos + 1);
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        // Count UTF-8 lead bytes so multi-byte characters advance the column once.
        let column = before[line_start..]
            .iter()
            .filter(|&&b| b & 0xC0 != 0x80)
            .count()
            + 1;
        DecodeError {
            kind,
            offset,
            line,
            column,
        }
    }
}

/// What went wrong while serializing a value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodeErrorKind {
    /// A mapping key was not text (e.g. an integer or a byte string).
    #[error("mapping key must be a string")]
    KeyNotString,

    /// A value of a type the serializer does not know, with no substitute from the
    /// default hook.
    #[error("type is not JSON serializable")]
    UnsupportedType,

    /// A float was NaN or infinite; JSON has no literal for these.
    #[error("float is NaN or infinite")]
    NonFiniteFloat,

    /// Containers were nested deeper than the configured limit.
    #[error("maximum nesting depth exceeded")]
    MaxDepthExceeded,
}

/// A serialization failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("serialization failed: {kind}")]
pub struct EncodeError {
    pub kind: EncodeErrorKind,
}

impl From<EncodeErrorKind> for EncodeError {
    fn from(kind: EncodeErrorKind) -> Self {
        EncodeError { kind }
    }
}

/// Either direction's failure, for callers that parse and serialize in one flow.
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("JSON encode error: {0}")]
    Encode(#[from] EncodeError),
}

/// Convenience alias used throughout keyjson-core.
pub type Result<T> = std::result::Result<T, Error>;
