//! # keyjson-core
//!
//! A compact JSON parser and serializer tuned for record-heavy documents:
//! arrays of objects that repeat the same key names, and large collections with
//! tens of thousands of entries.
//!
//! Short object keys are interned through a bounded, process-wide cache so
//! repeated keys share one allocation, while memory stays flat no matter how
//! many distinct keys a workload touches. Objects keep insertion order with
//! ordered-dict semantics, duplicate keys resolve to the last occurrence, and
//! output is always compact.
//!
//! ## Quick start
//!
//! ```rust
//! use keyjson_core::{parse, serialize_to_string, Value};
//!
//! let value = parse(br#"{"name":"Alice","scores":[95,87.5]}"#).unwrap();
//! assert_eq!(value["name"].as_str(), Some("Alice"));
//! assert_eq!(value["scores"][1], Value::Float(87.5));
//!
//! let json = serialize_to_string(&value).unwrap();
//! assert_eq!(json, r#"{"name":"Alice","scores":[95,87.5]}"#);
//! ```
//!
//! ## Modules
//!
//! - [`parser`]: JSON bytes → [`Value`] (state machine, depth limit)
//! - [`serializer`]: [`Value`] or any [`Encode`] type → JSON bytes
//! - [`cache`]: the key-interning cache
//! - [`value`], [`map`], [`text`]: the value tree
//! - [`error`]: decode/encode error kinds with input positions

pub mod cache;
pub mod error;
pub mod map;
mod number;
pub mod parser;
mod scanner;
pub mod serializer;
pub mod text;
mod unescape;
pub mod value;

pub use cache::{CacheStats, KeyCache, KEY_CACHE_SLOTS, MAX_CACHED_KEY_LEN};
pub use error::{DecodeError, DecodeErrorKind, EncodeError, EncodeErrorKind, Error, Result};
pub use map::Map;
pub use parser::{DecodeOptions, DEFAULT_MAX_DEPTH};
pub use serializer::{Encode, Key, Serializer, Shape};
pub use text::Text;
pub use value::Value;

/// Parse a complete JSON document with default options.
///
/// The input must be UTF-8 and contain exactly one value, optionally
/// surrounded by whitespace.
pub fn parse(input: &[u8]) -> std::result::Result<Value, DecodeError> {
    parse_with(input, &DecodeOptions::default())
}

/// [`parse`] for text that is already a `str`.
pub fn parse_str(input: &str) -> std::result::Result<Value, DecodeError> {
    parse(input.as_bytes())
}

/// Parse with explicit options. Key interning, when enabled, uses
/// [`KeyCache::global`].
pub fn parse_with(
    input: &[u8],
    options: &DecodeOptions,
) -> std::result::Result<Value, DecodeError> {
    let cache = options.intern_keys.then(KeyCache::global);
    parser::parse_bytes(input, options, cache)
}

/// Parse interning keys through a caller-owned cache instead of the global one.
/// `options.intern_keys` is ignored.
pub fn parse_with_cache(
    input: &[u8],
    options: &DecodeOptions,
    cache: &KeyCache,
) -> std::result::Result<Value, DecodeError> {
    parser::parse_bytes(input, options, Some(cache))
}

/// Serialize to compact JSON bytes (always valid UTF-8).
pub fn serialize<T: Encode + ?Sized>(value: &T) -> std::result::Result<Vec<u8>, EncodeError> {
    Serializer::new().serialize(value)
}

/// Serialize to a compact JSON `String`.
pub fn serialize_to_string<T: Encode + ?Sized>(
    value: &T,
) -> std::result::Result<String, EncodeError> {
    Serializer::new().serialize_to_string(value)
}

/// Parse `input` and write it back out compactly.
pub fn minify(input: &[u8]) -> Result<String> {
    let value = parse(input)?;
    Ok(serialize_to_string(&value)?)
}
