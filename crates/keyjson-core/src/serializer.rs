//! Value tree (or any [`Encode`] type) → compact JSON text.
//!
//! Output has no insignificant whitespace. Strings escape `"`, `\` and control
//! characters; everything else, including non-ASCII text, is written as UTF-8.
//! Floats use the shortest representation that parses back to the same bits
//! and always carry a `.` or an exponent so they stay floats on re-parse.
//!
//! Foreign trees are serialized through the [`Encode`] trait without first
//! being converted to a [`Value`]. Anything that reports [`Shape::Unknown`] is
//! offered to the default hook; if there is no hook or it declines, the whole
//! call fails and nothing is returned.

use crate::error::{EncodeError, EncodeErrorKind};
use crate::parser::DEFAULT_MAX_DEPTH;
use crate::value::Value;

/// A mapping key as reported by an [`Encode`] implementation. Only
/// [`Key::Text`] can be serialized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Key<'a> {
    Text(&'a str),
    Int(i64),
    Bytes(&'a [u8]),
    Other,
}

/// How a value presents itself to the serializer.
pub enum Shape<'a, T: ?Sized> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(&'a str),
    Sequence(Box<dyn Iterator<Item = &'a T> + 'a>),
    /// Entries in the mapping's iteration order.
    Mapping(Box<dyn Iterator<Item = (Key<'a>, &'a T)> + 'a>),
    /// Not representable without help from the default hook.
    Unknown,
}

/// Types the serializer can walk.
pub trait Encode {
    fn shape(&self) -> Shape<'_, Self>;

    /// Types that are a [`Value`] return it here so the serializer can walk
    /// the tree directly.
    fn as_value(&self) -> Option<&Value> {
        None
    }
}

impl Encode for Value {
    fn shape(&self) -> Shape<'_, Self> {
        match self {
            Value::Null => Shape::Null,
            Value::Bool(b) => Shape::Bool(*b),
            Value::Int(i) => Shape::Int(*i),
            Value::Float(f) => Shape::Float(*f),
            Value::Text(t) => Shape::Text(t.as_str()),
            Value::Array(items) => Shape::Sequence(Box::new(items.iter())),
            Value::Object(map) => {
                Shape::Mapping(Box::new(map.iter().map(|(k, v)| (Key::Text(k.as_str()), v))))
            }
        }
    }

    fn as_value(&self) -> Option<&Value> {
        Some(self)
    }
}

impl Encode for serde_json::Value {
    /// Numbers outside `i64` are written as floats.
    fn shape(&self) -> Shape<'_, Self> {
        match self {
            serde_json::Value::Null => Shape::Null,
            serde_json::Value::Bool(b) => Shape::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Shape::Int(i),
                None => n.as_f64().map_or(Shape::Unknown, Shape::Float),
            },
            serde_json::Value::String(s) => Shape::Text(s),
            serde_json::Value::Array(items) => Shape::Sequence(Box::new(items.iter())),
            serde_json::Value::Object(map) => {
                Shape::Mapping(Box::new(map.iter().map(|(k, v)| (Key::Text(k.as_str()), v))))
            }
        }
    }
}

/// Configurable serializer. [`crate::serialize`] is `Serializer::new().serialize`.
pub struct Serializer<'h, T: ?Sized> {
    max_depth: usize,
    default: Option<&'h dyn Fn(&T) -> Option<Value>>,
}

impl<'h, T: Encode + ?Sized> Default for Serializer<'h, T> {
    fn default() -> Self {
        Serializer {
            max_depth: DEFAULT_MAX_DEPTH,
            default: None,
        }
    }
}

impl<'h, T: Encode + ?Sized> Serializer<'h, T> {
    pub fn new() -> Self {
        Serializer::default()
    }

    /// Maximum number of nested arrays/objects.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Hook consulted for [`Shape::Unknown`] values. Returning `None` fails the
    /// call with `UnsupportedType`.
    pub fn default_hook(mut self, hook: &'h dyn Fn(&T) -> Option<Value>) -> Self {
        self.default = Some(hook);
        self
    }

    pub fn serialize(&self, value: &T) -> Result<Vec<u8>, EncodeError> {
        self.serialize_to_string(value).map(String::into_bytes)
    }

    pub fn serialize_to_string(&self, value: &T) -> Result<String, EncodeError> {
        let mut writer = Writer {
            out: String::with_capacity(128),
            max_depth: self.max_depth,
        };
        writer.write_encode(value, 0, self.default)?;
        Ok(writer.out)
    }
}

struct Writer {
    out: String,
    max_depth: usize,
}

impl Writer {
    fn enter(&self, depth: usize) -> Result<usize, EncodeError> {
        if depth >= self.max_depth {
            return Err(EncodeErrorKind::MaxDepthExceeded.into());
        }
        Ok(depth + 1)
    }

    fn write_encode<T: Encode + ?Sized>(
        &mut self,
        value: &T,
        depth: usize,
        hook: Option<&dyn Fn(&T) -> Option<Value>>,
    ) -> Result<(), EncodeError> {
        if let Some(value) = value.as_value() {
            return self.write_value(value, depth);
        }

        match value.shape() {
            Shape::Null => self.out.push_str("null"),
            Shape::Bool(b) => self.out.push_str(if b { "true" } else { "false" }),
            Shape::Int(i) => self.write_int(i),
            Shape::Float(f) => self.write_float(f)?,
            Shape::Text(s) => write_escaped(&mut self.out, s),
            Shape::Sequence(items) => {
                let depth = self.enter(depth)?;
                self.out.push('[');
                for (i, item) in items.enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.write_encode(item, depth, hook)?;
                }
                self.out.push(']');
            }
            Shape::Mapping(entries) => {
                let depth = self.enter(depth)?;
                self.out.push('{');
                for (i, (key, item)) in entries.enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    match key {
                        Key::Text(k) => write_escaped(&mut self.out, k),
                        _ => return Err(EncodeErrorKind::KeyNotString.into()),
                    }
                    self.out.push(':');
                    self.write_encode(item, depth, hook)?;
                }
                self.out.push('}');
            }
            Shape::Unknown => {
                let substitute = hook
                    .and_then(|hook| hook(value))
                    .ok_or(EncodeError::from(EncodeErrorKind::UnsupportedType))?;
                self.write_value(&substitute, depth)?;
            }
        }
        Ok(())
    }

    fn write_value(&mut self, value: &Value, depth: usize) -> Result<(), EncodeError> {
        match value {
            Value::Null => self.out.push_str("null"),
            Value::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Int(i) => self.write_int(*i),
            Value::Float(f) => self.write_float(*f)?,
            Value::Text(t) => write_escaped(&mut self.out, t),
            Value::Array(items) => {
                let depth = self.enter(depth)?;
                self.out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.write_value(item, depth)?;
                }
                self.out.push(']');
            }
            Value::Object(map) => {
                let depth = self.enter(depth)?;
                self.out.push('{');
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    write_escaped(&mut self.out, key);
                    self.out.push(':');
                    self.write_value(item, depth)?;
                }
                self.out.push('}');
            }
        }
        Ok(())
    }

    fn write_int(&mut self, i: i64) {
        let mut buf = itoa::Buffer::new();
        self.out.push_str(buf.format(i));
    }

    fn write_float(&mut self, f: f64) -> Result<(), EncodeError> {
        if !f.is_finite() {
            return Err(EncodeErrorKind::NonFiniteFloat.into());
        }
        // `Debug` is the shortest round-trip form and keeps a `.0` on whole
        // numbers.
        self.out.push_str(&format!("{f:?}"));
        Ok(())
    }
}

const BB: u8 = b'b';
const TT: u8 = b't';
const NN: u8 = b'n';
const FF: u8 = b'f';
const RR: u8 = b'r';
const QU: u8 = b'"';
const BS: u8 = b'\\';
const UU: u8 = b'u';
const __: u8 = 0;

/// Escape code per byte: 0 means copy as is, `u` means `\u00XX`, anything else
/// is the letter following the backslash.
static ESCAPE: [u8; 256] = [
    //   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
    UU, UU, UU, UU, UU, UU, UU, UU, BB, TT, NN, UU, FF, RR, UU, UU, // 0
    UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, // 1
    __, __, QU, __, __, __, __, __, __, __, __, __, __, __, __, __, // 2
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 3
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 4
    __, __, __, __, __, __, __, __, __, __, __, __, BS, __, __, __, // 5
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 6
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 7
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 8
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 9
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // A
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // B
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // C
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // D
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // E
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // F
];

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Append `s` as a quoted JSON string.
fn write_escaped(out: &mut String, s: &str) {
    out.push('"');
    let bytes = s.as_bytes();
    let mut start = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        let escape = ESCAPE[byte as usize];
        if escape == 0 {
            continue;
        }
        // Escaped bytes are all ASCII, so `i` is a character boundary.
        out.push_str(&s[start..i]);
        out.push('\\');
        if escape == UU {
            out.push_str("u00");
            out.push(char::from(HEX[(byte >> 4) as usize]));
            out.push(char::from(HEX[(byte & 0xF) as usize]));
        } else {
            out.push(char::from(escape));
        }
        start = i + 1;
    }

    out.push_str(&s[start..]);
    out.push('"');
}
