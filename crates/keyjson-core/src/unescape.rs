//! Escape resolution for string literals.

use crate::error::DecodeErrorKind;

/// Failure inside a literal; `at` is relative to the start of the literal body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EscapeError {
    pub kind: DecodeErrorKind,
    pub at: usize,
}

impl EscapeError {
    fn new(kind: DecodeErrorKind, at: usize) -> Self {
        EscapeError { kind, at }
    }
}

/// Resolve the escape sequences in a string literal body (the text between
/// the quotes). Surrogate pairs written as two `\u` escapes are combined into
/// one scalar; a lone surrogate is rejected.
pub(crate) fn unescape(raw: &str) -> Result<String, EscapeError> {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut run_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }
        out.push_str(&raw[run_start..i]);
        let esc = i;
        let code = *bytes
            .get(i + 1)
            .ok_or(EscapeError::new(DecodeErrorKind::InvalidEscape, esc))?;
        i += 2;

        match code {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{08}'),
            b'f' => out.push('\u{0C}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                let (ch, consumed) = decode_unicode_escape(bytes, i, esc)?;
                out.push(ch);
                i += consumed;
            }
            _ => return Err(EscapeError::new(DecodeErrorKind::InvalidEscape, esc)),
        }
        run_start = i;
    }

    out.push_str(&raw[run_start..]);
    Ok(out)
}

/// Decode the hex digits following `\u` at `i`, plus a trailing `\uXXXX` low
/// surrogate when the first unit is a high surrogate. Returns the scalar and
/// the number of bytes consumed after the initial `\u`.
fn decode_unicode_escape(
    bytes: &[u8],
    i: usize,
    esc: usize,
) -> Result<(char, usize), EscapeError> {
    let unit = hex4(bytes, i).ok_or(EscapeError::new(DecodeErrorKind::InvalidEscape, esc))?;

    let scalar = match unit {
        0xD800..=0xDBFF => {
            let lo_esc = i + 4;
            if bytes.get(lo_esc) != Some(&b'\\') || bytes.get(lo_esc + 1) != Some(&b'u') {
                return Err(EscapeError::new(DecodeErrorKind::InvalidUnicode, esc));
            }
            let low = hex4(bytes, lo_esc + 2)
                .ok_or(EscapeError::new(DecodeErrorKind::InvalidEscape, lo_esc))?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(EscapeError::new(DecodeErrorKind::InvalidUnicode, esc));
            }
            let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(combined)
                .map(|ch| (ch, 10))
                .ok_or(EscapeError::new(DecodeErrorKind::InvalidUnicode, esc));
        }
        0xDC00..=0xDFFF => return Err(EscapeError::new(DecodeErrorKind::InvalidUnicode, esc)),
        other => other,
    };

    char::from_u32(scalar)
        .map(|ch| (ch, 4))
        .ok_or(EscapeError::new(DecodeErrorKind::InvalidUnicode, esc))
}

fn hex4(bytes: &[u8], i: usize) -> Option<u32> {
    let digits = bytes.get(i..i + 4)?;
    digits
        .iter()
        .try_fold(0u32, |acc, &b| Some(acc << 4 | char::from(b).to_digit(16)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(unescape("hello, 東京").unwrap(), "hello, 東京");
    }

    #[test]
    fn short_escapes() {
        assert_eq!(
            unescape(r#"\"\\\/\b\f\n\r\t"#).unwrap(),
            "\"\\/\u{08}\u{0C}\n\r\t"
        );
    }

    #[test]
    fn bmp_unicode_escape() {
        assert_eq!(unescape(r"caf\u00e9").unwrap(), "café");
        assert_eq!(unescape(r"\u6771\u4eac").unwrap(), "東京");
        assert_eq!(unescape(r"\u0000").unwrap(), "\u{0}");
    }

    #[test]
    fn surrogate_pair_combines() {
        assert_eq!(unescape(r"\ud83d\udc08").unwrap(), "🐈");
        assert_eq!(unescape(r"x\ud83d\ude00y").unwrap(), "x😀y");
    }

    #[test]
    fn lone_high_surrogate() {
        let err = unescape(r"ab\ud83d").unwrap_err();
        assert_eq!(err, EscapeError::new(DecodeErrorKind::InvalidUnicode, 2));
        let err = unescape(r"\ud83dx").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidUnicode);
    }

    #[test]
    fn high_surrogate_followed_by_non_low() {
        let err = unescape(r"\ud83d\u0041").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidUnicode);
    }

    #[test]
    fn lone_low_surrogate() {
        let err = unescape(r"\udc08").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidUnicode);
    }

    #[test]
    fn bad_escapes() {
        for raw in [r"\x", r"\u12", r"\u12G4", r"\U0041", r"\'", "\\é"] {
            let err = unescape(raw).unwrap_err();
            assert_eq!(err.kind, DecodeErrorKind::InvalidEscape, "{raw:?}");
            assert_eq!(err.at, 0);
        }
    }

    #[test]
    fn error_offset_is_relative_to_literal() {
        let err = unescape(r"abc\q").unwrap_err();
        assert_eq!(err.at, 3);
    }
}
