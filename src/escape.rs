//! Byte escaping for shell arguments and output.
//!
//! Arguments may carry raw bytes as `\xHH` literals, and `\\` stands for a
//! single backslash. Output goes the other way: keys and values are printed as
//! double-quoted strings with anything unprintable escaped.

use std::fmt::Write;

use crate::error::{Error, Result};

/// Decode `\xHH` and `\\` sequences in `input` into raw bytes.
///
/// A backslash before any other character yields that character. A `\x` too
/// close to the end of the input to carry two digits is a literal `x`.
pub fn unescape(input: &str) -> Result<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut escaped = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\\' if !escaped => escaped = true,
            b'x' if escaped => {
                escaped = false;
                match bytes.get(i + 1..i + 3) {
                    Some(digits) => {
                        out.push(decode_hex_pair(digits).ok_or_else(|| {
                            Error::parse(format!(
                                "invalid hex escape \\x{} in {:?}",
                                String::from_utf8_lossy(digits),
                                input
                            ))
                        })?);
                        i += 2;
                    }
                    None => out.push(b'x'),
                }
            }
            _ => {
                escaped = false;
                out.push(b);
            }
        }
        i += 1;
    }
    Ok(out)
}

fn decode_hex_pair(digits: &[u8]) -> Option<u8> {
    let hi = (digits[0] as char).to_digit(16)?;
    let lo = (digits[1] as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

/// Render bytes as a double-quoted, escaped string.
///
/// Valid UTF-8 text is kept as is apart from quotes, backslashes and
/// characters that do not print; those use the short escapes (`\n`, `\a`),
/// `\xHH` for ASCII controls and `\uHHHH` / `\UHHHHHHHH` otherwise. Bytes that
/// are not valid UTF-8 come out as `\xHH`.
pub fn quote(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');

    let mut rest = bytes;
    while !rest.is_empty() {
        match std::str::from_utf8(rest) {
            Ok(text) => {
                push_escaped(&mut out, text);
                break;
            }
            Err(e) => {
                let (valid, invalid) = rest.split_at(e.valid_up_to());
                push_escaped(&mut out, std::str::from_utf8(valid).unwrap_or_default());
                let bad = e.error_len().unwrap_or(invalid.len());
                for b in &invalid[..bad] {
                    let _ = write!(out, "\\x{:02x}", b);
                }
                rest = &invalid[bad..];
            }
        }
    }

    out.push('"');
    out
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\x0c' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0b' => out.push_str("\\v"),
            c if c < ' ' || c == '\x7f' => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c if is_printable(c) => out.push(c),
            c if (c as u32) < 0x10000 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => {
                let _ = write!(out, "\\U{:08x}", c as u32);
            }
        }
    }
}

/// Whether `c` can be shown as itself. Spaces other than U+0020, control and
/// format characters, and private-use code points are escaped.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(
        c as u32,
        0x00ad
            | 0x0600..=0x0605
            | 0x061c
            | 0x06dd
            | 0x070f
            | 0x180e
            | 0x200b..=0x200f
            | 0x202a..=0x202e
            | 0x2060..=0x206f
            | 0xe000..=0xf8ff
            | 0xfeff
            | 0xfff9..=0xfffb
            | 0xe0001
            | 0xe0020..=0xe007f
            | 0xf0000..=0x10ffff
    )
}
