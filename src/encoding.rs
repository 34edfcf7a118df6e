use std::fmt::Write;
use std::str::{self, CharIndices};

/// Characters that whole-path encoding leaves untouched.
fn is_unescaped(c: char) -> bool {
    matches!(
        c,
        'A'..='Z'
            | 'a'..='z'
            | '0'..='9'
            | '-'
            | '_'
            | '.'
            | '!'
            | '~'
            | '*'
            | '\''
            | '('
            | ')'
    ) || is_reserved(c)
        || c == '#'
}

/// Characters whose escapes survive whole-path decoding.
fn is_reserved(c: char) -> bool {
    matches!(
        c,
        ';' | '/' | '?' | ':' | '@' | '&' | '=' | '+' | '$' | ',' | '#'
    )
}

fn encode_char(ch: char, out: &mut String) {
    for b in ch.encode_utf8(&mut [0; 4]).as_bytes() {
        write!(out, "%{b:02X}").unwrap();
    }
}

/// Percent-encodes an assembled path in one pass.
///
/// `%` is always escaped, so encoding is never idempotent: `%41` becomes `%2541`.
pub(crate) fn encode_path(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if is_unescaped(ch) {
            out.push(ch);
        } else {
            encode_char(ch, &mut out);
        }
    }
    out
}

/// Percent-decodes a whole path before it is split into segments.
///
/// Escapes that decode to a reserved character (`%2F`, `%3F`, ...) are kept
/// verbatim so that decoding can never introduce a new `/`. Returns `None` on
/// a truncated escape or an invalid UTF-8 sequence.
pub(crate) fn decode_path(s: &str) -> Option<String> {
    let mut out = Decoder::new(s);
    for d in DecodedIter::new(s) {
        match d {
            Decoded::Char { index, ch: '%' } => {
                tracing::trace!(input = s, index, "truncated percent escape");
                return None;
            }
            Decoded::Char { ch, .. } => out.push_char(ch)?,
            Decoded::Byte { b, s, .. } => out.push_byte(b, s),
        }
    }
    out.build()
}

struct Decoder<'a> {
    source: &'a str,
    out: String,
    bytes: Vec<u8>,
    escapes: Vec<&'a str>,
}
impl<'a> Decoder<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            out: String::with_capacity(source.len()),
            bytes: Vec::new(),
            escapes: Vec::new(),
        }
    }
    fn push_char(&mut self, ch: char) -> Option<()> {
        self.commit_bytes()?;
        self.out.push(ch);
        Some(())
    }
    fn push_byte(&mut self, b: u8, escape: &'a str) {
        self.bytes.push(b);
        self.escapes.push(escape);
    }
    fn commit_bytes(&mut self) -> Option<()> {
        if self.bytes.is_empty() {
            return Some(());
        }
        let Ok(decoded) = str::from_utf8(&self.bytes) else {
            tracing::trace!(input = self.source, "invalid utf-8 in percent escapes");
            return None;
        };
        let mut offset = 0;
        for ch in decoded.chars() {
            if is_reserved(ch) {
                self.out.push_str(self.escapes[offset]);
            } else {
                self.out.push(ch);
            }
            offset += ch.len_utf8();
        }
        self.bytes.clear();
        self.escapes.clear();
        Some(())
    }
    fn build(mut self) -> Option<String> {
        self.commit_bytes()?;
        Some(self.out)
    }
}

fn to_u8(c: char) -> Option<u8> {
    match c {
        '0'..='9' => Some(c as u8 - b'0'),
        'a'..='f' => Some(c as u8 - b'a' + 10),
        'A'..='F' => Some(c as u8 - b'A' + 10),
        _ => None,
    }
}

#[derive(Clone, Copy)]
enum Decoded<'a> {
    Char { index: usize, ch: char },
    Byte { b: u8, s: &'a str },
}

#[derive(Clone)]
struct DecodedIter<'a> {
    source: &'a str,
    chars_indices: CharIndices<'a>,
}
impl<'a> DecodedIter<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars_indices: source.char_indices(),
        }
    }
}
impl<'a> Iterator for DecodedIter<'a> {
    type Item = Decoded<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, ch) = self.chars_indices.next()?;
        if ch == '%' {
            let this = self.clone();
            if let Some(b) = next_decoded_u8(&mut self.chars_indices) {
                Some(Decoded::Byte {
                    b,
                    s: &self.source[index..][..3],
                })
            } else {
                *self = this;
                Some(Decoded::Char { index, ch: '%' })
            }
        } else {
            Some(Decoded::Char { index, ch })
        }
    }
}

fn next_decoded_u8(chars_indices: &mut CharIndices) -> Option<u8> {
    let c0 = next_hex(chars_indices)?;
    let c1 = next_hex(chars_indices)?;
    Some(c0 * 16 + c1)
}
fn next_hex(chars_indices: &mut CharIndices) -> Option<u8> {
    let (_, c) = chars_indices.next()?;
    to_u8(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_keeps_uri_characters() {
        assert_eq!(encode_path("/a/b?c=d#e"), "/a/b?c=d#e");
        assert_eq!(encode_path("/it's(ok)*!~"), "/it's(ok)*!~");
    }

    #[test]
    fn encode_escapes_the_rest() {
        assert_eq!(encode_path("/a b"), "/a%20b");
        assert_eq!(encode_path("/あ"), "/%E3%81%82");
        assert_eq!(encode_path("/100%"), "/100%25");
        assert_eq!(encode_path("/[x]"), "/%5Bx%5D");
    }

    #[test]
    fn decode_plain_and_multibyte() {
        assert_eq!(decode_path("/a%20b").as_deref(), Some("/a b"));
        assert_eq!(decode_path("/%E3%81%82").as_deref(), Some("/あ"));
        assert_eq!(decode_path("/%e3%81%82").as_deref(), Some("/あ"));
        assert_eq!(decode_path("/100%25").as_deref(), Some("/100%"));
    }

    #[test]
    fn decode_keeps_reserved_escapes() {
        assert_eq!(decode_path("/a%2Fb").as_deref(), Some("/a%2Fb"));
        assert_eq!(decode_path("/a%3fb").as_deref(), Some("/a%3fb"));
        assert_eq!(decode_path("/%23%41").as_deref(), Some("/%23A"));
    }

    #[test]
    fn decode_rejects_malformed_input() {
        assert_eq!(decode_path("/%"), None);
        assert_eq!(decode_path("/%2"), None);
        assert_eq!(decode_path("/%2G"), None);
        assert_eq!(decode_path("/%F8%28"), None);
        assert_eq!(decode_path("/%C0%A0"), None);
        assert_eq!(decode_path("/%D0"), None);
        assert_eq!(decode_path("/%E4%B8/x"), None);
    }
}
