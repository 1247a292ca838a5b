//! Content-preserving JSON text decoding.
//!
//! [`from_str`](crate::validate::from_str) refuses anything outside the JSON
//! data model. Reading a received envelope needs the opposite: a tampered
//! payload has to come back exactly as sent, so that the canonicalizer is
//! the one to reject it. [`parse_preserving`] keeps:
//! - `\uXXXX` escapes as raw UTF-16 code units, unpaired surrogates included
//! - repeated object keys, in document order
//! - numbers beyond the f64 range, as infinities
//!
//! Malformed syntax is still an error.

use crate::error::{ValidationError, ValidationResult};
use crate::value::{JsonString, JsonValue};

/// Nesting bound for decoding.
pub const MAX_PARSE_DEPTH: usize = 512;

/// Decode JSON text without applying data-model rules.
pub fn parse_preserving(text: &str) -> ValidationResult<JsonValue> {
    let mut parser = Parser {
        text,
        pos: 0,
        depth: 0,
    };
    parser.skip_whitespace();
    let value = parser.value()?;
    parser.skip_whitespace();
    if parser.pos != text.len() {
        return Err(parser.error("trailing characters"));
    }
    Ok(value)
}

struct Parser<'a> {
    text: &'a str,
    /// Byte offset; always on a char boundary between tokens.
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, reason: &str) -> ValidationError {
        ValidationError::new("$", format!("{reason} at byte {}", self.pos))
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn value(&mut self) -> ValidationResult<JsonValue> {
        match self.peek() {
            Some(b'n') => self.literal("null", JsonValue::Null),
            Some(b't') => self.literal("true", JsonValue::Bool(true)),
            Some(b'f') => self.literal("false", JsonValue::Bool(false)),
            Some(b'"') => Ok(JsonValue::String(self.string()?)),
            Some(b'[') => self.array(),
            Some(b'{') => self.object(),
            Some(b'-' | b'0'..=b'9') => self.number(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn literal(&mut self, literal: &str, value: JsonValue) -> ValidationResult<JsonValue> {
        if self.bytes()[self.pos..].starts_with(literal.as_bytes()) {
            self.pos += literal.len();
            Ok(value)
        } else {
            Err(self.error("invalid literal"))
        }
    }

    /// Step over an opening bracket.
    fn enter(&mut self) -> ValidationResult<()> {
        self.depth += 1;
        if self.depth > MAX_PARSE_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.pos += 1;
        self.skip_whitespace();
        Ok(())
    }

    fn array(&mut self) -> ValidationResult<JsonValue> {
        self.enter()?;
        let mut items = Vec::new();
        if !self.eat(b']') {
            loop {
                items.push(self.value()?);
                self.skip_whitespace();
                if self.eat(b']') {
                    break;
                }
                if !self.eat(b',') {
                    return Err(self.error("expected ',' or ']'"));
                }
                self.skip_whitespace();
            }
        }
        self.depth -= 1;
        Ok(JsonValue::Array(items))
    }

    fn object(&mut self) -> ValidationResult<JsonValue> {
        self.enter()?;
        let mut members = Vec::new();
        if !self.eat(b'}') {
            loop {
                if self.peek() != Some(b'"') {
                    return Err(self.error("expected string key"));
                }
                let key = self.string()?;
                self.skip_whitespace();
                if !self.eat(b':') {
                    return Err(self.error("expected ':'"));
                }
                self.skip_whitespace();
                members.push((key, self.value()?));
                self.skip_whitespace();
                if self.eat(b'}') {
                    break;
                }
                if !self.eat(b',') {
                    return Err(self.error("expected ',' or '}'"));
                }
                self.skip_whitespace();
            }
        }
        self.depth -= 1;
        Ok(JsonValue::Object(members))
    }

    fn string(&mut self) -> ValidationResult<JsonString> {
        // Opening quote
        self.pos += 1;
        let mut units = Vec::new();
        loop {
            let start = self.pos;
            while matches!(self.peek(), Some(b) if b != b'"' && b != b'\\' && b >= 0x20) {
                self.pos += 1;
            }
            // Both ends sit next to ASCII bytes, so this is a char boundary
            units.extend(self.text[start..self.pos].encode_utf16());

            match self.peek() {
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(JsonString::from_utf16(units));
                }
                Some(b'\\') => {
                    self.pos += 1;
                    units.push(self.escape()?);
                }
                Some(_) => return Err(self.error("control character in string")),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    /// Decode one escape to a single code unit. Surrogates are not paired
    /// here; a pair is simply two consecutive units.
    fn escape(&mut self) -> ValidationResult<u16> {
        let unit = match self.peek() {
            Some(b'"') => 0x22,
            Some(b'\\') => 0x5C,
            Some(b'/') => 0x2F,
            Some(b'b') => 0x08,
            Some(b'f') => 0x0C,
            Some(b'n') => 0x0A,
            Some(b'r') => 0x0D,
            Some(b't') => 0x09,
            Some(b'u') => {
                let unit = self
                    .bytes()
                    .get(self.pos + 1..self.pos + 5)
                    .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|hex| std::str::from_utf8(hex).ok())
                    .and_then(|hex| u16::from_str_radix(hex, 16).ok())
                    .ok_or_else(|| self.error("invalid \\u escape"))?;
                self.pos += 5;
                return Ok(unit);
            }
            _ => return Err(self.error("invalid escape")),
        };
        self.pos += 1;
        Ok(unit)
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn number(&mut self) -> ValidationResult<JsonValue> {
        let start = self.pos;
        self.eat(b'-');
        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => {
                self.digits();
            }
            _ => return Err(self.error("invalid number")),
        }
        if self.eat(b'.') && self.digits() == 0 {
            return Err(self.error("invalid number"));
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if !self.eat(b'+') {
                self.eat(b'-');
            }
            if self.digits() == 0 {
                return Err(self.error("invalid number"));
            }
        }

        // Overflow parses to an infinity
        let n: f64 = self.text[start..self.pos]
            .parse()
            .map_err(|_| self.error("invalid number"))?;
        Ok(JsonValue::Number(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::canonicalize;
    use crate::error::CanonicalError;
    use crate::validate::from_str;

    #[test]
    fn test_agrees_with_strict_decoding_on_valid_json() {
        let texts = [
            r#"{"id":1,"data":"test","nested":{"list":[true,false,null,-0.5,1e21]}}"#,
            r#" [ "a\/b" , "é😀" , "\b\f\n\r\t\"\\" ] "#,
            "0",
            "-0",
            "123.456e-7",
            r#""""#,
            "{}",
        ];
        for text in texts {
            assert_eq!(parse_preserving(text).unwrap(), from_str(text).unwrap(), "{text}");
        }
    }

    #[test]
    fn test_keeps_unpaired_surrogates() {
        let value = parse_preserving(r#""x\udc00""#).unwrap();
        assert_eq!(
            value,
            JsonValue::String(JsonString::from_utf16(vec![0x78, 0xDC00]))
        );
        assert_eq!(
            canonicalize(&value),
            Err(CanonicalError::InvalidSurrogate {
                index: 1,
                unit: 0xDC00
            })
        );
    }

    #[test]
    fn test_keeps_duplicate_members() {
        let value = parse_preserving(r#"{"a":1,"a":2}"#).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 2);
        assert_eq!(
            canonicalize(&value),
            Err(CanonicalError::DuplicateKey("a".into()))
        );
    }

    #[test]
    fn test_overflow_becomes_infinity() {
        assert_eq!(
            parse_preserving("1e400").unwrap(),
            JsonValue::Number(f64::INFINITY)
        );
        assert_eq!(
            parse_preserving("-1e400").unwrap(),
            JsonValue::Number(f64::NEG_INFINITY)
        );
        assert_eq!(
            canonicalize(&parse_preserving("[1e400]").unwrap()),
            Err(CanonicalError::NonFiniteNumber)
        );
    }

    #[test]
    fn test_rejects_bad_syntax() {
        let texts = [
            "", "{", "[1,]", r#"{"a" 1}"#, r#"{a:1}"#, "01", "1.", ".5", "+1", "1e", "nul",
            "NaN", "Infinity", r#""\x""#, r#""\u12""#, "\"a\nb\"", "\"open", "1 2", "[1}",
        ];
        for text in texts {
            assert!(parse_preserving(text).is_err(), "{text:?}");
        }
    }

    #[test]
    fn test_depth_bound() {
        let deep = "[".repeat(MAX_PARSE_DEPTH + 1) + &"]".repeat(MAX_PARSE_DEPTH + 1);
        assert!(parse_preserving(&deep).is_err());

        let ok = "[".repeat(MAX_PARSE_DEPTH) + &"]".repeat(MAX_PARSE_DEPTH);
        assert!(parse_preserving(&ok).is_ok());
    }
}
