//! RFC 8785 JSON Canonicalization Scheme.
//!
//! Produces the unique textual form of a JSON value:
//! - Object members sorted by UTF-16 code units of their keys
//! - Numbers in shortest round-trip form, `-0` as `0`, exponents as `E`
//! - Strings with the minimal escape set, surrogates validated
//! - No insignificant whitespace
//!
//! **CRITICAL**: Signatures are computed over this output. Any change to
//! the rules below invalidates every existing envelope.

use std::cmp::Ordering;
use std::fmt::{self, Write};

use crate::error::{CanonicalError, Result};
use crate::validate;
use crate::value::{JsonString, JsonValue};

/// The canonical text of a JSON value.
///
/// Only produced by this module, so holding one means the rules above
/// were applied.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CanonicalString(String);

impl CanonicalString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The UTF-8 bytes that are signed and verified.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0.into_bytes()
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for CanonicalString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalString({:?})", self.0)
    }
}

impl fmt::Display for CanonicalString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<[u8]> for CanonicalString {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<CanonicalString> for String {
    fn from(c: CanonicalString) -> Self {
        c.0
    }
}

/// Canonicalize a JSON value.
pub fn canonicalize(value: &JsonValue) -> Result<CanonicalString> {
    let mut out = String::new();
    write_value(&mut out, value)?;
    Ok(CanonicalString(out))
}

/// Decode JSON text strictly, then canonicalize it.
pub fn canonicalize_str(text: &str) -> Result<CanonicalString> {
    let value = validate::from_str(text).map_err(|e| CanonicalError::Decode(e.to_string()))?;
    canonicalize(&value)
}

/// Canonicalize a `serde_json` tree directly.
///
/// Numbers that `serde_json` cannot express as a finite f64 (possible when
/// its `arbitrary_precision` feature is enabled anywhere in the build) fail
/// with [`CanonicalError::UnsupportedKind`].
pub fn canonicalize_serde(value: &serde_json::Value) -> Result<CanonicalString> {
    let mut out = String::new();
    write_serde(&mut out, value)?;
    Ok(CanonicalString(out))
}

/// Check whether `text` is exactly the canonical form of `value`.
pub fn is_canonical(text: &str, value: &JsonValue) -> bool {
    matches!(canonicalize(value), Ok(c) if c.as_str() == text)
}

/// Compare two keys by UTF-16 code units.
///
/// Differs from `str` ordering (code points) only for characters above
/// U+FFFF versus U+E000..=U+FFFF.
pub fn compare_utf16(a: &JsonString, b: &JsonString) -> Ordering {
    a.as_utf16().cmp(b.as_utf16())
}

fn compare_str_utf16(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

fn write_value(out: &mut String, value: &JsonValue) -> Result<()> {
    match value {
        JsonValue::Null => out.push_str("null"),
        JsonValue::Bool(true) => out.push_str("true"),
        JsonValue::Bool(false) => out.push_str("false"),
        JsonValue::Number(n) => out.push_str(&format_number(*n)?),
        JsonValue::String(s) => write_string(out, s.as_utf16())?,
        JsonValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item)?;
            }
            out.push(']');
        }
        JsonValue::Object(members) => write_object(out, members)?,
    }
    Ok(())
}

fn write_object(out: &mut String, members: &[(JsonString, JsonValue)]) -> Result<()> {
    let mut sorted: Vec<&(JsonString, JsonValue)> = members.iter().collect();
    sorted.sort_by(|a, b| compare_utf16(&a.0, &b.0));

    // Duplicates are adjacent after sorting
    for pair in sorted.windows(2) {
        if pair[0].0 == pair[1].0 {
            return Err(CanonicalError::DuplicateKey(pair[0].0.to_string_lossy()));
        }
    }

    out.push('{');
    for (i, (key, value)) in sorted.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(out, key.as_utf16())?;
        out.push(':');
        write_value(out, value)?;
    }
    out.push('}');
    Ok(())
}

fn write_serde(out: &mut String, value: &serde_json::Value) -> Result<()> {
    use serde_json::Value;

    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => {
            let n = n
                .as_f64()
                .ok_or_else(|| CanonicalError::UnsupportedKind(format!("number {n}")))?;
            out.push_str(&format_number(n)?);
        }
        Value::String(s) => write_str(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_serde(out, item)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            // serde_json maps cannot hold duplicate keys
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| compare_str_utf16(a.0, b.0));

            out.push('{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_str(out, key);
                out.push(':');
                write_serde(out, value)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

/// Write a string literal, validating surrogate pairing.
fn write_string(out: &mut String, units: &[u16]) -> Result<()> {
    out.push('"');
    let mut i = 0;
    while i < units.len() {
        let unit = units[i];
        let ch = match unit {
            0xD800..=0xDBFF => {
                let low = units
                    .get(i + 1)
                    .copied()
                    .filter(|u| (0xDC00..=0xDFFF).contains(u))
                    .ok_or(CanonicalError::InvalidSurrogate { index: i, unit })?;
                let code_point =
                    0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                i += 1;
                char::from_u32(code_point)
            }
            0xDC00..=0xDFFF => None,
            _ => char::from_u32(u32::from(unit)),
        };
        let ch = ch.ok_or(CanonicalError::InvalidSurrogate { index: i, unit })?;
        push_escaped(out, ch);
        i += 1;
    }
    out.push('"');
    Ok(())
}

/// Write a string literal from UTF-8 text (always well-formed).
fn write_str(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        push_escaped(out, ch);
    }
    out.push('"');
}

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '"' => out.push_str("\\\""),
        '\\' => out.push_str("\\\\"),
        '\x08' => out.push_str("\\b"),
        '\x0C' => out.push_str("\\f"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c if c < '\x20' => {
            // Writing to a String cannot fail
            let _ = write!(out, "\\u{:04x}", c as u32);
        }
        c => out.push(c),
    }
}

/// Serialize a number the way ECMAScript `Number.prototype.toString`
/// places digits, with the exponent normalized to `E`, no `+`, and no
/// leading zeros.
///
/// The digits are the shortest string that round-trips to the same f64,
/// which Rust's `{:e}` formatting already produces.
pub fn format_number(value: f64) -> Result<String> {
    if !value.is_finite() {
        return Err(CanonicalError::NonFiniteNumber);
    }
    // Covers -0
    if value == 0.0 {
        return Ok("0".to_string());
    }

    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    // k significant digits, decimal point after n of them
    let k = digits.len() as i32;
    let n = exponent + 1;

    let mut out = String::with_capacity(k as usize + 8);
    if value < 0.0 {
        out.push('-');
    }

    if k <= n && n <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((n - k) as usize));
    } else if 0 < n && n <= 21 {
        let (int_part, frac_part) = digits.split_at(n as usize);
        out.push_str(int_part);
        out.push('.');
        out.push_str(frac_part);
    } else if -6 < n && n <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-n) as usize));
        out.push_str(&digits);
    } else {
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        out.push('E');
        let e = n - 1;
        if e < 0 {
            out.push('-');
        }
        let _ = write!(out, "{}", e.unsigned_abs());
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(value: &JsonValue) -> String {
        canonicalize(value).unwrap().to_string()
    }

    fn lone(units: &[u16]) -> JsonValue {
        JsonValue::String(JsonString::from_utf16(units.to_vec()))
    }

    #[test]
    fn test_canonicalize_primitives() {
        assert_eq!(canon(&JsonValue::Null), "null");
        assert_eq!(canon(&JsonValue::Bool(true)), "true");
        assert_eq!(canon(&JsonValue::Bool(false)), "false");
        assert_eq!(canon(&JsonValue::from(42)), "42");
        assert_eq!(canon(&JsonValue::from("")), "\"\"");
    }

    #[test]
    fn test_negative_zero() {
        assert_eq!(canon(&JsonValue::Number(-0.0)), "0");
        assert_eq!(format_number(-0.0).unwrap(), format_number(0.0).unwrap());
    }

    #[test]
    fn test_non_finite_rejected() {
        for n in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(
                canonicalize(&JsonValue::Number(n)),
                Err(CanonicalError::NonFiniteNumber)
            );
        }
        // Nested too
        let nested = JsonValue::Array(vec![JsonValue::from(1), JsonValue::Number(f64::NAN)]);
        assert_eq!(canonicalize(&nested), Err(CanonicalError::NonFiniteNumber));
    }

    #[test]
    fn test_number_formatting() {
        let cases: &[(f64, &str)] = &[
            (1.0, "1"),
            (-1.0, "-1"),
            (10.0, "10"),
            (0.1, "0.1"),
            (1.2345, "1.2345"),
            (1e5, "100000"),
            (1e-5, "0.00001"),
            (0.000001, "0.000001"),
            (1e-7, "1E-7"),
            (-1e-6, "-0.000001"),
            (1e20, "100000000000000000000"),
            (1e21, "1E21"),
            (1e23, "1E23"),
            (1.5e300, "1.5E300"),
            (123e-20, "1.23E-18"),
            (9007199254740991.0, "9007199254740991"),
            (9007199254740992.0, "9007199254740992"),
            (333333333.33333329, "333333333.3333333"),
            (5e-324, "5E-324"),
            (1.7976931348623157e308, "1.7976931348623157E308"),
            (-1e-10, "-1E-10"),
        ];
        for (n, expected) in cases {
            assert_eq!(format_number(*n).unwrap(), *expected, "formatting {n:e}");
        }
    }

    #[test]
    fn test_number_formatting_round_trips() {
        for n in [0.1, 1.0 / 3.0, 2.0f64.powi(60), 6.02214076e23, -4.5e-12] {
            let text = format_number(n).unwrap();
            let parsed: f64 = text.parse().unwrap();
            assert_eq!(parsed, n, "{text}");
        }
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(canon(&JsonValue::from("a/b")), "\"a/b\"");
        assert_eq!(canon(&JsonValue::from("\u{0001}")), "\"\\u0001\"");
        assert_eq!(canon(&JsonValue::from("\u{001f}")), "\"\\u001f\"");
        assert_eq!(
            canon(&JsonValue::from("\"\\\u{8}\u{c}\n\r\t")),
            "\"\\\"\\\\\\b\\f\\n\\r\\t\""
        );
        // DEL and non-ASCII pass through
        assert_eq!(canon(&JsonValue::from("\u{7f}é€")), "\"\u{7f}é€\"");
    }

    #[test]
    fn test_surrogates() {
        assert_eq!(canon(&JsonValue::from("😃")), "\"😃\"");

        assert_eq!(
            canonicalize(&lone(&[0xD800])),
            Err(CanonicalError::InvalidSurrogate { index: 0, unit: 0xD800 })
        );
        assert_eq!(
            canonicalize(&lone(&[0xDC00])),
            Err(CanonicalError::InvalidSurrogate { index: 0, unit: 0xDC00 })
        );
        // High surrogate followed by a non-surrogate
        assert_eq!(
            canonicalize(&lone(&[0xD800, 0x61])),
            Err(CanonicalError::InvalidSurrogate { index: 0, unit: 0xD800 })
        );
        // Reversed pair
        assert_eq!(
            canonicalize(&lone(&[0x61, 0xDE03, 0xD83D])),
            Err(CanonicalError::InvalidSurrogate { index: 1, unit: 0xDE03 })
        );
    }

    #[test]
    fn test_surrogate_in_key_rejected() {
        let value = JsonValue::Object(vec![(
            JsonString::from_utf16(vec![0xD800]),
            JsonValue::Null,
        )]);
        assert!(matches!(
            canonicalize(&value),
            Err(CanonicalError::InvalidSurrogate { .. })
        ));
    }

    #[test]
    fn test_no_unicode_normalization() {
        let composed = JsonValue::from("\u{00e9}");
        let decomposed = JsonValue::from("e\u{0301}");
        assert_ne!(canon(&composed), canon(&decomposed));
    }

    #[test]
    fn test_key_ordering() {
        let value = JsonValue::object([("b", JsonValue::from(1)), ("a", JsonValue::from(2))]);
        assert_eq!(canon(&value), r#"{"a":2,"b":1}"#);

        let value = JsonValue::object([
            ("b", JsonValue::from(1)),
            ("\u{e1}", JsonValue::from(2)),
            ("a", JsonValue::from(3)),
        ]);
        assert_eq!(canon(&value), "{\"a\":3,\"b\":1,\"\u{e1}\":2}");
    }

    #[test]
    fn test_key_ordering_by_code_unit_not_code_point() {
        let value = JsonValue::object([
            ("\u{FF61}", JsonValue::from(1)),
            ("\u{1F600}", JsonValue::from(2)),
        ]);
        assert_eq!(canon(&value), "{\"\u{1F600}\":2,\"\u{FF61}\":1}");
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let value = JsonValue::object([
            ("a", JsonValue::from(1)),
            ("b", JsonValue::from(2)),
            ("a", JsonValue::from(3)),
        ]);
        assert_eq!(
            canonicalize(&value),
            Err(CanonicalError::DuplicateKey("a".into()))
        );
    }

    #[test]
    fn test_arrays_keep_order() {
        let value = JsonValue::Array(vec![
            JsonValue::from(3),
            JsonValue::object([("b", JsonValue::from(2)), ("a", JsonValue::from(1))]),
            JsonValue::Array(vec![JsonValue::from(2), JsonValue::from(1)]),
        ]);
        assert_eq!(canon(&value), r#"[3,{"a":1,"b":2},[2,1]]"#);
        assert_eq!(canon(&JsonValue::Array(vec![])), "[]");
        assert_eq!(canon(&JsonValue::Object(vec![])), "{}");
    }

    #[test]
    fn test_key_order_independent() {
        let x = canonicalize_str(r#"{"z":1,"a":{"y":2,"x":3}}"#).unwrap();
        let y = canonicalize_str(r#"{"a":{"x":3,"y":2},"z":1}"#).unwrap();
        assert_eq!(x, y);
        assert_eq!(x.as_str(), r#"{"a":{"x":3,"y":2},"z":1}"#);
    }

    #[test]
    fn test_canonicalize_str_strips_whitespace() {
        let c = canonicalize_str("{ \"b\" : [ 1 , 2.50 , 1e2 ] ,\n \"a\" : null }").unwrap();
        assert_eq!(c.as_str(), r#"{"a":null,"b":[1,2.5,100]}"#);
    }

    #[test]
    fn test_canonicalize_str_rejects_duplicates() {
        assert!(matches!(
            canonicalize_str(r#"{"a":1,"a":2}"#),
            Err(CanonicalError::Decode(_))
        ));
    }

    #[test]
    fn test_canonicalize_serde_matches() {
        let text = r#"{"b":[1,"x",null,true],"a":{"d":-0.5,"c":1e-9},"\u00e9":"/"}"#;
        let via_serde = canonicalize_serde(&serde_json::from_str(text).unwrap()).unwrap();
        let via_value = canonicalize_str(text).unwrap();
        assert_eq!(via_serde, via_value);
    }

    #[test]
    fn test_is_canonical() {
        let value = JsonValue::object([("a", JsonValue::from(1))]);
        assert!(is_canonical(r#"{"a":1}"#, &value));
        assert!(!is_canonical(r#"{"a": 1}"#, &value));
        assert!(!is_canonical(r#"{ "a":1}"#, &value));
    }

    #[test]
    fn test_canonical_bytes_are_utf8() {
        let c = canonicalize(&JsonValue::from("é")).unwrap();
        assert_eq!(c.as_bytes(), &[b'"', 0xC3, 0xA9, b'"']);
        assert_eq!(c.len(), 4);
    }

    proptest::proptest! {
        #[test]
        fn prop_format_number_round_trips(n in proptest::prelude::any::<f64>()) {
            proptest::prop_assume!(n.is_finite());
            let text = format_number(n).unwrap();
            let back: f64 = text.parse().unwrap();
            proptest::prop_assert_eq!(back, n);
            proptest::prop_assert!(!text.contains('e') && !text.contains('+'));
        }
    }
}
