//! Golden canonicalization vectors.
//!
//! Each vector is JSON text and its exact canonical form. Any conforming
//! implementation must reproduce `expected` byte for byte. The RFC 8785
//! vectors use this crate's exponent style (`1E30`, not `1e+30`).

/// A golden test vector.
#[derive(Debug, Clone, Copy)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// JSON text, in any formatting.
    pub input: &'static str,
    /// Canonical form.
    pub expected: &'static str,
}

const fn vector(name: &'static str, input: &'static str, expected: &'static str) -> GoldenVector {
    GoldenVector {
        name,
        input,
        expected,
    }
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    let mut vectors = structure_vectors();
    vectors.extend(number_vectors());
    vectors.extend(string_vectors());
    vectors
}

/// Whole-document cases, including the RFC 8785 section 3.2.2 and 3.2.3 examples.
pub fn structure_vectors() -> Vec<GoldenVector> {
    vec![
        vector(
            "RFC 8785 mixed document",
            r#"{
                "numbers": [333333333.33333329, 1E30, 4.50, 2e-3, 0.000000000000000000000000001],
                "string": "\u20ac$\u000F\u000aA'\u0042\u0022\u005c\\\"\/",
                "literals": [null, true, false]
            }"#,
            r#"{"literals":[null,true,false],"numbers":[333333333.3333333,1E30,4.5,0.002,1E-27],"string":"€$\u000f\nA'B\"\\\\\"/"}"#,
        ),
        vector(
            "RFC 8785 key sorting by UTF-16 code unit",
            r#"{
                "\u20ac": "Euro Sign",
                "\r": "Carriage Return",
                "\ufb33": "Hebrew Letter Dalet With Dagesh",
                "1": "One",
                "\ud83d\ude00": "Emoji: Grinning Face",
                "\u0080": "Control",
                "\u00f6": "Latin Small Letter O With Diaeresis"
            }"#,
            "{\"\\r\":\"Carriage Return\",\"1\":\"One\",\"\u{80}\":\"Control\",\
             \"\u{f6}\":\"Latin Small Letter O With Diaeresis\",\"\u{20ac}\":\"Euro Sign\",\
             \"\u{1f600}\":\"Emoji: Grinning Face\",\"\u{fb33}\":\"Hebrew Letter Dalet With Dagesh\"}",
        ),
        vector(
            "nested objects are sorted at every level",
            r#"{"b": {"z": 1, "a": [{"y": null, "x": true}]}, "a": []}"#,
            r#"{"a":[],"b":{"a":[{"x":true,"y":null}],"z":1}}"#,
        ),
        vector("empty object", "{ }", "{}"),
        vector("empty array", "[ ]", "[]"),
        vector(
            "mixed array keeps order",
            r#"[{}, [], null, "x"]"#,
            r#"[{},[],null,"x"]"#,
        ),
        vector("bare literal", " true ", "true"),
    ]
}

/// Number formatting cases.
pub fn number_vectors() -> Vec<GoldenVector> {
    vec![
        vector("zero", "0", "0"),
        vector("negative zero", "-0.0", "0"),
        vector("signed zeros in array", "[0, -0.0, 1e10, -1e-10]", "[0,0,10000000000,-1E-10]"),
        vector("trailing zeros dropped", "4.50", "4.5"),
        vector("integral float", "1.0", "1"),
        vector("exponent folded", "-1.5e+2", "-150"),
        vector("smallest subnormal", "5e-324", "5E-324"),
        vector("largest double", "1.7976931348623157e308", "1.7976931348623157E308"),
        vector("2^53", "9007199254740992", "9007199254740992"),
        vector("21 integer digits", "295147905179352830000", "295147905179352830000"),
        vector("1e21 switches to exponent", "1e21", "1E21"),
        vector("1e-6 stays plain", "0.000001", "0.000001"),
        vector("1e-7 switches to exponent", "0.0000001", "1E-7"),
        vector("shortest digits", "0.1", "0.1"),
        vector("sum rounding", "0.30000000000000004", "0.30000000000000004"),
    ]
}

/// String escaping cases.
pub fn string_vectors() -> Vec<GoldenVector> {
    vec![
        vector("slash not escaped", r#""a\/b""#, r#""a/b""#),
        vector("control character", r#""\u0001""#, r#""\u0001""#),
        vector("short escapes", r#""\b\f\n\r\t""#, r#""\b\f\n\r\t""#),
        vector("DEL is literal", r#""\u007f""#, "\"\u{7f}\""),
        vector("quote and backslash", r#""\"\\""#, r#""\"\\""#),
        vector("surrogate pair kept", r#""\ud83d\ude00""#, "\"\u{1f600}\""),
        vector("precomposed", r#""\u00e9""#, "\"\u{e9}\""),
        vector("decomposed is not normalized", r#""e\u0301""#, "\"e\u{301}\""),
        vector("line separator is literal", r#""\u2028""#, "\"\u{2028}\""),
    ]
}
