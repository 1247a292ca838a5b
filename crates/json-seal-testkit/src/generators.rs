//! Proptest generators for property-based testing.
//!
//! Every generated value is JSON-representable: finite numbers,
//! well-formed strings, unique keys.

use proptest::prelude::*;

use json_seal_core::{JsonString, JsonValue};

/// Generate a finite number, biased toward formatting edge cases.
pub fn number() -> impl Strategy<Value = f64> {
    prop_oneof![
        any::<i32>().prop_map(f64::from),
        any::<f64>().prop_filter("finite", |n| n.is_finite()),
        Just(-0.0),
        Just(1e21),
        Just(1e-7),
        Just(5e-324),
        Just(9_007_199_254_740_992.0),
    ]
}

/// Generate well-formed text, including escapes and astral characters.
pub fn text() -> impl Strategy<Value = JsonString> {
    let tricky = prop::sample::select(vec![
        '"', '\\', '/', '\u{0}', '\u{8}', '\t', '\n', '\u{c}', '\r', '\u{1f}', 'a', '\u{7f}',
        '\u{80}', '\u{e9}', '\u{301}', '\u{20ac}', '\u{fb33}', '\u{1f600}',
    ]);
    prop_oneof![
        "[a-z]{0,8}",
        prop::collection::vec(tricky, 0..8)
            .prop_map(|chars: Vec<char>| chars.into_iter().collect::<String>()),
        any::<String>(),
    ]
    .prop_map(|s: String| JsonString::from(s))
}

/// Generate a leaf value.
pub fn leaf() -> impl Strategy<Value = JsonValue> {
    prop_oneof![
        Just(JsonValue::Null),
        any::<bool>().prop_map(JsonValue::Bool),
        number().prop_map(JsonValue::Number),
        text().prop_map(JsonValue::String),
    ]
}

/// Generate an arbitrary JSON value, nested up to four levels.
///
/// Object members come out in shuffled order, not sorted.
pub fn json_value() -> impl Strategy<Value = JsonValue> {
    leaf().prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(JsonValue::Array),
            prop::collection::btree_map(text(), inner, 0..8)
                .prop_map(|members| members.into_iter().collect::<Vec<_>>())
                .prop_shuffle()
                .prop_map(JsonValue::Object),
        ]
    })
}

/// The same value with every object's members in reverse order.
pub fn reorder_keys(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(reorder_keys).collect()),
        JsonValue::Object(members) => JsonValue::Object(
            members
                .iter()
                .rev()
                .map(|(k, v)| (k.clone(), reorder_keys(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}
