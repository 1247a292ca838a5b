//! JSON-value validation: the gate between caller data and the canonicalizer.
//!
//! Three entry points, one per kind of caller input:
//! - [`validate`] classifies a host [`Document`] graph. Containers are shared
//!   handles, so a graph may alias or loop back on itself; cycles are
//!   detected by tracking the containers on the current path.
//! - [`from_serde`] converts a `serde_json::Value`.
//! - [`from_str`] / [`from_slice`] decode JSON text strictly (duplicate keys
//!   rejected, never last-wins).
//!
//! Every failure is [`ValidationError::InvalidPayload`] with the path of the
//! offending value.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt::{self, Write};
use std::rc::Rc;

use crate::error::{ValidationError, ValidationResult};
use crate::value::{JsonString, JsonValue};

/// Default maximum container nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Validator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Maximum nesting of arrays and objects.
    pub max_depth: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Shared, mutable container handle.
pub type Handle<T> = Rc<RefCell<T>>;

/// A loosely-typed document graph as handed over by a host integration
/// (a scripting bridge, a mutable document store).
///
/// Unlike [`JsonValue`] this is not guaranteed to be a tree or to hold only
/// JSON data: containers are shared handles and [`Document::Opaque`] stands
/// for host values with no JSON form.
#[derive(Clone)]
pub enum Document {
    Null,
    Bool(bool),
    /// May be non-finite.
    Number(f64),
    Text(JsonString),
    Array(Handle<Vec<Document>>),
    /// Members in insertion order; keys are not guaranteed unique.
    Object(Handle<Vec<(JsonString, Document)>>),
    /// A host value without a JSON representation, named by its type
    /// (`"date"`, `"function"`, `"bigint"`, `"undefined"`, ...).
    Opaque(String),
}

impl Document {
    /// A new empty array handle.
    pub fn array() -> Self {
        Document::Array(Rc::new(RefCell::new(Vec::new())))
    }

    /// A new empty object handle.
    pub fn object() -> Self {
        Document::Object(Rc::new(RefCell::new(Vec::new())))
    }

    pub fn opaque(type_name: impl Into<String>) -> Self {
        Document::Opaque(type_name.into())
    }

    /// Append to an array. Returns false if `self` is not an array.
    pub fn push(&self, item: Document) -> bool {
        match self {
            Document::Array(items) => {
                items.borrow_mut().push(item);
                true
            }
            _ => false,
        }
    }

    /// Append a member to an object. Returns false if `self` is not an
    /// object. Existing members with the same key are kept.
    pub fn insert(&self, key: impl Into<JsonString>, value: Document) -> bool {
        match self {
            Document::Object(members) => {
                members.borrow_mut().push((key.into(), value));
                true
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Document {
    // Containers are summarized: a derived impl would recurse forever on a cycle.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Document::Null => f.write_str("Null"),
            Document::Bool(b) => write!(f, "Bool({b})"),
            Document::Number(n) => write!(f, "Number({n})"),
            Document::Text(s) => write!(f, "Text({s:?})"),
            Document::Array(items) => match items.try_borrow() {
                Ok(items) => write!(f, "Array(<{} items>)", items.len()),
                Err(_) => f.write_str("Array(<borrowed>)"),
            },
            Document::Object(members) => match members.try_borrow() {
                Ok(members) => write!(f, "Object(<{} members>)", members.len()),
                Err(_) => f.write_str("Object(<borrowed>)"),
            },
            Document::Opaque(name) => write!(f, "Opaque({name})"),
        }
    }
}

impl From<&JsonValue> for Document {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Document::Null,
            JsonValue::Bool(b) => Document::Bool(*b),
            JsonValue::Number(n) => Document::Number(*n),
            JsonValue::String(s) => Document::Text(s.clone()),
            JsonValue::Array(items) => Document::Array(Rc::new(RefCell::new(
                items.iter().map(Document::from).collect(),
            ))),
            JsonValue::Object(members) => Document::Object(Rc::new(RefCell::new(
                members
                    .iter()
                    .map(|(k, v)| (k.clone(), Document::from(v)))
                    .collect(),
            ))),
        }
    }
}

impl From<bool> for Document {
    fn from(b: bool) -> Self {
        Document::Bool(b)
    }
}

impl From<f64> for Document {
    fn from(n: f64) -> Self {
        Document::Number(n)
    }
}

impl From<&str> for Document {
    fn from(s: &str) -> Self {
        Document::Text(s.into())
    }
}

/// Validate a document graph with the default configuration.
pub fn validate(doc: &Document) -> ValidationResult<JsonValue> {
    validate_with(doc, &ValidatorConfig::default())
}

/// Validate a document graph, producing an owned JSON tree.
///
/// Rejects opaque values, non-finite numbers, duplicate keys, cycles, and
/// nesting deeper than `config.max_depth`. A container reachable twice
/// without a cycle (aliasing) is accepted and copied each time.
pub fn validate_with(doc: &Document, config: &ValidatorConfig) -> ValidationResult<JsonValue> {
    let mut walker = Walker {
        max_depth: config.max_depth,
        ancestors: HashSet::new(),
        path: Vec::new(),
    };
    walker.visit(doc)
}

/// Check a document graph without keeping the converted tree.
pub fn is_json_value(doc: &Document) -> bool {
    validate(doc).is_ok()
}

/// Check an already-typed value with the default configuration.
pub fn check(value: &JsonValue) -> ValidationResult<()> {
    check_with(value, &ValidatorConfig::default())
}

/// Check an already-typed value.
///
/// [`JsonValue`] rules out cycles and opaque values by construction, but a
/// caller can still build one holding a non-finite number, a duplicate key,
/// or excessive nesting.
pub fn check_with(value: &JsonValue, config: &ValidatorConfig) -> ValidationResult<()> {
    let mut path = Vec::new();
    check_value(value, config.max_depth, &mut path)
}

/// Convert a `serde_json` tree.
pub fn from_serde(value: &serde_json::Value) -> ValidationResult<JsonValue> {
    let mut path = Vec::new();
    convert_serde(value, &mut path)
}

/// Decode JSON text strictly.
///
/// Duplicate keys, non-finite or out-of-range numbers, unpaired surrogate
/// escapes, and nesting beyond the decoder's recursion limit are rejected.
pub fn from_str(text: &str) -> ValidationResult<JsonValue> {
    serde_json::from_str(text).map_err(|e| ValidationError::new("$", e.to_string()))
}

/// Decode JSON bytes strictly. See [`from_str`].
pub fn from_slice(bytes: &[u8]) -> ValidationResult<JsonValue> {
    serde_json::from_slice(bytes).map_err(|e| ValidationError::new("$", e.to_string()))
}

enum Segment {
    Index(usize),
    Key(String),
}

fn render_path(path: &[Segment]) -> String {
    let mut out = String::from("$");
    for segment in path {
        let _ = match segment {
            Segment::Index(i) => write!(out, "[{i}]"),
            Segment::Key(k) => write!(out, ".{k}"),
        };
    }
    out
}

struct Walker {
    max_depth: usize,
    /// Containers on the current path, by handle address.
    ancestors: HashSet<*const ()>,
    path: Vec<Segment>,
}

impl Walker {
    fn invalid(&self, reason: impl Into<String>) -> ValidationError {
        ValidationError::new(render_path(&self.path), reason)
    }

    fn enter(&mut self, id: *const ()) -> ValidationResult<()> {
        if self.ancestors.contains(&id) {
            return Err(self.invalid("cyclic reference"));
        }
        if self.ancestors.len() >= self.max_depth {
            return Err(self.invalid(format!("nesting exceeds {} levels", self.max_depth)));
        }
        self.ancestors.insert(id);
        Ok(())
    }

    fn visit(&mut self, doc: &Document) -> ValidationResult<JsonValue> {
        match doc {
            Document::Null => Ok(JsonValue::Null),
            Document::Bool(b) => Ok(JsonValue::Bool(*b)),
            Document::Number(n) if n.is_finite() => Ok(JsonValue::Number(*n)),
            Document::Number(n) => Err(self.invalid(format!("non-finite number {n}"))),
            Document::Text(s) => Ok(JsonValue::String(s.clone())),
            Document::Opaque(name) => {
                Err(self.invalid(format!("{name} has no JSON representation")))
            }
            Document::Array(handle) => {
                let id = Rc::as_ptr(handle).cast::<()>();
                self.enter(id)?;
                let items = handle
                    .try_borrow()
                    .map_err(|_| self.invalid("array is being mutated"))?;

                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    self.path.push(Segment::Index(i));
                    out.push(self.visit(item)?);
                    self.path.pop();
                }

                self.ancestors.remove(&id);
                Ok(JsonValue::Array(out))
            }
            Document::Object(handle) => {
                let id = Rc::as_ptr(handle).cast::<()>();
                self.enter(id)?;
                let members = handle
                    .try_borrow()
                    .map_err(|_| self.invalid("object is being mutated"))?;

                let mut seen = HashSet::with_capacity(members.len());
                let mut out = Vec::with_capacity(members.len());
                for (key, value) in members.iter() {
                    if !seen.insert(key) {
                        return Err(self.invalid(format!("duplicate key {key:?}")));
                    }
                    self.path.push(Segment::Key(key.to_string_lossy()));
                    out.push((key.clone(), self.visit(value)?));
                    self.path.pop();
                }

                self.ancestors.remove(&id);
                Ok(JsonValue::Object(out))
            }
        }
    }
}

fn check_value(
    value: &JsonValue,
    max_depth: usize,
    path: &mut Vec<Segment>,
) -> ValidationResult<()> {
    let invalid = |path: &[Segment], reason: String| ValidationError::new(render_path(path), reason);

    match value {
        JsonValue::Number(n) if !n.is_finite() => {
            Err(invalid(path, format!("non-finite number {n}")))
        }
        // Every segment on the path is an enclosing container
        JsonValue::Array(_) | JsonValue::Object(_) if path.len() >= max_depth => {
            Err(invalid(path, format!("nesting exceeds {max_depth} levels")))
        }
        JsonValue::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                path.push(Segment::Index(i));
                check_value(item, max_depth, path)?;
                path.pop();
            }
            Ok(())
        }
        JsonValue::Object(members) => {
            let mut seen = HashSet::with_capacity(members.len());
            for (key, value) in members {
                if !seen.insert(key) {
                    return Err(invalid(path, format!("duplicate key {key:?}")));
                }
                path.push(Segment::Key(key.to_string_lossy()));
                check_value(value, max_depth, path)?;
                path.pop();
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn convert_serde(value: &serde_json::Value, path: &mut Vec<Segment>) -> ValidationResult<JsonValue> {
    use serde_json::Value;

    match value {
        Value::Null => Ok(JsonValue::Null),
        Value::Bool(b) => Ok(JsonValue::Bool(*b)),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite())
            .map(JsonValue::Number)
            .ok_or_else(|| {
                ValidationError::new(render_path(path), format!("number {n} is not a finite f64"))
            }),
        Value::String(s) => Ok(JsonValue::String(s.as_str().into())),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                path.push(Segment::Index(i));
                out.push(convert_serde(item, path)?);
                path.pop();
            }
            Ok(JsonValue::Array(out))
        }
        Value::Object(map) => {
            let mut out = Vec::with_capacity(map.len());
            for (key, value) in map {
                path.push(Segment::Key(key.clone()));
                out.push((JsonString::from(key), convert_serde(value, path)?));
                path.pop();
            }
            Ok(JsonValue::Object(out))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_values() {
        let doc = Document::object();
        doc.insert("id", Document::from(1.0));
        doc.insert("name", Document::from("test"));
        let tags = Document::array();
        tags.push(Document::from(true));
        tags.push(Document::Null);
        doc.insert("tags", tags);

        let value = validate(&doc).unwrap();
        assert_eq!(
            value,
            JsonValue::object([
                ("id", JsonValue::from(1)),
                ("name", JsonValue::from("test")),
                (
                    "tags",
                    JsonValue::Array(vec![JsonValue::Bool(true), JsonValue::Null])
                ),
            ])
        );
    }

    #[test]
    fn test_rejects_opaque_values() {
        for name in ["undefined", "function", "symbol", "bigint", "date", "map", "set", "buffer"] {
            let err = validate(&Document::opaque(name)).unwrap_err();
            assert!(err.reason().contains(name), "{err}");
        }

        let doc = Document::object();
        let nested = Document::object();
        nested.insert("bad", Document::opaque("date"));
        doc.insert("nested", nested);
        let err = validate(&doc).unwrap_err();
        assert_eq!(err.path(), "$.nested.bad");
    }

    #[test]
    fn test_rejects_non_finite_anywhere() {
        for n in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(validate(&Document::Number(n)).is_err());

            let arr = Document::array();
            arr.push(Document::from(1.0));
            arr.push(Document::Number(n));
            let err = validate(&arr).unwrap_err();
            assert_eq!(err.path(), "$[1]");
        }
    }

    #[test]
    fn test_rejects_self_cycle() {
        let doc = Document::object();
        doc.insert("a", Document::from(1.0));
        doc.insert("self", doc.clone());

        let err = validate(&doc).unwrap_err();
        assert_eq!(err.reason(), "cyclic reference");
        assert_eq!(err.path(), "$.self");
    }

    #[test]
    fn test_rejects_indirect_cycle() {
        let outer = Document::array();
        let inner = Document::object();
        inner.insert("back", outer.clone());
        outer.push(inner);

        let err = validate(&outer).unwrap_err();
        assert_eq!(err.reason(), "cyclic reference");
        assert_eq!(err.path(), "$[0].back");
    }

    #[test]
    fn test_accepts_aliasing_without_cycle() {
        let shared = Document::array();
        shared.push(Document::from("x"));

        let doc = Document::object();
        doc.insert("left", shared.clone());
        doc.insert("right", shared);

        let value = validate(&doc).unwrap();
        assert_eq!(value.get("left"), value.get("right"));
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let doc = Document::object();
        doc.insert("a", Document::from(1.0));
        doc.insert("a", Document::from(2.0));

        let err = validate(&doc).unwrap_err();
        assert!(err.reason().contains("duplicate key"), "{err}");
    }

    #[test]
    fn test_depth_limit() {
        let root = Document::array();
        let mut current = root.clone();
        for _ in 0..10 {
            let next = Document::array();
            current.push(next.clone());
            current = next;
        }

        assert!(validate(&root).is_ok());
        let err = validate_with(&root, &ValidatorConfig { max_depth: 5 }).unwrap_err();
        assert!(err.reason().contains("nesting"), "{err}");
    }

    #[test]
    fn test_document_round_trip() {
        let value = from_str(r#"{"a":[1,2,{"b":null}],"c":"d"}"#).unwrap();
        let doc = Document::from(&value);
        assert_eq!(validate(&doc).unwrap(), value);
    }

    #[test]
    fn test_debug_does_not_recurse_into_cycles() {
        let doc = Document::array();
        doc.push(doc.clone());
        assert_eq!(format!("{doc:?}"), "Array(<1 items>)");
    }

    #[test]
    fn test_from_serde() {
        let value = from_serde(&serde_json::json!({"a": [1, 2.5, "x"], "b": {"c": null}})).unwrap();
        assert_eq!(value.get("a").unwrap().as_array().unwrap()[1], JsonValue::Number(2.5));
        assert!(value.get("b").unwrap().get("c").unwrap().is_null());
    }

    #[test]
    fn test_from_str_strict() {
        assert!(from_str(r#"{"a":1,"a":2}"#).is_err());
        assert!(from_str(r#"{"a":1,}"#).is_err());
        assert!(from_str("[1, // comment\n 2]").is_err());
        assert!(from_str("NaN").is_err());
        assert!(from_str("1e400").is_err());
        assert!(from_str(r#""\ud800""#).is_err());
        assert!(from_str(r#""😃""#).is_ok());
        assert_eq!(from_slice(b"[true]").unwrap(), JsonValue::Array(vec![JsonValue::Bool(true)]));
    }

    #[test]
    fn test_check_typed_values() {
        assert!(check(&from_str(r#"{"a":[1,{"b":"c"}]}"#).unwrap()).is_ok());

        let nan = JsonValue::object([("x", JsonValue::Array(vec![JsonValue::Number(f64::NAN)]))]);
        let err = check(&nan).unwrap_err();
        assert_eq!(err.path(), "$.x[0]");

        let dup = JsonValue::object([("a", JsonValue::Null), ("a", JsonValue::Null)]);
        assert!(check(&dup).unwrap_err().reason().contains("duplicate key"));

        let deep = JsonValue::Array(vec![JsonValue::Array(vec![JsonValue::Array(vec![])])]);
        assert!(check_with(&deep, &ValidatorConfig { max_depth: 3 }).is_ok());
        assert!(check_with(&deep, &ValidatorConfig { max_depth: 2 }).is_err());
    }

    #[test]
    fn test_is_json_value() {
        assert!(is_json_value(&Document::from("ok")));
        assert!(!is_json_value(&Document::opaque("function")));
    }
}
