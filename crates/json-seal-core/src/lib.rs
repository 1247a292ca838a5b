//! # json-seal core
//!
//! Pure primitives for json-seal: the JSON value model, validation, and
//! RFC 8785 canonicalization.
//!
//! This crate contains no I/O and no cryptography. Every function is a
//! deterministic computation over its input and may be called concurrently
//! on independent values.
//!
//! ## Key Types
//!
//! - [`JsonValue`] - Closed sum over the seven JSON kinds
//! - [`JsonString`] - UTF-16 text, so unpaired surrogates are representable
//! - [`CanonicalString`] - The canonical text; its bytes are what gets signed
//! - [`Document`] - Host document graph accepted by the validator
//!
//! ## Canonicalization
//!
//! See the [`canonical`] module for the encoding rules.

pub mod canonical;
pub mod error;
pub mod parse;
pub mod validate;
pub mod value;

pub use canonical::{
    canonicalize, canonicalize_serde, canonicalize_str, compare_utf16, format_number,
    is_canonical, CanonicalString,
};
pub use error::{CanonicalError, ValidationError};
pub use parse::parse_preserving;
pub use validate::{
    check, check_with, from_serde, from_slice, from_str, is_json_value, validate, validate_with,
    Document, ValidatorConfig,
};
pub use value::{JsonString, JsonValue, MAX_SAFE_INTEGER};
