//! # json-seal testkit
//!
//! Testing utilities for json-seal.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: canonicalization cases with exact expected output
//! - **Generators**: proptest strategies for [`JsonValue`](json_seal_core::JsonValue)
//! - **Fixtures**: RSA keys generated once per test binary
//!
//! ## Golden Vectors
//!
//! ```rust
//! use json_seal_core::canonicalize_str;
//! use json_seal_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     let canonical = canonicalize_str(vector.input).unwrap();
//!     assert_eq!(canonical.as_str(), vector.expected, "{}", vector.name);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use json_seal_core::canonicalize;
//! use json_seal_testkit::generators::{json_value, reorder_keys};
//!
//! proptest! {
//!     #[test]
//!     fn key_order_is_irrelevant(value in json_value()) {
//!         prop_assert_eq!(canonicalize(&value), canonicalize(&reorder_keys(&value)));
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::TestFixture;
