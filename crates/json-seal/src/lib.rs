//! # json-seal
//!
//! Signed JSON envelopes: a payload is canonicalized per RFC 8785 and the
//! canonical bytes are signed with RSA-PSS (SHA-256, 32-byte salt).
//!
//! ## Overview
//!
//! - **Sealing**: [`EnvelopeBuilder`] / [`sign`] validate, canonicalize
//!   and sign a payload, producing a [`SignedEnvelope`]
//! - **Opening**: [`verify`] recomputes the canonical form and checks the
//!   embedded signature; tampering always yields `valid = false`
//! - **Wire format**: [`SignedEnvelope::to_json`] / [`SignedEnvelope::from_json`]
//!
//! The envelope timestamp is not signed. Treat it as a hint.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use json_seal::{sign, verify};
//! use json_seal::core::from_str;
//! use json_seal::crypto::{RsaPssKeyPair, RsaPssSigner, RsaPssVerifier};
//!
//! async fn example() {
//!     let keypair = RsaPssKeyPair::generate().unwrap();
//!     let signer = RsaPssSigner::new(&keypair).unwrap();
//!
//!     let payload = from_str(r#"{"id":1,"data":"test"}"#).unwrap();
//!     let envelope = sign(&payload, &signer).await.unwrap();
//!
//!     let result = verify(&envelope, &RsaPssVerifier::new()).await.unwrap();
//!     assert!(result.valid);
//!     assert_eq!(result.payload, Some(payload));
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `json_seal::core` - Value model, validation, canonicalization
//! - `json_seal::crypto` - Keys, signer and verifier

pub mod config;
pub mod envelope;
pub mod error;
pub mod sign;
pub mod verify;

pub use json_seal_core as core;
pub use json_seal_crypto as crypto;

pub use config::SealConfig;
pub use envelope::{format_timestamp, SignatureBlock, SignedEnvelope, ENVELOPE_VERSION};
pub use error::{Result, SealError};
pub use sign::{sign, sign_document, EnvelopeBuilder};
pub use verify::{verify, verify_json, Verification};

pub use json_seal_core::{canonicalize, validate, CanonicalString, Document, JsonValue};
pub use json_seal_crypto::{PayloadSigner, SignatureVerifier};
