//! # json-seal crypto
//!
//! The cryptographic provider behind json-seal envelopes.
//!
//! ## Overview
//!
//! - **Signing**: RSA-PSS with SHA-256 and a 32-byte salt ([`RsaPssSigner`])
//! - **Verification**: the same parameters ([`RsaPssVerifier`])
//! - **Keys**: 2048-bit generation, PKCS#8 / SPKI PEM import and export
//! - **Encodings**: standard base64 for signature values, SHA-256 fingerprints
//!
//! The envelope layer only sees the [`PayloadSigner`] and
//! [`SignatureVerifier`] traits, so other providers can be plugged in.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use json_seal_crypto::{PayloadSigner, RsaPssKeyPair, RsaPssSigner};
//!
//! async fn example() {
//!     let keypair = RsaPssKeyPair::generate().unwrap();
//!     let signer = RsaPssSigner::new(&keypair).unwrap();
//!     let signature = signer.sign(b"{\"a\":1}").await.unwrap();
//!     assert_eq!(signature.len(), 256);
//! }
//! ```

pub mod digest;
pub mod encoding;
pub mod error;
pub mod keys;
pub mod signer;

pub use digest::Sha256Hash;
pub use error::{CryptoError, Result};
pub use keys::{KeyConfig, RsaPssKeyPair, RsaPssPublicKey, DEFAULT_MODULUS_BITS};
pub use signer::{
    PayloadSigner, RsaPssSigner, RsaPssVerifier, SignatureVerifier, ALGORITHM, SALT_LEN,
};

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::OnceLock;

    use crate::keys::RsaPssKeyPair;

    /// Key generation is slow; share keys across tests in this binary.
    pub fn shared_keypair() -> &'static RsaPssKeyPair {
        static KEYPAIR: OnceLock<RsaPssKeyPair> = OnceLock::new();
        KEYPAIR.get_or_init(|| RsaPssKeyPair::generate().unwrap())
    }

    pub fn other_keypair() -> &'static RsaPssKeyPair {
        static KEYPAIR: OnceLock<RsaPssKeyPair> = OnceLock::new();
        KEYPAIR.get_or_init(|| RsaPssKeyPair::generate().unwrap())
    }
}
