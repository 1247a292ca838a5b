//! Test fixtures and helpers.
//!
//! RSA key generation takes a noticeable fraction of a second at 2048
//! bits, so keys are generated once per test binary and shared.

use std::sync::OnceLock;

use json_seal_crypto::{RsaPssKeyPair, RsaPssSigner, RsaPssVerifier};

/// The key most tests sign with.
pub fn keypair() -> &'static RsaPssKeyPair {
    static KEYPAIR: OnceLock<RsaPssKeyPair> = OnceLock::new();
    KEYPAIR.get_or_init(|| RsaPssKeyPair::generate().expect("RSA key generation"))
}

/// An unrelated key, for wrong-key cases.
pub fn other_keypair() -> &'static RsaPssKeyPair {
    static KEYPAIR: OnceLock<RsaPssKeyPair> = OnceLock::new();
    KEYPAIR.get_or_init(|| RsaPssKeyPair::generate().expect("RSA key generation"))
}

/// A signer, verifier and key bundled for envelope tests.
#[derive(Debug, Clone)]
pub struct TestFixture {
    pub keypair: &'static RsaPssKeyPair,
    pub signer: RsaPssSigner,
    pub verifier: RsaPssVerifier,
}

impl TestFixture {
    /// Fixture over the shared key.
    pub fn new() -> Self {
        Self::with_keypair(keypair())
    }

    /// Fixture over the unrelated key.
    pub fn other() -> Self {
        Self::with_keypair(other_keypair())
    }

    pub fn with_keypair(keypair: &'static RsaPssKeyPair) -> Self {
        Self {
            keypair,
            signer: RsaPssSigner::new(keypair).expect("signer from generated key"),
            verifier: RsaPssVerifier::new(),
        }
    }

    /// SPKI PEM text of the fixture key.
    pub fn public_key_pem(&self) -> &'static str {
        self.keypair.public_key_pem()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
