//! RSA-PSS signing and verification over SHA-256 with a 32-byte salt.
//!
//! These are the capabilities the envelope layer consumes. They are traits
//! so hardware-backed or remote signers can stand in for the in-process
//! RSA implementation.
//!
//! PSS padding is randomized: signing the same message twice with the same
//! key yields different signature bytes, each of which verifies.

use std::sync::Arc;

use async_trait::async_trait;
use rsa::{Pss, RsaPrivateKey};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{CryptoError, Result};
use crate::keys::{RsaPssKeyPair, RsaPssPublicKey};

/// Envelope algorithm identifier.
pub const ALGORITHM: &str = "RSA-PSS-SHA256";

/// PSS salt length in bytes.
pub const SALT_LEN: usize = 32;

fn pss() -> Pss {
    Pss::new_with_salt::<Sha256>(SALT_LEN)
}

/// Produces signatures over message bytes.
#[async_trait]
pub trait PayloadSigner: Send + Sync {
    /// Algorithm identifier recorded in the envelope.
    fn algorithm(&self) -> &'static str;

    /// Public key material recorded in the envelope.
    fn public_key_pem(&self) -> &str;

    /// Sign `message`. May suspend while the operation runs elsewhere.
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// Checks signatures over message bytes.
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    /// Returns `Ok(false)` when the signature does not match, and an error
    /// only when the key material itself is unusable.
    async fn verify(&self, public_key_pem: &str, message: &[u8], signature: &[u8]) -> Result<bool>;
}

/// In-process RSA-PSS signer.
///
/// Cheap to clone; clones share the key.
#[derive(Clone)]
pub struct RsaPssSigner {
    key: Arc<RsaPrivateKey>,
    public_key_pem: Arc<str>,
    fingerprint: String,
}

impl RsaPssSigner {
    pub fn new(keypair: &RsaPssKeyPair) -> Result<Self> {
        Ok(Self {
            key: Arc::new(keypair.private().clone()),
            public_key_pem: Arc::from(keypair.public_key_pem()),
            fingerprint: keypair.public_key().fingerprint()?.to_string(),
        })
    }

    /// Import a PKCS#8 or PKCS#1 PEM private key.
    pub fn from_pem(private_key_pem: &str) -> Result<Self> {
        Self::new(&RsaPssKeyPair::from_pem(private_key_pem)?)
    }

    /// Sign on the calling thread.
    pub fn sign_blocking(&self, message: &[u8]) -> Result<Vec<u8>> {
        let digest = Sha256::digest(message);
        sign_digest(&self.key, &digest)
    }
}

fn sign_digest(key: &RsaPrivateKey, digest: &[u8]) -> Result<Vec<u8>> {
    let mut rng = rand::thread_rng();
    key.sign_with_rng(&mut rng, pss(), digest)
        .map_err(|e| CryptoError::Signing(e.to_string()))
}

#[async_trait]
impl PayloadSigner for RsaPssSigner {
    fn algorithm(&self) -> &'static str {
        ALGORITHM
    }

    fn public_key_pem(&self) -> &str {
        &self.public_key_pem
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        debug!(
            key = %self.fingerprint,
            message_len = message.len(),
            "signing with RSA-PSS"
        );

        // Hash here so only 32 bytes move to the worker
        let digest = Sha256::digest(message).to_vec();
        let key = Arc::clone(&self.key);
        tokio::task::spawn_blocking(move || sign_digest(&key, &digest))
            .await
            .map_err(|e| CryptoError::Task(e.to_string()))?
    }
}

impl std::fmt::Debug for RsaPssSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RsaPssSigner({})", self.fingerprint)
    }
}

/// In-process RSA-PSS verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaPssVerifier;

impl RsaPssVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Verify against an already-parsed key.
    pub fn verify_with_key(key: &RsaPssPublicKey, message: &[u8], signature: &[u8]) -> bool {
        let digest = Sha256::digest(message);
        key.inner().verify(pss(), &digest, signature).is_ok()
    }
}

#[async_trait]
impl SignatureVerifier for RsaPssVerifier {
    async fn verify(&self, public_key_pem: &str, message: &[u8], signature: &[u8]) -> Result<bool> {
        let key = RsaPssPublicKey::from_pem(public_key_pem)?;
        let valid = Self::verify_with_key(&key, message, signature);
        debug!(message_len = message.len(), valid, "verified RSA-PSS signature");
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{other_keypair, shared_keypair};

    fn signer() -> RsaPssSigner {
        RsaPssSigner::new(shared_keypair()).unwrap()
    }

    #[tokio::test]
    async fn test_sign_verify() {
        let signer = signer();
        let message = b"{\"data\":\"test\",\"id\":1}";
        let signature = signer.sign(message).await.unwrap();
        assert_eq!(signature.len(), 256);

        let verifier = RsaPssVerifier::new();
        assert!(verifier
            .verify(signer.public_key_pem(), message, &signature)
            .await
            .unwrap());

        // Tampered message should fail
        assert!(!verifier
            .verify(signer.public_key_pem(), b"{\"data\":\"hacked\",\"id\":1}", &signature)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_signatures_are_randomized() {
        let signer = signer();
        let a = signer.sign(b"same bytes").await.unwrap();
        let b = signer.sign(b"same bytes").await.unwrap();
        assert_ne!(a, b);

        let key = shared_keypair().public_key();
        assert!(RsaPssVerifier::verify_with_key(key, b"same bytes", &a));
        assert!(RsaPssVerifier::verify_with_key(key, b"same bytes", &b));
    }

    #[tokio::test]
    async fn test_wrong_key_fails() {
        let signature = signer().sign(b"hello").await.unwrap();
        let verifier = RsaPssVerifier::new();
        assert!(!verifier
            .verify(other_keypair().public_key_pem(), b"hello", &signature)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_corrupted_signature_fails() {
        let mut signature = signer().sign(b"hello").await.unwrap();
        signature[0] ^= 0xff;
        let key = shared_keypair().public_key();
        assert!(!RsaPssVerifier::verify_with_key(key, b"hello", &signature));
        assert!(!RsaPssVerifier::verify_with_key(key, b"hello", &signature[..10]));
        assert!(!RsaPssVerifier::verify_with_key(key, b"hello", &[]));
    }

    #[tokio::test]
    async fn test_unparseable_public_key_is_error() {
        let result = RsaPssVerifier::new().verify("garbage", b"hello", &[0u8; 256]).await;
        assert!(matches!(result, Err(CryptoError::InvalidPublicKey(_))));
    }

    #[test]
    fn test_other_salt_length_rejected() {
        let keypair = shared_keypair();
        let digest = Sha256::digest(b"hello");
        let mut rng = rand::thread_rng();
        let signature = keypair
            .private()
            .sign_with_rng(&mut rng, Pss::new_with_salt::<Sha256>(20), &digest)
            .unwrap();
        assert!(!RsaPssVerifier::verify_with_key(keypair.public_key(), b"hello", &signature));
    }

    #[test]
    fn test_blocking_sign_verifies() {
        let signer = signer();
        let signature = signer.sign_blocking(b"blocking").unwrap();
        assert!(RsaPssVerifier::verify_with_key(
            shared_keypair().public_key(),
            b"blocking",
            &signature
        ));
    }

    #[test]
    fn test_from_pem() {
        let pem = shared_keypair().private_key_pem().unwrap();
        let signer = RsaPssSigner::from_pem(&pem).unwrap();
        assert_eq!(signer.public_key_pem(), shared_keypair().public_key_pem());
        assert_eq!(signer.algorithm(), "RSA-PSS-SHA256");
    }
}
