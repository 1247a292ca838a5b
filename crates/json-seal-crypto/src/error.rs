//! Error types for the crypto provider.

use thiserror::Error;

/// Errors reported by the cryptographic provider.
///
/// Details are opaque strings from the underlying libraries.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Private key could not be parsed or is unusable.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Public key could not be parsed.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Key pair generation failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// The signing operation failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Key material could not be encoded.
    #[error("key encoding failed: {0}")]
    Encoding(String),

    /// Malformed base64 text.
    #[error("invalid base64: {0}")]
    Base64(String),

    /// The background task running the operation did not complete.
    #[error("crypto task failed: {0}")]
    Task(String),
}

/// Result type for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
