//! Error types for json-seal envelopes.

use json_seal_core::{CanonicalError, ValidationError};
use json_seal_crypto::CryptoError;
use thiserror::Error;

/// Errors that can occur while sealing or opening an envelope.
#[derive(Debug, Error)]
pub enum SealError {
    /// The payload is not representable as JSON.
    #[error("{0}")]
    InvalidPayload(#[from] ValidationError),

    /// The payload has no canonical form.
    #[error("canonicalization error: {0}")]
    Canonical(#[from] CanonicalError),

    /// The envelope is too incomplete to attempt verification.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Reported by the signing provider.
    #[error("crypto failure: {0}")]
    CryptoFailure(#[from] CryptoError),
}

/// Result type for envelope operations.
pub type Result<T> = std::result::Result<T, SealError>;
