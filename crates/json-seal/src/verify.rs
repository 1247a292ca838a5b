//! Opening signed envelopes.
//!
//! Verification recomputes the canonical form of the payload and checks
//! the embedded signature against it. Nothing transmitted alongside the
//! payload is trusted as signing input.
//!
//! Outcomes:
//! - `Err(MalformedEnvelope)` when the envelope is too incomplete to
//!   attempt verification (wrong version, unknown algorithm, empty key or
//!   signature).
//! - `Ok(Verification { valid: false, .. })` for everything that points
//!   at tampering: a payload with no canonical form, undecodable
//!   signature text, an unusable public key, or a signature mismatch.
//! - `Ok(Verification { valid: true, payload: Some(..) })` otherwise.

use serde::Serialize;
use tracing::{debug, warn};

use json_seal_core::{canonicalize, JsonValue};
use json_seal_crypto::{encoding, SignatureVerifier, ALGORITHM};

use crate::envelope::{SignedEnvelope, ENVELOPE_VERSION};
use crate::error::{Result, SealError};

/// Result of verifying an envelope.
///
/// The payload is only handed back when the signature holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verification {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<JsonValue>,
}

impl Verification {
    fn valid(payload: JsonValue) -> Self {
        Self {
            valid: true,
            payload: Some(payload),
        }
    }

    fn invalid() -> Self {
        Self {
            valid: false,
            payload: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The verified payload, if any.
    pub fn into_payload(self) -> Option<JsonValue> {
        self.payload
    }
}

/// Verify an envelope.
pub async fn verify<V>(envelope: &SignedEnvelope, verifier: &V) -> Result<Verification>
where
    V: SignatureVerifier + ?Sized,
{
    check_structure(envelope)?;

    let canonical = match canonicalize(&envelope.payload) {
        Ok(canonical) => canonical,
        Err(e) => {
            warn!(error = %e, "payload has no canonical form, rejecting envelope");
            return Ok(Verification::invalid());
        }
    };

    let signature = match encoding::decode(&envelope.signature.value) {
        Ok(signature) => signature,
        Err(e) => {
            warn!(error = %e, "signature value is not base64, rejecting envelope");
            return Ok(Verification::invalid());
        }
    };

    debug!(
        payload_len = canonical.len(),
        signature_len = signature.len(),
        "verifying envelope"
    );

    match verifier
        .verify(&envelope.signature.public_key, canonical.as_bytes(), &signature)
        .await
    {
        Ok(true) => Ok(Verification::valid(envelope.payload.clone())),
        Ok(false) => {
            debug!("signature does not match payload");
            Ok(Verification::invalid())
        }
        Err(e) => {
            warn!(error = %e, "embedded public key is unusable, rejecting envelope");
            Ok(Verification::invalid())
        }
    }
}

/// Parse envelope JSON text, then verify it.
///
/// See [`SignedEnvelope::from_json`] for what is rejected up front. A
/// payload that was tampered into something without a canonical form is
/// reported as `valid = false`, like any other tampering.
pub async fn verify_json<V>(text: &str, verifier: &V) -> Result<Verification>
where
    V: SignatureVerifier + ?Sized,
{
    let envelope = SignedEnvelope::from_json(text)?;
    verify(&envelope, verifier).await
}

fn check_structure(envelope: &SignedEnvelope) -> Result<()> {
    if envelope.version != ENVELOPE_VERSION {
        return Err(SealError::MalformedEnvelope(format!(
            "unsupported version {}",
            envelope.version
        )));
    }

    let signature = &envelope.signature;
    if signature.algorithm != ALGORITHM {
        return Err(SealError::MalformedEnvelope(format!(
            "unsupported algorithm {:?}",
            signature.algorithm
        )));
    }
    if signature.public_key.trim().is_empty() {
        return Err(SealError::MalformedEnvelope("empty signature.publicKey".into()));
    }
    if signature.value.trim().is_empty() {
        return Err(SealError::MalformedEnvelope("empty signature.value".into()));
    }

    Ok(())
}
