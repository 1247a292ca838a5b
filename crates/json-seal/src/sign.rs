//! Sealing payloads into signed envelopes.

use chrono::Utc;
use tracing::debug;

use json_seal_core::{canonicalize, validate, Document, JsonValue, ValidationError};
use json_seal_crypto::{encoding, PayloadSigner};

use crate::config::SealConfig;
use crate::envelope::{format_timestamp, SignatureBlock, SignedEnvelope, ENVELOPE_VERSION};
use crate::error::Result;

/// Builds signed envelopes with a fixed signer and configuration.
///
/// ```rust,no_run
/// use json_seal::{EnvelopeBuilder, SealConfig};
/// use json_seal::core::JsonValue;
/// use json_seal::crypto::{RsaPssKeyPair, RsaPssSigner};
///
/// async fn example() {
///     let keypair = RsaPssKeyPair::generate().unwrap();
///     let builder = EnvelopeBuilder::new(RsaPssSigner::new(&keypair).unwrap())
///         .with_config(SealConfig::default().max_payload_bytes(64 * 1024));
///
///     let payload = JsonValue::object([("id", JsonValue::from(1)), ("data", "test".into())]);
///     let envelope = builder.sign(&payload).await.unwrap();
///     println!("{}", envelope.to_json().unwrap());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder<S> {
    signer: S,
    config: SealConfig,
}

impl<S: PayloadSigner> EnvelopeBuilder<S> {
    pub fn new(signer: S) -> Self {
        Self {
            signer,
            config: SealConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SealConfig) -> Self {
        self.config = config;
        self
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    pub fn config(&self) -> &SealConfig {
        &self.config
    }

    /// Seal a payload.
    pub async fn sign(&self, payload: &JsonValue) -> Result<SignedEnvelope> {
        seal(payload, &self.signer, &self.config).await
    }

    /// Validate a host document, then seal the resulting tree.
    ///
    /// The returned future is not `Send`: document handles are
    /// single-threaded.
    pub async fn sign_document(&self, doc: &Document) -> Result<SignedEnvelope> {
        let payload = validate::validate_with(doc, &self.config.validator)?;
        seal(&payload, &self.signer, &self.config).await
    }
}

/// Seal a payload with the default configuration.
pub async fn sign<S>(payload: &JsonValue, signer: &S) -> Result<SignedEnvelope>
where
    S: PayloadSigner + ?Sized,
{
    seal(payload, signer, &SealConfig::default()).await
}

/// Validate a host document, then seal it with the default configuration.
pub async fn sign_document<S>(doc: &Document, signer: &S) -> Result<SignedEnvelope>
where
    S: PayloadSigner + ?Sized,
{
    let payload = validate::validate(doc)?;
    seal(&payload, signer, &SealConfig::default()).await
}

async fn seal<S>(payload: &JsonValue, signer: &S, config: &SealConfig) -> Result<SignedEnvelope>
where
    S: PayloadSigner + ?Sized,
{
    validate::check_with(payload, &config.validator)?;
    let canonical = canonicalize(payload)?;

    if let Some(limit) = config.max_payload_bytes {
        if canonical.len() > limit {
            return Err(ValidationError::new(
                "$",
                format!("canonical payload is {} bytes, limit is {limit}", canonical.len()),
            )
            .into());
        }
    }

    debug!(
        algorithm = signer.algorithm(),
        payload_len = canonical.len(),
        "sealing payload"
    );

    let signature = signer.sign(canonical.as_bytes()).await?;

    Ok(SignedEnvelope {
        version: ENVELOPE_VERSION,
        timestamp: format_timestamp(Utc::now()),
        payload: payload.clone(),
        signature: SignatureBlock {
            algorithm: signer.algorithm().to_string(),
            public_key: signer.public_key_pem().to_string(),
            value: encoding::encode(&signature),
        },
    })
}
