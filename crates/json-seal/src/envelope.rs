//! The signed envelope record.
//!
//! On the wire an envelope is a JSON object:
//!
//! ```text
//! {"version":1,"timestamp":"2024-05-01T12:00:00.000Z","payload":{...},
//!  "signature":{"algorithm":"RSA-PSS-SHA256","publicKey":"-----BEGIN PUBLIC KEY-----...","value":"<base64>"}}
//! ```
//!
//! Only `payload` is covered by the signature. The remaining fields are
//! read back as-is and checked for shape, never trusted.

use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, Deserialize, Deserializer};
use serde::Serialize;

use json_seal_core::{parse_preserving, JsonValue};

use crate::error::{Result, SealError};

/// Envelope format version.
pub const ENVELOPE_VERSION: u32 = 1;

/// A payload together with a detached signature over its canonical form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedEnvelope {
    /// Format version. Always [`ENVELOPE_VERSION`] for envelopes built here.
    pub version: u32,
    /// Creation time as reported by the signer, kept as received.
    ///
    /// Not covered by the signature: anyone holding the envelope can
    /// rewrite it without invalidating the seal. Put the time inside the
    /// payload if it must be trusted.
    pub timestamp: String,
    /// The payload as handed to the builder, not its canonical text.
    pub payload: JsonValue,
    pub signature: SignatureBlock,
}

/// The detached signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureBlock {
    /// Algorithm identifier, e.g. `RSA-PSS-SHA256`.
    pub algorithm: String,
    /// SPKI PEM text of the signing key.
    #[serde(rename = "publicKey")]
    pub public_key: String,
    /// Standard base64 of the signature bytes.
    pub value: String,
}

/// Envelope timestamp text: RFC 3339, UTC, millisecond precision.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl SignedEnvelope {
    /// Serialize to compact JSON text.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| SealError::MalformedEnvelope(format!("cannot serialize: {e}")))
    }

    /// Parse envelope JSON text.
    ///
    /// The envelope itself is read strictly: invalid JSON, a duplicate key
    /// at the top level or in `signature`, a missing field, or a field of
    /// the wrong type is [`SealError::MalformedEnvelope`]. `timestamp` must
    /// be present and a string, but its content is not checked; see
    /// [`created_at`](Self::created_at).
    ///
    /// `payload` is kept exactly as sent, including duplicate members,
    /// unpaired surrogate escapes and numbers outside the f64 range.
    /// Such a payload has no canonical form, so [`verify`](crate::verify)
    /// reports it as `valid = false`.
    pub fn from_json(text: &str) -> Result<Self> {
        let value = parse_preserving(text)
            .map_err(|e| SealError::MalformedEnvelope(e.reason().to_string()))?;
        reject_duplicate_keys(&value, "envelope")?;
        if let Some(block) = value.get("signature") {
            reject_duplicate_keys(block, "signature")?;
        }
        Self::from_value(&value)
    }

    /// Read an envelope out of an already-decoded JSON value.
    ///
    /// When a key repeats, the first occurrence wins.
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        if !value.is_object() {
            return Err(SealError::MalformedEnvelope("expected object".into()));
        }

        let version = match value.get("version") {
            Some(JsonValue::Number(n))
                if n.fract() == 0.0 && *n >= 0.0 && *n <= f64::from(u32::MAX) =>
            {
                *n as u32
            }
            Some(_) => return Err(SealError::MalformedEnvelope("invalid version".into())),
            None => return Err(SealError::MalformedEnvelope("missing version".into())),
        };

        let timestamp = match value.get("timestamp") {
            Some(JsonValue::String(s)) => s.to_utf8().ok_or_else(|| {
                SealError::MalformedEnvelope("timestamp is not valid text".into())
            })?,
            Some(_) => return Err(SealError::MalformedEnvelope("invalid timestamp".into())),
            None => return Err(SealError::MalformedEnvelope("missing timestamp".into())),
        };

        let payload = value
            .get("payload")
            .cloned()
            .ok_or_else(|| SealError::MalformedEnvelope("missing payload".into()))?;

        let signature = match value.get("signature") {
            Some(block) if block.is_object() => SignatureBlock::from_value(block)?,
            Some(_) => return Err(SealError::MalformedEnvelope("invalid signature".into())),
            None => return Err(SealError::MalformedEnvelope("missing signature".into())),
        };

        Ok(Self {
            version,
            timestamp,
            payload,
            signature,
        })
    }

    /// The timestamp parsed as RFC 3339, if it is one.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

impl SignatureBlock {
    fn from_value(block: &JsonValue) -> Result<Self> {
        let field = |name: &str| -> Result<String> {
            match block.get(name) {
                Some(JsonValue::String(s)) => s.to_utf8().ok_or_else(|| {
                    SealError::MalformedEnvelope(format!("signature.{name} is not valid text"))
                }),
                Some(_) => Err(SealError::MalformedEnvelope(format!(
                    "signature.{name} must be a string"
                ))),
                None => Err(SealError::MalformedEnvelope(format!(
                    "missing signature.{name}"
                ))),
            }
        };

        Ok(Self {
            algorithm: field("algorithm")?,
            public_key: field("publicKey")?,
            value: field("value")?,
        })
    }
}

fn reject_duplicate_keys(object: &JsonValue, location: &str) -> Result<()> {
    let Some(members) = object.as_object() else {
        return Ok(());
    };
    let mut seen = HashSet::with_capacity(members.len());
    for (key, _) in members {
        if !seen.insert(key.as_utf16()) {
            return Err(SealError::MalformedEnvelope(format!(
                "duplicate key {:?} in {location}",
                key.to_string_lossy()
            )));
        }
    }
    Ok(())
}

impl<'de> Deserialize<'de> for SignedEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        Self::from_value(&value).map_err(de::Error::custom)
    }
}
