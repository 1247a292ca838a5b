//! Error types for json-seal core.

use thiserror::Error;

/// The input is not representable in the JSON data model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid payload at {path}: {reason}")]
    InvalidPayload { path: String, reason: String },
}

impl ValidationError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Location of the offending value, e.g. `$.items[2].name`.
    pub fn path(&self) -> &str {
        match self {
            Self::InvalidPayload { path, .. } => path,
        }
    }

    /// Why the value was rejected.
    pub fn reason(&self) -> &str {
        match self {
            Self::InvalidPayload { reason, .. } => reason,
        }
    }
}

/// Errors that abort canonicalization. No partial output is ever produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalError {
    #[error("non-finite numbers have no canonical form")]
    NonFiniteNumber,

    #[error("unpaired surrogate 0x{unit:04X} at code unit {index}")]
    InvalidSurrogate { index: usize, unit: u16 },

    #[error("duplicate object key: {0:?}")]
    DuplicateKey(String),

    #[error("unsupported value kind: {0}")]
    UnsupportedKind(String),

    #[error("decoding error: {0}")]
    Decode(String),
}

/// Result type for validation.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Result type for canonicalization.
pub type Result<T> = std::result::Result<T, CanonicalError>;
