//! RSA key material for RSA-PSS signing.
//!
//! Private keys travel as PKCS#8 PEM (`BEGIN PRIVATE KEY`); PKCS#1 PEM
//! (`BEGIN RSA PRIVATE KEY`), as emitted by older Node tooling, is also
//! accepted on import. Public keys travel as SPKI PEM (`BEGIN PUBLIC KEY`),
//! which is the string embedded in every envelope.

use std::fmt;

use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::digest::Sha256Hash;
use crate::error::{CryptoError, Result};

/// Default RSA modulus length in bits.
pub const DEFAULT_MODULUS_BITS: usize = 2048;

/// Key generation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyConfig {
    /// RSA modulus length in bits. Public exponent is always 65537.
    pub modulus_bits: usize,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            modulus_bits: DEFAULT_MODULUS_BITS,
        }
    }
}

/// An RSA public key usable for RSA-PSS verification.
#[derive(Clone, PartialEq, Eq)]
pub struct RsaPssPublicKey {
    key: RsaPublicKey,
    pem: String,
}

impl RsaPssPublicKey {
    /// Parse an SPKI PEM public key.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let key = RsaPublicKey::from_public_key_pem(pem.trim())
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        Self::from_key(key)
    }

    fn from_key(key: RsaPublicKey) -> Result<Self> {
        let pem = key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::Encoding(e.to_string()))?;
        Ok(Self { key, pem })
    }

    /// SPKI PEM text.
    pub fn to_pem(&self) -> &str {
        &self.pem
    }

    /// SHA-256 of the SPKI DER encoding.
    pub fn fingerprint(&self) -> Result<Sha256Hash> {
        let der = self
            .key
            .to_public_key_der()
            .map_err(|e| CryptoError::Encoding(e.to_string()))?;
        Ok(Sha256Hash::hash(der.as_bytes()))
    }

    pub(crate) fn inner(&self) -> &RsaPublicKey {
        &self.key
    }
}

impl fmt::Debug for RsaPssPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fingerprint() {
            Ok(fp) => write!(f, "RsaPssPublicKey({fp})"),
            Err(_) => f.write_str("RsaPssPublicKey(<unencodable>)"),
        }
    }
}

/// An RSA key pair for RSA-PSS signing.
#[derive(Clone)]
pub struct RsaPssKeyPair {
    private: RsaPrivateKey,
    public: RsaPssPublicKey,
}

impl RsaPssKeyPair {
    /// Generate a new random 2048-bit key pair.
    pub fn generate() -> Result<Self> {
        Self::generate_with(&KeyConfig::default())
    }

    /// Generate a new random key pair.
    pub fn generate_with(config: &KeyConfig) -> Result<Self> {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, config.modulus_bits)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        Self::from_private_key(private)
    }

    /// Import a private key from PKCS#8 or PKCS#1 PEM.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let pem = pem.trim();
        let private = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|pkcs8_err| {
                RsaPrivateKey::from_pkcs1_pem(pem).map_err(|_| pkcs8_err.to_string())
            })
            .map_err(CryptoError::InvalidPrivateKey)?;
        Self::from_private_key(private)
    }

    fn from_private_key(private: RsaPrivateKey) -> Result<Self> {
        private
            .validate()
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        let public = RsaPssPublicKey::from_key(private.to_public_key())?;
        Ok(Self { private, public })
    }

    /// PKCS#8 PEM text of the private key.
    pub fn private_key_pem(&self) -> Result<String> {
        let pem = self
            .private
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CryptoError::Encoding(e.to_string()))?;
        Ok(pem.as_str().to_owned())
    }

    /// SPKI PEM text of the public key.
    pub fn public_key_pem(&self) -> &str {
        self.public.to_pem()
    }

    pub fn public_key(&self) -> &RsaPssPublicKey {
        &self.public
    }

    pub(crate) fn private(&self) -> &RsaPrivateKey {
        &self.private
    }
}

impl fmt::Debug for RsaPssKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RsaPssKeyPair({:?})", self.public)
    }
}
