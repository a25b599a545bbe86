//! # Digital Signatures
//!
//! The signing and verification entry points used by the transaction
//! layer, plus the transport encoding for signature bytes.
//!
//! The algorithm is a configuration value, never negotiated from the
//! payload: a verifier configured for `Ed25519` will not be talked into
//! anything else by a crafted QR code.
//!
//! ## Strictness
//!
//! Verification uses `verify_strict` for pure Ed25519, which rejects
//! small-order keys and non-canonical signature encodings that lenient
//! verifiers accept.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ed25519_dalek::{Signature, Signer, SIGNATURE_LENGTH};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::keys::{PrivateKey, PublicKey};

/// Domain-separation context for prehashed signatures (RFC 8032 §5.1).
const PREHASH_CONTEXT: &[u8] = b"veripay-transaction";

/// Errors during signature operations.
///
/// Intentionally terse — verification failures carry no detail at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature is not valid base64")]
    Encoding,

    #[error("signature must be {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("signing primitive failed")]
    Primitive,

    #[error("unknown signature algorithm: {0}")]
    UnknownAlgorithm(String),
}

// ---------------------------------------------------------------------------
// SignatureAlgorithm
// ---------------------------------------------------------------------------

/// Signature scheme applied to the canonical transaction bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureAlgorithm {
    /// Pure Ed25519 (RFC 8032). SHA-512 is applied inside the primitive.
    #[default]
    Ed25519,
    /// Ed25519ph: the message is hashed with SHA-512 first and the digest
    /// is signed under a fixed context string.
    Ed25519ph,
}

impl SignatureAlgorithm {
    /// Stable identifier, suitable for config files and future payload tags.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519",
            Self::Ed25519ph => "ed25519ph",
        }
    }

    /// Signs `message` with `key`.
    pub fn sign(&self, key: &PrivateKey, message: &[u8]) -> Result<Signature, SignatureError> {
        match self {
            Self::Ed25519 => Ok(key.signing_key().sign(message)),
            Self::Ed25519ph => key
                .signing_key()
                .sign_prehashed(prehash(message), Some(PREHASH_CONTEXT))
                .map_err(|_| SignatureError::Primitive),
        }
    }

    /// Verifies `signature` over `message` against `key`.
    ///
    /// Returns `true` only if the primitive accepts. We don't distinguish
    /// "bad signature" from "wrong key" — both are just "nope."
    pub fn verify(&self, key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
        match self {
            Self::Ed25519 => key.verifying_key().verify_strict(message, signature).is_ok(),
            Self::Ed25519ph => key
                .verifying_key()
                .verify_prehashed(prehash(message), Some(PREHASH_CONTEXT), signature)
                .is_ok(),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ed25519" => Ok(Self::Ed25519),
            "ed25519ph" => Ok(Self::Ed25519ph),
            other => Err(SignatureError::UnknownAlgorithm(other.to_string())),
        }
    }
}

fn prehash(message: &[u8]) -> Sha512 {
    Sha512::new().chain_update(message)
}

// ---------------------------------------------------------------------------
// Transport encoding
// ---------------------------------------------------------------------------

/// Encodes signature bytes as standard, padded base64.
pub fn encode_signature(signature: &Signature) -> String {
    BASE64.encode(signature.to_bytes())
}

/// Decodes a base64 signature and checks its length.
pub fn decode_signature(encoded: &str) -> Result<Signature, SignatureError> {
    let bytes = BASE64
        .decode(encoded.as_bytes())
        .map_err(|_| SignatureError::Encoding)?;
    Signature::from_slice(&bytes).map_err(|_| SignatureError::Length {
        expected: SIGNATURE_LENGTH,
        actual: bytes.len(),
    })
}
