//! Transaction verification: input parsing, signature check, freshness.
//!
//! The verifier runs on the receiving side, usually a phone with no network
//! and a clock of questionable quality. It is a pure function of its inputs:
//! the payload, the public key, the caller's idea of `now`, and the config.
//!
//! Checks run in a fixed order, and the first failure wins:
//!
//! 1. **Parse** — fields well-formed, signature present and decodable.
//! 2. **Signature** — the configured primitive accepts it.
//! 3. **Freshness** — `created_at` is not too old, and, when a skew limit
//!    is configured, not too far ahead.
//!
//! The signature goes before freshness, so a forged payload is never told
//! that it is merely stale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::builder::SignedTransaction;
use crate::config::ProtocolConfig;
use crate::crypto::{decode_signature, PublicKey};

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Why a transaction was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Missing or corrupt fields, or a signature that cannot be decoded.
    MalformedInput,
    /// The signature does not verify against the public key.
    SignatureInvalid,
    /// `now - created_at >= max_age`.
    Expired,
    /// `created_at` is further ahead of `now` than the configured skew.
    /// Never produced unless [`ProtocolConfig::max_future_skew`] is set.
    NotYetValid,
}

impl FailureReason {
    /// Precise reason code, for trusted logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput => "malformed_input",
            Self::SignatureInvalid => "signature_invalid",
            Self::Expired => "expired",
            Self::NotYetValid => "not_yet_valid",
        }
    }

    /// Reason code safe to show an untrusted party.
    ///
    /// Malformed input and bad signatures look identical from outside, so a
    /// prober cannot tell which byte it broke.
    pub fn public_code(&self) -> &'static str {
        match self {
            Self::MalformedInput | Self::SignatureInvalid => "signature_invalid",
            other => other.code(),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Result of verifying a signed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationOutcome {
    Valid,
    Invalid(FailureReason),
}

impl VerificationOutcome {
    /// Returns `true` for [`VerificationOutcome::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The failure reason, if any.
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            Self::Valid => None,
            Self::Invalid(reason) => Some(*reason),
        }
    }
}

impl From<FailureReason> for VerificationOutcome {
    fn from(reason: FailureReason) -> Self {
        Self::Invalid(reason)
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::Invalid(reason) => write!(f, "invalid ({})", reason),
        }
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verifies a raw JSON payload, as read from a QR code.
///
/// Anything that does not parse as a [`SignedTransaction`] is
/// [`FailureReason::MalformedInput`].
pub fn verify_payload(
    payload: &[u8],
    public_key: &PublicKey,
    now: DateTime<Utc>,
    config: &ProtocolConfig,
) -> VerificationOutcome {
    match SignedTransaction::from_slice(payload) {
        Ok(signed) => verify_transaction(&signed, public_key, now, config),
        Err(e) => reject(FailureReason::MalformedInput, &e.to_string()),
    }
}

/// Verifies a parsed signed transaction.
///
/// # Arguments
///
/// * `signed` — The transaction and its base64 signature.
/// * `public_key` — The signer's public key, obtained out of band.
/// * `now` — The verifier's clock reading. Never read internally.
/// * `config` — Algorithm and time windows; must match the signer's algorithm.
pub fn verify_transaction(
    signed: &SignedTransaction,
    public_key: &PublicKey,
    now: DateTime<Utc>,
    config: &ProtocolConfig,
) -> VerificationOutcome {
    // 1. Fields and signature must be well-formed.
    if let Err(e) = signed.transaction.validate() {
        return reject(FailureReason::MalformedInput, &e.to_string());
    }
    let signature = match decode_signature(&signed.signature) {
        Ok(signature) => signature,
        Err(e) => return reject(FailureReason::MalformedInput, &e.to_string()),
    };

    // 2-3. Recompute the canonical form and check the signature.
    let message = signed.signable_bytes();
    if !config.algorithm.verify(public_key, &message, &signature) {
        return reject(
            FailureReason::SignatureInvalid,
            &format!("rejected by {} for key {}", config.algorithm, public_key.fingerprint()),
        );
    }

    // 4. Freshness window.
    let created_at = signed.transaction.created_at;
    match (now - created_at).to_std() {
        Ok(elapsed) if elapsed >= config.max_age => {
            return reject(
                FailureReason::Expired,
                &format!("elapsed {}ms, max {}ms", elapsed.as_millis(), config.max_age.as_millis()),
            );
        }
        Ok(_) => {}
        // Negative elapsed time: created_at is ahead of our clock. Only
        // refused when the deployment opted into a skew limit.
        Err(_) => {
            if let Some(max_skew) = config.max_future_skew {
                let ahead = (created_at - now).to_std().unwrap_or_default();
                if ahead > max_skew {
                    return reject(
                        FailureReason::NotYetValid,
                        &format!("{}ms ahead of local clock", ahead.as_millis()),
                    );
                }
            }
        }
    }

    // 5. All checks passed.
    VerificationOutcome::Valid
}

fn reject(reason: FailureReason, detail: &str) -> VerificationOutcome {
    tracing::debug!(reason = %reason, detail, "transaction rejected");
    VerificationOutcome::Invalid(reason)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
