//! # Protocol Configuration & Constants
//!
//! Every fixed parameter of the wire protocol lives here, together with the
//! handful of knobs a deployment is allowed to turn. The constants are part
//! of the protocol: a signer and a verifier that disagree on any of them
//! will disagree on every signature.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crypto::SignatureAlgorithm;

// ---------------------------------------------------------------------------
// Freshness Window
// ---------------------------------------------------------------------------

/// How long a signed transaction stays acceptable after `created_at`.
/// Five minutes covers a customer walking from the counter to the door,
/// not a screenshot shared the next morning.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(300);

// ---------------------------------------------------------------------------
// Field Constraints
// ---------------------------------------------------------------------------

/// Currency codes are three uppercase ASCII letters (ISO 4217 shape).
pub const CURRENCY_CODE_LENGTH: usize = 3;

/// Maximum remark length in bytes. A QR code at medium error correction
/// tops out around 2 KB; the remark must leave room for everything else.
pub const MAX_REMARK_LENGTH: usize = 512;

/// Maximum number of fractional digits an amount may carry after
/// normalization. 18 matches the finest-grained assets anyone prices in.
pub const MAX_AMOUNT_SCALE: u8 = 18;

// ---------------------------------------------------------------------------
// Encodings
// ---------------------------------------------------------------------------

/// `created_at` text form: RFC 3339, UTC, exactly three fractional digits.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Name of the transport encoding used for the `signature` field.
pub const SIGNATURE_ENCODING: &str = "base64";

// ---------------------------------------------------------------------------
// ProtocolConfig
// ---------------------------------------------------------------------------

/// Tunable parameters shared by the signer and the verifier.
///
/// Both sides must agree on `algorithm`. The time windows only matter on
/// the verifying side and can be tuned per deployment to account for
/// clock quality at the point of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Signature scheme used to sign and verify the canonical form.
    #[serde(default)]
    pub algorithm: SignatureAlgorithm,

    /// Transactions with `now - created_at >= max_age` are expired.
    #[serde(default = "default_max_age", with = "duration_secs")]
    pub max_age: Duration,

    /// Opt-in: when set, transactions with `created_at - now > skew` are not
    /// yet valid. `None` accepts any `created_at` ahead of the local clock.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "optional_duration_secs"
    )]
    pub max_future_skew: Option<Duration>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            algorithm: SignatureAlgorithm::default(),
            max_age: DEFAULT_MAX_AGE,
            max_future_skew: None,
        }
    }
}

impl ProtocolConfig {
    /// Replaces the signature algorithm.
    pub fn with_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Replaces the freshness window.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Enables the forward clock skew check with the given tolerance.
    pub fn with_max_future_skew(mut self, skew: Duration) -> Self {
        self.max_future_skew = Some(skew);
        self
    }
}

fn default_max_age() -> Duration {
    DEFAULT_MAX_AGE
}


/// Whole-second `Duration` encoding for config files and env overrides.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

mod optional_duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.map(|d| d.as_secs()).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|secs| secs.map(Duration::from_secs))
    }
}
