//! Transaction records and their construction via the builder pattern.
//!
//! Three shapes, one per lifecycle stage:
//!
//! - [`UnsignedTransaction`] — what a terminal wants to sign. `created_at`
//!   may be absent; the signer fills it in.
//! - [`Transaction`] — the four signable fields, all present.
//! - [`SignedTransaction`] — a `Transaction` plus its base64 signature.
//!   This is what travels inside the QR code.
//!
//! The [`TransactionBuilder`] collects raw user input, and `.build()`
//! validates it into an `UnsignedTransaction`. It does not sign — that
//! happens in [`super::signing`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::canonical::canonicalize;
use super::types::{
    timestamp, validate_remark, validate_timestamp, Amount, CurrencyCode, FieldError,
};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// The signable payment record.
///
/// Exactly these four fields participate in the signature, rendered by
/// [`canonicalize`] in fixed alphabetical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Three-letter currency code.
    pub currency: CurrencyCode,

    /// Exact decimal amount. Must be positive.
    pub amount: Amount,

    /// Free text. Absent on the wire means empty.
    #[serde(default)]
    pub remark: String,

    /// Signing time, UTC, millisecond precision.
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Canonical bytes used as the signature message.
    pub fn signable_bytes(&self) -> Vec<u8> {
        canonicalize(self)
    }

    /// Checks the invariants the type system does not already enforce.
    pub fn validate(&self) -> Result<(), FieldError> {
        if !self.amount.is_positive() {
            return Err(FieldError::NonPositiveAmount);
        }
        validate_remark(&self.remark)?;
        validate_timestamp(&self.created_at)
    }
}

// ---------------------------------------------------------------------------
// UnsignedTransaction
// ---------------------------------------------------------------------------

/// A transaction awaiting a signature.
///
/// `created_at` is normally `None`: the signer's clock is authoritative.
/// Server-side code that already stamped the record may pin it instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub currency: CurrencyCode,
    pub amount: Amount,
    pub remark: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl UnsignedTransaction {
    /// Attaches a timestamp, yielding the signable record.
    pub fn stamped(self, created_at: DateTime<Utc>) -> Transaction {
        Transaction {
            currency: self.currency,
            amount: self.amount,
            remark: self.remark,
            created_at,
        }
    }

    /// Same checks as [`Transaction::validate`]. A missing `created_at`
    /// passes; the signer checks the stamped value.
    pub fn validate(&self) -> Result<(), FieldError> {
        if !self.amount.is_positive() {
            return Err(FieldError::NonPositiveAmount);
        }
        validate_remark(&self.remark)?;
        match &self.created_at {
            Some(at) => validate_timestamp(at),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// SignedTransaction
// ---------------------------------------------------------------------------

/// A transaction with its signature attached: the QR payload.
///
/// On the wire the transaction fields and `signature` sit side by side in
/// one flat JSON object:
///
/// ```json
/// {"currency":"USD","amount":"10.2","remark":"Payment for service",
///  "created_at":"2024-11-18T07:13:42.582Z","signature":"…base64…"}
/// ```
///
/// Deserialization goes through a flat wire struct instead of
/// `#[serde(flatten)]`, which would buffer the fields and hide the exact
/// source text of a numeric amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,

    /// Base64 signature over `transaction.signable_bytes()`.
    pub signature: String,
}

/// Wire layout of [`SignedTransaction`]. Unknown keys are ignored.
#[derive(Deserialize)]
struct SignedWire {
    currency: CurrencyCode,
    amount: Amount,
    #[serde(default)]
    remark: String,
    #[serde(with = "timestamp")]
    created_at: DateTime<Utc>,
    signature: String,
}

impl<'de> Deserialize<'de> for SignedTransaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = SignedWire::deserialize(deserializer)?;
        Ok(Self {
            transaction: Transaction {
                currency: wire.currency,
                amount: wire.amount,
                remark: wire.remark,
                created_at: wire.created_at,
            },
            signature: wire.signature,
        })
    }
}

impl SignedTransaction {
    /// Compact JSON, ready to hand to a QR encoder.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses the JSON transport form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parses the JSON transport form from raw bytes (e.g. a decoded QR).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Canonical bytes of the signed fields. The signature is never included.
    pub fn signable_bytes(&self) -> Vec<u8> {
        self.transaction.signable_bytes()
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`UnsignedTransaction`] instances.
///
/// # Usage
///
/// ```
/// use veripay_protocol::transaction::TransactionBuilder;
///
/// let tx = TransactionBuilder::new()
///     .currency("USD")
///     .amount("10.2")
///     .remark("Payment for service")
///     .build()
///     .unwrap();
///
/// assert_eq!(tx.amount.to_string(), "10.2");
/// assert!(tx.created_at.is_none());
/// ```
#[derive(Debug, Default, Clone)]
pub struct TransactionBuilder {
    currency: Option<String>,
    amount: Option<String>,
    remark: String,
    created_at: Option<DateTime<Utc>>,
}

impl TransactionBuilder {
    /// Creates an empty builder. `remark` defaults to empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the currency code (validated at build time).
    pub fn currency(mut self, code: &str) -> Self {
        self.currency = Some(code.to_string());
        self
    }

    /// Sets the amount as decimal text (validated at build time).
    pub fn amount(mut self, amount: &str) -> Self {
        self.amount = Some(amount.to_string());
        self
    }

    /// Sets the free-text remark.
    pub fn remark(mut self, remark: &str) -> Self {
        self.remark = remark.to_string();
        self
    }

    /// Pins `created_at` instead of letting the signer stamp it.
    ///
    /// Only for server-side callers that own the clock. Never feed this
    /// from client input.
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Validates the collected fields.
    ///
    /// # Errors
    ///
    /// [`FieldError::MissingField`] if currency or amount was never set,
    /// otherwise the first field-level failure.
    pub fn build(self) -> Result<UnsignedTransaction, FieldError> {
        let currency = self
            .currency
            .ok_or(FieldError::MissingField { field: "currency" })?;
        let amount = self
            .amount
            .ok_or(FieldError::MissingField { field: "amount" })?;

        let tx = UnsignedTransaction {
            currency: CurrencyCode::new(&currency)?,
            amount: amount.parse()?,
            remark: self.remark,
            created_at: self.created_at,
        };
        tx.validate()?;
        Ok(tx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
