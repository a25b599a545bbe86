//! # Transaction Module
//!
//! Construction, canonicalization, signing and verification of VeriPay
//! payment records.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        — Field types (CurrencyCode, Amount) and timestamp format
//! builder.rs      — Transaction records and the fluent TransactionBuilder
//! canonical.rs    — The canonical byte form that signatures cover
//! signing.rs      — Signing with a private key
//! verification.rs — Parsing, signature and freshness checks
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build** — [`TransactionBuilder`] validates currency, amount, remark.
//! 2. **Sign** — [`sign_transaction`] stamps `created_at` and signs.
//! 3. **Transport** — [`SignedTransaction::to_json`] goes into a QR code.
//! 4. **Verify** — [`verify_payload`] on the receiving side, offline.
//!
//! ## Design Decisions
//!
//! - The canonical form is a fixed-order JSON object, see [`canonical`].
//! - Amounts are exact decimals. No floating point in the signed message.
//! - Timestamps carry exactly millisecond precision end to end.
//! - `now` is always injectable; only [`sign_transaction`] reads the clock.

pub mod builder;
pub mod canonical;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::{SignedTransaction, Transaction, TransactionBuilder, UnsignedTransaction};
pub use canonical::canonicalize;
pub use signing::{sign_transaction, sign_transaction_at, sign_transaction_pem, SigningError};
pub use types::{format_timestamp, parse_timestamp, Amount, CurrencyCode, FieldError};
pub use verification::{verify_payload, verify_transaction, FailureReason, VerificationOutcome};
