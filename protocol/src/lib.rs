// Copyright (c) 2026 VeriPay Contributors. MIT License.
// See LICENSE for details.

//! # VeriPay Protocol — Core Library
//!
//! Signed payment records that a receiver can check with nothing but a
//! public key and a clock. A merchant terminal signs a transaction, the
//! result travels as JSON inside a QR code, and the receiving side verifies
//! it offline. Screenshots of a banking app prove nothing; a signature does.
//!
//! ## Architecture
//!
//! - **config** — Protocol constants and the tunable [`ProtocolConfig`].
//! - **crypto** — Key decoding (PEM/DER) and the signature algorithms.
//! - **transaction** — Field types, canonical form, signing, verification.
//!
//! ## Quick tour
//!
//! ```text
//! TransactionBuilder ──build()──▶ UnsignedTransaction
//!        sign_transaction(priv)  ──▶ SignedTransaction ──to_json()──▶ QR
//! QR ──verify_payload(pub, now)  ──▶ VerificationOutcome
//! ```
//!
//! ## Ground rules
//!
//! 1. The canonical byte form is a protocol constant. Touch it and every
//!    deployed verifier breaks.
//! 2. No floating point near money. Amounts are exact decimals.
//! 3. The verifier never reads the clock. `now` is an argument.
//! 4. Key material never reaches a log line.

pub mod config;
pub mod crypto;
pub mod transaction;

pub use config::ProtocolConfig;
pub use crypto::{KeyError, PrivateKey, PublicKey, SignatureAlgorithm};
pub use transaction::{
    canonicalize, sign_transaction, sign_transaction_at, sign_transaction_pem, verify_payload,
    verify_transaction, Amount, CurrencyCode, FailureReason, FieldError, SignedTransaction,
    SigningError, Transaction, TransactionBuilder, UnsignedTransaction, VerificationOutcome,
};
