//! Canonical byte form of a transaction.
//!
//! This is the message the signature is computed over, so it is a protocol
//! constant, not an implementation detail. The form is a compact JSON
//! object with the four signable fields in alphabetical key order, every
//! value a JSON string:
//!
//! ```text
//! {"amount":"10.2","created_at":"2024-11-18T07:13:42.582Z","currency":"USD","remark":"Payment for service"}
//! ```
//!
//! The order comes from the [`CANONICAL_FIELDS`] table, not from any map's
//! iteration order: a `BTreeMap` happens to sort, a `HashMap` doesn't, and
//! `serde_json` with `preserve_order` uses insertion order. None of those
//! are a contract. This table is.

use serde_json::Value;

use super::builder::Transaction;
use super::types::format_timestamp;

/// Renders one signable field as text.
type FieldRenderer = fn(&Transaction) -> String;

/// Signable fields in canonical (alphabetical) order. Fixed forever.
pub const CANONICAL_FIELDS: [(&str, FieldRenderer); 4] = [
    ("amount", |tx: &Transaction| tx.amount.to_string()),
    ("created_at", |tx: &Transaction| format_timestamp(&tx.created_at)),
    ("currency", |tx: &Transaction| tx.currency.to_string()),
    ("remark", |tx: &Transaction| tx.remark.clone()),
];

/// Serializes the signable fields of `tx` into canonical bytes.
///
/// Pure and total. The input type has no `signature` field, so a signature
/// can never leak into its own message.
pub fn canonicalize(tx: &Transaction) -> Vec<u8> {
    let mut out = String::with_capacity(96 + tx.remark.len());
    out.push('{');
    for (i, (name, render)) in CANONICAL_FIELDS.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_json_string(&mut out, name);
        out.push(':');
        push_json_string(&mut out, &render(tx));
    }
    out.push('}');
    out.into_bytes()
}

/// Appends `text` as a JSON string literal using `serde_json`'s escaping.
fn push_json_string(out: &mut String, text: &str) {
    out.push_str(&Value::from(text).to_string());
}
