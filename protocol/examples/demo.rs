//! Terminal walkthrough of a VeriPay payment.
//!
//! A terminal signs a payment, the JSON payload crosses a (pretend) QR
//! code, and a receiver verifies it three times: with the right key, with a
//! stranger's key, and six minutes too late.
//!
//! Run with:
//!   cargo run --example demo

use chrono::Duration;
use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;
use ed25519_dalek::pkcs8::{EncodePrivateKey, EncodePublicKey};
use ed25519_dalek::SigningKey;

use veripay_protocol::transaction::parse_timestamp;
use veripay_protocol::{
    sign_transaction_at, verify_payload, PrivateKey, ProtocolConfig, PublicKey,
    TransactionBuilder, VerificationOutcome,
};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn section(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}==[ Step {num} ]== {title}{RESET}");
}

fn show_outcome(label: &str, outcome: VerificationOutcome) {
    let color = if outcome.is_valid() { GREEN } else { RED };
    println!("  {label:<32} {BOLD}{color}{outcome}{RESET}");
}

/// Stands in for the external key manager: mints a PEM pair from a seed.
fn pem_pair(seed: u8) -> (String, String) {
    let signing_key = SigningKey::from_bytes(&[seed; 32]);
    let private_pem = signing_key
        .to_pkcs8_pem(LineEnding::LF)
        .expect("encode private key")
        .to_string();
    let public_pem = signing_key
        .verifying_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("encode public key");
    (private_pem, public_pem)
}

fn main() {
    let config = ProtocolConfig::default();

    section(1, "Key material arrives from the key manager");
    let (terminal_private, terminal_public) = pem_pair(1);
    let (_, stranger_public) = pem_pair(2);
    let terminal_key = PrivateKey::from_pem(&terminal_private).expect("terminal key");
    let receiver_view = PublicKey::from_pem(&terminal_public).expect("terminal public key");
    let stranger_view = PublicKey::from_pem(&stranger_public).expect("stranger public key");
    println!("  terminal key   {DIM}{receiver_view:?}{RESET}");
    println!("  stranger key   {DIM}{stranger_view:?}{RESET}");

    section(2, "Terminal signs the payment");
    let created_at = parse_timestamp("2024-11-18T07:13:42.582Z").expect("timestamp");
    let tx = TransactionBuilder::new()
        .currency("USD")
        .amount("10.2")
        .remark("Payment for service")
        .build()
        .expect("valid transaction");
    let signed = sign_transaction_at(tx, &terminal_key, &config, created_at).expect("signed");
    let payload = signed.to_json().expect("json");
    println!("  QR payload ({} bytes):", payload.len());
    println!("  {DIM}{payload}{RESET}");

    section(3, "Receiver verifies offline");
    let payload = payload.as_bytes();
    show_outcome(
        "terminal key, +1s",
        verify_payload(payload, &receiver_view, created_at + Duration::seconds(1), &config),
    );
    show_outcome(
        "stranger key, +1s",
        verify_payload(payload, &stranger_view, created_at + Duration::seconds(1), &config),
    );
    show_outcome(
        "terminal key, +6min",
        verify_payload(payload, &receiver_view, created_at + Duration::minutes(6), &config),
    );
    println!();
}
