//! Subcommand implementations.
//!
//! Each command reads its inputs from disk (or stdin), calls into
//! `veripay_protocol`, and writes exactly one JSON document to its output.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use veripay_protocol::transaction::format_timestamp;
use veripay_protocol::{
    sign_transaction, verify_payload, PrivateKey, ProtocolConfig, PublicKey, TransactionBuilder,
    VerificationOutcome,
};

use crate::cli::{SignArgs, VerifyArgs};

/// JSON shape printed by `veripay verify`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct VerifyReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl From<VerificationOutcome> for VerifyReport {
    fn from(outcome: VerificationOutcome) -> Self {
        Self {
            valid: outcome.is_valid(),
            reason: outcome.reason().map(|r| r.public_code()),
        }
    }
}

/// Builds, signs and emits a transaction. Returns the JSON payload.
pub fn run_sign(args: &SignArgs) -> Result<String> {
    let pem = fs::read(&args.private_key)
        .with_context(|| format!("failed to read private key {}", args.private_key.display()))?;
    let key = PrivateKey::from_pem(pem)
        .with_context(|| format!("failed to decode private key {}", args.private_key.display()))?;

    let tx = TransactionBuilder::new()
        .currency(&args.currency)
        .amount(&args.amount)
        .remark(&args.remark)
        .build()
        .context("invalid transaction")?;

    let config = ProtocolConfig::default().with_algorithm(args.algorithm);
    let signed = sign_transaction(tx, &key, &config).context("signing failed")?;
    let payload = signed.to_json().context("failed to serialize payload")?;

    tracing::info!(
        algorithm = %args.algorithm,
        signer = %key.public_key().fingerprint(),
        created_at = %format_timestamp(&signed.transaction.created_at),
        "transaction signed"
    );

    match &args.output {
        Some(path) => fs::write(path, &payload)
            .with_context(|| format!("failed to write payload to {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{payload}").context("failed to write to stdout")?;
        }
    }

    Ok(payload)
}

/// Verifies a payload and prints a [`VerifyReport`] on stdout.
pub fn run_verify(args: &VerifyArgs) -> Result<VerifyReport> {
    let pem = fs::read(&args.public_key)
        .with_context(|| format!("failed to read public key {}", args.public_key.display()))?;
    let key = PublicKey::from_pem(pem)
        .with_context(|| format!("failed to decode public key {}", args.public_key.display()))?;

    let payload = read_input(&args.input)?;
    let mut config = ProtocolConfig::default()
        .with_algorithm(args.algorithm)
        .with_max_age(Duration::from_secs(args.max_age_secs));
    if let Some(secs) = args.max_future_skew_secs {
        config = config.with_max_future_skew(Duration::from_secs(secs));
    }
    let now = args.at.unwrap_or_else(Utc::now);

    let outcome = verify_payload(trim_payload(&payload), &key, now, &config);
    tracing::info!(%outcome, signer = %key.fingerprint(), "payload verified");

    let report = VerifyReport::from(outcome);
    let json = serde_json::to_string(&report).context("failed to serialize report")?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}").context("failed to write to stdout")?;

    Ok(report)
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .context("failed to read payload from stdin")?;
        Ok(buf)
    } else {
        fs::read(path).with_context(|| format!("failed to read payload {}", path.display()))
    }
}

/// Strips the trailing newline that shells and editors append.
fn trim_payload(payload: &[u8]) -> &[u8] {
    let end = payload
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    &payload[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use chrono::DateTime;
    use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;
    use ed25519_dalek::pkcs8::{EncodePrivateKey, EncodePublicKey};
    use ed25519_dalek::SigningKey;
    use tempfile::TempDir;
    use veripay_protocol::SignatureAlgorithm;

    struct Fixture {
        dir: TempDir,
        private_key: PathBuf,
        public_key: PathBuf,
    }

    fn fixture(seed: u8) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let signing_key = SigningKey::from_bytes(&[seed; 32]);
        let private_key = dir.path().join("terminal.pem");
        let public_key = dir.path().join("terminal.pub.pem");
        fs::write(
            &private_key,
            signing_key.to_pkcs8_pem(LineEnding::LF).unwrap().as_bytes(),
        )
        .unwrap();
        fs::write(
            &public_key,
            signing_key
                .verifying_key()
                .to_public_key_pem(LineEnding::LF)
                .unwrap(),
        )
        .unwrap();
        Fixture {
            dir,
            private_key,
            public_key,
        }
    }

    fn sign_args(fx: &Fixture, output: Option<PathBuf>) -> SignArgs {
        SignArgs {
            private_key: fx.private_key.clone(),
            currency: "USD".into(),
            amount: "10.20".into(),
            remark: "Payment for service".into(),
            algorithm: SignatureAlgorithm::Ed25519,
            output,
        }
    }

    fn verify_args(public_key: PathBuf, input: PathBuf, at: Option<DateTime<Utc>>) -> VerifyArgs {
        VerifyArgs {
            public_key,
            input,
            max_age_secs: 300,
            max_future_skew_secs: None,
            algorithm: SignatureAlgorithm::Ed25519,
            at,
        }
    }

    #[test]
    fn sign_then_verify_through_files() {
        let fx = fixture(1);
        let payload_path = fx.dir.path().join("payment.json");
        let payload = run_sign(&sign_args(&fx, Some(payload_path.clone()))).unwrap();

        assert_eq!(fs::read_to_string(&payload_path).unwrap(), payload);
        assert!(payload.contains(r#""amount":"10.2""#));

        let report = run_verify(&verify_args(fx.public_key.clone(), payload_path, None)).unwrap();
        assert_eq!(
            report,
            VerifyReport {
                valid: true,
                reason: None
            }
        );
    }

    #[test]
    fn verify_with_wrong_key_reports_signature_invalid() {
        let signer = fixture(1);
        let stranger = fixture(2);
        let payload_path = signer.dir.path().join("payment.json");
        run_sign(&sign_args(&signer, Some(payload_path.clone()))).unwrap();

        let report =
            run_verify(&verify_args(stranger.public_key.clone(), payload_path, None)).unwrap();
        assert!(!report.valid);
        assert_eq!(report.reason, Some("signature_invalid"));
    }

    #[test]
    fn verify_at_later_instant_reports_expired() {
        let fx = fixture(3);
        let payload_path = fx.dir.path().join("payment.json");
        run_sign(&sign_args(&fx, Some(payload_path.clone()))).unwrap();

        let later = Utc::now() + chrono::Duration::minutes(6);
        let report =
            run_verify(&verify_args(fx.public_key.clone(), payload_path, Some(later))).unwrap();
        assert_eq!(report.reason, Some("expired"));
    }

    #[test]
    fn future_payload_is_valid_unless_skew_limit_is_set() {
        let fx = fixture(8);
        let payload_path = fx.dir.path().join("payment.json");
        run_sign(&sign_args(&fx, Some(payload_path.clone()))).unwrap();
        let earlier = Utc::now() - chrono::Duration::minutes(10);

        let mut args = verify_args(fx.public_key.clone(), payload_path, Some(earlier));
        assert!(run_verify(&args).unwrap().valid);

        args.max_future_skew_secs = Some(60);
        let report = run_verify(&args).unwrap();
        assert_eq!(report.reason, Some("not_yet_valid"));
    }

    #[test]
    fn garbage_payload_reports_signature_invalid() {
        let fx = fixture(4);
        let payload_path = fx.dir.path().join("payment.json");
        fs::write(&payload_path, b"not json at all\n").unwrap();

        let report = run_verify(&verify_args(fx.public_key.clone(), payload_path, None)).unwrap();
        assert_eq!(report.reason, Some("signature_invalid"));
    }

    #[test]
    fn invalid_amount_fails_sign() {
        let fx = fixture(5);
        let mut args = sign_args(&fx, Some(fx.dir.path().join("out.json")));
        args.amount = "-3".into();
        let err = run_sign(&args).unwrap_err();
        assert!(format!("{err:#}").contains("invalid transaction"));
    }

    #[test]
    fn missing_key_file_is_an_error() {
        let fx = fixture(6);
        let mut args = sign_args(&fx, None);
        args.private_key = fx.dir.path().join("absent.pem");
        let err = run_sign(&args).unwrap_err();
        assert!(err.to_string().contains("failed to read private key"));
    }

    #[test]
    fn public_key_is_not_a_private_key() {
        let fx = fixture(7);
        let mut args = sign_args(&fx, None);
        args.private_key = fx.public_key.clone();
        assert!(run_sign(&args).is_err());
    }

    #[test]
    fn report_json_omits_reason_when_valid() {
        let valid = serde_json::to_string(&VerifyReport::from(VerificationOutcome::Valid)).unwrap();
        assert_eq!(valid, r#"{"valid":true}"#);

        let expired = VerifyReport::from(VerificationOutcome::Invalid(
            veripay_protocol::FailureReason::Expired,
        ));
        assert_eq!(
            serde_json::to_string(&expired).unwrap(),
            r#"{"valid":false,"reason":"expired"}"#
        );
    }

    #[test]
    fn trailing_whitespace_is_trimmed() {
        assert_eq!(trim_payload(b"{}\n"), b"{}");
        assert_eq!(trim_payload(b"{} \r\n\t"), b"{}");
        assert_eq!(trim_payload(b"\n"), b"");
    }
}
