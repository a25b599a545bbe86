//! # CLI Interface
//!
//! Defines the command-line argument structure for `veripay` using `clap`
//! derive. Three subcommands: `sign`, `verify` and `version`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use veripay_protocol::SignatureAlgorithm;

use crate::logging::LogFormat;

/// VeriPay transaction signer and verifier.
///
/// Signs payment records with a terminal's private key and verifies signed
/// payloads offline against the terminal's public key.
#[derive(Parser, Debug)]
#[command(
    name = "veripay",
    about = "Sign and verify VeriPay transactions",
    version,
    propagate_version = true
)]
pub struct VeripayCli {
    /// Log output format (logs go to stderr).
    #[arg(long, global = true, value_enum, env = "VERIPAY_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `veripay` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign a new transaction and print its JSON payload.
    Sign(SignArgs),
    /// Verify a signed JSON payload.
    Verify(VerifyArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `sign` subcommand.
#[derive(Parser, Debug)]
pub struct SignArgs {
    /// Path to the terminal's PKCS#8 PEM private key.
    #[arg(long, env = "VERIPAY_PRIVATE_KEY")]
    pub private_key: PathBuf,

    /// ISO-4217-style currency code, e.g. USD.
    #[arg(long)]
    pub currency: String,

    /// Decimal amount, e.g. 10.2. Must be positive.
    #[arg(long)]
    pub amount: String,

    /// Free-text remark.
    #[arg(long, default_value = "")]
    pub remark: String,

    /// Signature algorithm: ed25519 or ed25519ph.
    #[arg(long, env = "VERIPAY_ALGORITHM", default_value = "ed25519")]
    pub algorithm: SignatureAlgorithm,

    /// Write the payload to this file instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Arguments for the `verify` subcommand.
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Path to the terminal's SPKI PEM public key.
    #[arg(long, env = "VERIPAY_PUBLIC_KEY")]
    pub public_key: PathBuf,

    /// File holding the signed payload; `-` reads stdin.
    #[arg(long, short = 'i', default_value = "-")]
    pub input: PathBuf,

    /// Maximum accepted age of the transaction, in seconds.
    #[arg(long, env = "VERIPAY_MAX_AGE_SECS", default_value_t = 300)]
    pub max_age_secs: u64,

    /// Refuse payloads whose `created_at` is more than this many seconds
    /// ahead of the verifying clock. Off unless set.
    #[arg(long, env = "VERIPAY_MAX_FUTURE_SKEW_SECS")]
    pub max_future_skew_secs: Option<u64>,

    /// Signature algorithm the signer used: ed25519 or ed25519ph.
    #[arg(long, env = "VERIPAY_ALGORITHM", default_value = "ed25519")]
    pub algorithm: SignatureAlgorithm,

    /// Verify as of this RFC 3339 instant instead of the current time.
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        VeripayCli::command().debug_assert();
    }

    #[test]
    fn sign_args_parse() {
        let cli = VeripayCli::try_parse_from([
            "veripay",
            "sign",
            "--private-key",
            "terminal.pem",
            "--currency",
            "USD",
            "--amount",
            "10.2",
            "--algorithm",
            "Ed25519ph",
        ])
        .unwrap();
        match cli.command {
            Commands::Sign(args) => {
                assert_eq!(args.currency, "USD");
                assert_eq!(args.remark, "");
                assert_eq!(args.algorithm, SignatureAlgorithm::Ed25519ph);
                assert!(args.output.is_none());
            }
            other => panic!("expected sign, got {:?}", other),
        }
    }

    #[test]
    fn verify_args_defaults() {
        let cli = VeripayCli::try_parse_from([
            "veripay",
            "--log-format",
            "json",
            "verify",
            "--public-key",
            "terminal.pub.pem",
            "--at",
            "2024-11-18T07:13:43.582Z",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Commands::Verify(args) => {
                assert_eq!(args.input, PathBuf::from("-"));
                assert_eq!(args.max_age_secs, 300);
                assert_eq!(args.max_future_skew_secs, None);
                assert_eq!(args.algorithm, SignatureAlgorithm::Ed25519);
                assert!(args.at.is_some());
            }
            other => panic!("expected verify, got {:?}", other),
        }
    }

    #[test]
    fn verify_accepts_future_skew_limit() {
        let cli = VeripayCli::try_parse_from([
            "veripay",
            "verify",
            "--public-key",
            "k.pem",
            "--max-future-skew-secs",
            "60",
        ])
        .unwrap();
        match cli.command {
            Commands::Verify(args) => assert_eq!(args.max_future_skew_secs, Some(60)),
            other => panic!("expected verify, got {:?}", other),
        }
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let result = VeripayCli::try_parse_from([
            "veripay",
            "verify",
            "--public-key",
            "k.pem",
            "--algorithm",
            "rsa",
        ]);
        assert!(result.is_err());
    }
}
