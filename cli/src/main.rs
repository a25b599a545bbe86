// Copyright (c) 2026 VeriPay Contributors. MIT License.
// See LICENSE for details.

//! # VeriPay CLI
//!
//! Entry point for the `veripay` binary. Parses CLI arguments, initializes
//! logging, and dispatches to a subcommand:
//!
//! - `sign`    — build and sign a transaction, print the JSON payload
//! - `verify`  — verify a JSON payload, print `{"valid":..,"reason":..}`
//! - `version` — print build version information
//!
//! `verify` exits with status 1 when the payload is not valid. Any other
//! failure (unreadable key, bad flags) exits with status 2.

mod cli;
mod commands;
mod logging;

use std::process::ExitCode;

use clap::Parser;

use cli::{Commands, VeripayCli};

fn main() -> ExitCode {
    let cli = VeripayCli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: VeripayCli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Sign(args) => {
            logging::init_logging(logging::DEFAULT_FILTER, cli.log_format);
            commands::run_sign(&args)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Verify(args) => {
            logging::init_logging(logging::DEFAULT_FILTER, cli.log_format);
            let report = commands::run_verify(&args)?;
            Ok(if report.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Version => {
            print_version();
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Prints version information to stdout.
fn print_version() {
    println!("veripay   {}", env!("CARGO_PKG_VERSION"));
    println!(
        "encoding  canonical-json / {}",
        veripay_protocol::config::SIGNATURE_ENCODING
    );
}
