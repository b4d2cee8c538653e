//! Mr Provisioner command-line client
//!
//! Uploads boot images and preseeds to an MrP server and reads or changes
//! the provisioning and power state of its machines.
//!
//! Exit codes: 0 on success, 1 on any error, 2 when a `check` finds nothing.

mod cli;
mod commands;
mod config;

use clap::Parser;
use cli::Cli;
use commands::execute;
use config::ClientConfig;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Crates whose level follows `--verbose`
const LOG_TARGETS: &[&str] = &["mrp", "mrp_client"];

fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8) {
    let level = log_level(verbose);
    let directives = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    // RUST_LOG wins when set
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ClientConfig::from_cli(&cli);
    info!("MrP URL: {}", config.url);

    let http = match config.connect() {
        Ok(http) => http,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = std::io::stdout().lock();
    match execute(&cli.command, &http, &mut stdout).await {
        Ok(outcome) => {
            let code = outcome.exit_code();
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
