//! named-mutex: run commands under a lock shared between processes.
//!
//! This is the main entry point for the `named-mutex` CLI. It parses
//! arguments, dispatches to the appropriate command handler, and handles
//! errors with proper exit codes.

use named_mutex::cli::Cli;
use named_mutex::commands;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Diagnostics go to stderr so they never mix with a child's stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match commands::dispatch(cli) {
        Ok(code) => ExitCode::from(code.clamp(0, 255) as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
