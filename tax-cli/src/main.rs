use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tax_cli::app::{self, Cli, Outcome};

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `warn`, or `debug` with `--verbose`.
/// * Strips timestamps and target names to keep CLI output clean.
/// * Writes to stderr so the report on stdout stays clean.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(?cli, "parsed arguments");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match app::run(&cli, &mut out)? {
        Outcome::Reported => {
            out.flush().context("Failed to flush output")?;
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Help => {
            Cli::command().print_help().context("Failed to print help")?;
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Invalid(errors) => {
            for error in errors.iter() {
                eprintln!("{error}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
