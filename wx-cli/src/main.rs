//! Binary crate for the `wx` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Orchestrating lookup, fetch and formatting
//! - Mapping failures to exit codes

use std::process::ExitCode;

use clap::Parser;
use wx_core::WeatherError;

mod cli;
mod logging;

const EXIT_FAILURE: u8 = 1;
const EXIT_ZIP_NOT_FOUND: u8 = 3;
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cmd = match cli::Cli::try_parse() {
        Ok(cmd) => cmd,
        Err(err) => {
            let _ = err.print();
            // Help and version land here too and are not failures.
            return if err.use_stderr() { ExitCode::from(EXIT_FAILURE) } else { ExitCode::SUCCESS };
        }
    };

    logging::init(cmd.verbose);

    tokio::select! {
        result = cmd.run() => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                tracing::debug!(error = ?err, "run failed");
                print_error(&err);
                ExitCode::from(exit_code(&err))
            }
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            eprintln!("\nOperation cancelled by user.");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<WeatherError>() {
        Some(WeatherError::ZipNotFound { .. }) => EXIT_ZIP_NOT_FOUND,
        _ => EXIT_FAILURE,
    }
}

fn print_error(err: &anyhow::Error) {
    let Some(weather) = err.downcast_ref::<WeatherError>() else {
        eprintln!("Error: {err:#}");
        return;
    };

    eprintln!("Error: {weather}");

    // Print helpful hints for common errors
    match weather {
        WeatherError::Credential => {
            eprintln!("Get your free API key at: https://openweathermap.org/api");
        }
        WeatherError::InvalidApiKey => {
            eprintln!();
            eprintln!("Hint: pass a new key with --api-key; it replaces the saved one.");
        }
        _ => {}
    }
}
