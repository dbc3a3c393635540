//! POD Calc CLI

use std::{io, process::ExitCode};

use clap::Parser;
use tracing::error;

use crate::cli::Cli;

mod cli;
mod config;
mod observability;

fn main() -> ExitCode {
    // Load .env file if present (ignore if missing)
    _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(source) = observability::init(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for setup errors"
        )]
        {
            eprintln!("{source}");
        }

        return ExitCode::FAILURE;
    }

    let mut stdout = io::stdout().lock();

    match cli.run(&mut stdout) {
        Ok(code) => code,
        Err(source) => {
            error!(error = %source, "command failed");

            #[expect(clippy::print_stderr, reason = "command errors are reported on stderr")]
            {
                eprintln!("Error: {source}");
            }

            ExitCode::FAILURE
        }
    }
}
