use std::{io, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;

use pod_calc::{
    niche::NicheInputError,
    pricing::PricingError,
    report::{ReportError, Tabulate},
    rulebook::{RuleBook, RuleBookError},
    seo::SeoError,
};

use crate::config::{LoggingConfig, OutputFormat};

mod niche;
mod pricing;
mod seo;

/// Errors that end a command with a message on stderr and no result document.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Rule book could not be loaded
    #[error(transparent)]
    RuleBook(#[from] RuleBookError),

    /// Listing draft could not be read
    #[error(transparent)]
    Seo(#[from] SeoError),

    /// Margin pricing failed
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Niche query was rejected
    #[error(transparent)]
    Niche(#[from] NicheInputError),

    /// Table could not be written
    #[error(transparent)]
    Report(#[from] ReportError),

    /// JSON document could not be written
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Output could not be written
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Parser)]
#[command(
    name = "pod-calc",
    about = "Print-on-demand listing, pricing and niche calculators",
    version,
    long_about = None
)]
pub(crate) struct Cli {
    /// Result format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,

    /// YAML rule book overriding the built-in thresholds
    #[arg(long, global = true, env = "POD_CALC_RULES")]
    rules: Option<PathBuf>,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check a listing draft against Etsy SEO rules
    Seo(seo::SeoArgs),

    /// Markup pricing from a JSON request
    #[command(name = "pricing-v1")]
    PricingV1(pricing::PricingV1Args),

    /// Margin pricing with optional competitor comparison
    Pricing(pricing::PricingArgs),

    /// Banded niche scoring from a JSON request
    #[command(name = "niche-v1")]
    NicheV1(niche::NicheV1Args),

    /// Gated go / no-go niche decision
    Niche(niche::NicheArgs),
}

impl Cli {
    pub(crate) fn run(&self, out: &mut impl io::Write) -> Result<ExitCode, CliError> {
        let rule_book = match &self.rules {
            Some(path) => RuleBook::load(path)?,
            None => RuleBook::default(),
        };

        match &self.command {
            Commands::Seo(args) => seo::run(args, &rule_book, self.output, out),
            Commands::PricingV1(args) => pricing::run_v1(args, &rule_book, self.output, out),
            Commands::Pricing(args) => pricing::run(args, &rule_book, self.output, out),
            Commands::NicheV1(args) => niche::run_v1(args, &rule_book, self.output, out),
            Commands::Niche(args) => niche::run(args, &rule_book, self.output, out),
        }
    }
}

/// Write a result in the requested format.
fn emit<T>(out: &mut impl io::Write, format: OutputFormat, value: &T) -> Result<(), CliError>
where
    T: Serialize + Tabulate,
{
    match format {
        OutputFormat::Json => write_json(out, value),
        OutputFormat::Table => Ok(value.write_table(out)?),
    }
}

/// Write a JSON error document and fail the command.
fn emit_error(out: &mut impl io::Write, document: &serde_json::Value) -> Result<ExitCode, CliError> {
    write_json(out, document)?;

    Ok(ExitCode::FAILURE)
}

fn write_json(out: &mut impl io::Write, value: &impl Serialize) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;

    Ok(())
}
