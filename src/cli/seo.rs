use std::{io, path::PathBuf, process::ExitCode};

use clap::Args;
use pod_calc::{rule::Rule, rulebook::RuleBook, seo::ListingDraft};

use crate::{
    cli::{CliError, emit},
    config::OutputFormat,
};

#[derive(Debug, Args)]
pub(crate) struct SeoArgs {
    /// JSON file holding a `listing` object
    file: PathBuf,
}

pub(crate) fn run(
    args: &SeoArgs,
    rule_book: &RuleBook,
    format: OutputFormat,
    out: &mut impl io::Write,
) -> Result<ExitCode, CliError> {
    let draft = ListingDraft::load(&args.file)?;
    let Ok(report) = rule_book.seo_validator().evaluate(&draft);

    emit(out, format, &report)?;

    Ok(ExitCode::SUCCESS)
}
