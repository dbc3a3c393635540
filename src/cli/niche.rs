use std::{io, process::ExitCode};

use clap::Args;
use pod_calc::{
    niche::{Brand, TrendDirection, v1::NicheQueryV1, v2::NicheQueryV2},
    rule::Rule,
    rulebook::RuleBook,
};
use serde_json::json;
use tracing::warn;

use crate::{
    cli::{CliError, emit, emit_error},
    config::OutputFormat,
};

#[derive(Debug, Args)]
pub(crate) struct NicheV1Args {
    /// Query document, e.g. '{"niche": "...", "etsy_count": 500, "trend_score": 0.4}'
    #[arg(value_name = "JSON")]
    input: Vec<String>,
}

#[derive(Debug, Args)]
pub(crate) struct NicheArgs {
    /// Niche name
    niche: String,

    /// Active Etsy listings for the niche
    etsy_count: u64,

    /// Trend score, 0-100
    #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
    trend_score: u8,

    /// Direction the trend is moving in
    #[arg(long, value_enum, default_value_t = TrendDirection::Stable)]
    trend_direction: TrendDirection,

    /// Brand to assign instead of keyword matching
    #[arg(long, value_enum)]
    brand_hint: Option<Brand>,
}

pub(crate) fn run_v1(
    args: &NicheV1Args,
    rule_book: &RuleBook,
    format: OutputFormat,
    out: &mut impl io::Write,
) -> Result<ExitCode, CliError> {
    let [input] = args.input.as_slice() else {
        return emit_error(
            out,
            &json!({
                "error": r#"Usage: pod-calc niche-v1 '{"niche": "...", "etsy_count": ..., "trend_score": ...}'"#,
                "valid": false,
            }),
        );
    };

    let query = match NicheQueryV1::from_json(input) {
        Ok(query) => query,
        Err(error) => {
            warn!(%error, "rejected niche query");

            return emit_error(out, &json!({ "error": error.to_string(), "valid": false }));
        }
    };

    let Ok(verdict) = rule_book.niche_v1().evaluate(&query);

    emit(out, format, &verdict)?;

    Ok(ExitCode::SUCCESS)
}

pub(crate) fn run(
    args: &NicheArgs,
    rule_book: &RuleBook,
    format: OutputFormat,
    out: &mut impl io::Write,
) -> Result<ExitCode, CliError> {
    let mut query = NicheQueryV2::new(args.niche.clone(), args.etsy_count, args.trend_score)
        .with_direction(args.trend_direction);

    if let Some(brand) = args.brand_hint {
        query = query.with_brand_hint(brand);
    }

    let verdict = rule_book.niche_v2().evaluate(&query)?;

    emit(out, format, &verdict)?;

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::cli::tests::run_cli;

    fn run_json(args: &[&str]) -> Result<(ExitCode, serde_json::Value), Box<dyn std::error::Error>> {
        let (code, stdout) = run_cli(args)?;

        Ok((code, serde_json::from_str(&stdout)?))
    }

    #[test]
    fn v1_scores_a_low_competition_niche() -> TestResult {
        let (code, json) = run_json(&[
            "niche-v1",
            r#"{"niche": "cottagecore frogs", "etsy_count": 500, "trend_score": 0.4}"#,
        ])?;

        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(json["valid"], true);
        assert_eq!(json["recommendation"], "proceed");
        assert_eq!(json["scores"]["total_score"], 4);

        Ok(())
    }

    #[test]
    fn v1_accepts_numeric_strings() -> TestResult {
        let (code, json) = run_json(&[
            "niche-v1",
            r#"{"niche": "x", "etsy_count": "5000", "trend_score": "0.6"}"#,
        ])?;

        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(json["scores"]["competition_score"], 3);

        Ok(())
    }

    #[test]
    fn v1_missing_fields_are_listed() -> TestResult {
        let (code, json) = run_json(&["niche-v1", r#"{"niche": "x"}"#])?;

        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(json["error"], "Missing required fields: etsy_count, trend_score");
        assert_eq!(json["valid"], false);

        Ok(())
    }

    #[test]
    fn v1_non_integer_count_is_rejected() -> TestResult {
        let (code, json) = run_json(&[
            "niche-v1",
            r#"{"niche": "x", "etsy_count": "lots", "trend_score": 0.5}"#,
        ])?;

        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(json["error"], "etsy_count must be an integer");

        Ok(())
    }

    #[test]
    fn v1_without_argument_prints_usage() -> TestResult {
        let (code, json) = run_json(&["niche-v1"])?;

        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(json["valid"], false);

        Ok(())
    }

    #[test]
    fn v2_go_with_brand_hint() -> TestResult {
        let (code, json) = run_json(&[
            "niche",
            "jdm drift cars",
            "5000",
            "80",
            "--trend-direction",
            "rising",
            "--brand-hint",
            "LWF",
        ])?;

        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(json["decision"], "GO");
        assert_eq!(json["confidence"], 0.95);
        assert_eq!(json["brand_assignment"]["brand"], "LWF");
        assert_eq!(json["brand_assignment"]["method"], "hint");

        Ok(())
    }

    #[test]
    fn v2_trend_score_above_one_hundred_is_a_usage_error() {
        assert!(run_cli(&["niche", "cats", "5000", "101"]).is_err());
    }
}
