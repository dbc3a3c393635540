use std::{io, process::ExitCode};

use clap::Args;
use pod_calc::{
    pricing::v1::{PricingInputError, PricingRequestV1},
    pricing::v2::PricingRequest,
    rule::Rule,
    rulebook::RuleBook,
};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::warn;

use crate::{
    cli::{CliError, emit, emit_error},
    config::OutputFormat,
};

const V1_EXAMPLE: &str = r#"pod-calc pricing-v1 '{"product_type": "t-shirt"}'"#;

#[derive(Debug, Args)]
pub(crate) struct PricingV1Args {
    /// Request document, e.g. '{"product_type": "mug"}'
    #[arg(value_name = "JSON")]
    input: Vec<String>,
}

#[derive(Debug, Args)]
pub(crate) struct PricingArgs {
    /// Product type, e.g. t-shirt or mug
    product_type: String,

    /// Production cost to use instead of the catalogue cost
    #[arg(long)]
    cost: Option<Decimal>,

    /// Target margin as a fraction, e.g. 0.35
    #[arg(long)]
    margin: Option<Decimal>,

    /// Competitor prices to compare against
    #[arg(long, num_args = 1..)]
    competitor_prices: Vec<Decimal>,
}

pub(crate) fn run_v1(
    args: &PricingV1Args,
    rule_book: &RuleBook,
    format: OutputFormat,
    out: &mut impl io::Write,
) -> Result<ExitCode, CliError> {
    let rule = rule_book.pricing_v1();

    let [input] = args.input.as_slice() else {
        return emit_error(
            out,
            &json!({
                "error": format!("Usage: {V1_EXAMPLE}"),
                "valid_options": rule.valid_options(),
            }),
        );
    };

    let request = match PricingRequestV1::from_json(input) {
        Ok(request) => request,
        Err(error @ PricingInputError::InvalidJson(_)) => {
            warn!(%error, "rejected pricing request");

            return emit_error(
                out,
                &json!({ "error": error.to_string(), "example": V1_EXAMPLE }),
            );
        }
        Err(error @ PricingInputError::MissingProductType) => {
            warn!(%error, "rejected pricing request");

            return emit_error(
                out,
                &json!({ "error": error.to_string(), "valid_options": rule.valid_options() }),
            );
        }
    };

    let outcome = rule.evaluate(&request)?;

    emit(out, format, &outcome)?;

    Ok(if outcome.is_rejected() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

pub(crate) fn run(
    args: &PricingArgs,
    rule_book: &RuleBook,
    format: OutputFormat,
    out: &mut impl io::Write,
) -> Result<ExitCode, CliError> {
    let mut request = PricingRequest::new(args.product_type.clone())
        .with_competitor_prices(args.competitor_prices.clone());

    if let Some(cost) = args.cost {
        request = request.with_cost(cost);
    }

    if let Some(margin) = args.margin {
        request = request.with_margin(margin);
    }

    let result = rule_book.pricing_v2().evaluate(&request)?;

    emit(out, format, &result)?;

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use pod_calc::pricing::PricingError;
    use testresult::TestResult;

    use super::*;
    use crate::cli::tests::run_cli;

    fn run_json(args: &[&str]) -> Result<(ExitCode, serde_json::Value), Box<dyn std::error::Error>> {
        let (code, stdout) = run_cli(args)?;

        Ok((code, serde_json::from_str(&stdout)?))
    }

    #[test]
    fn v1_prices_a_mug() -> TestResult {
        let (code, json) = run_json(&["pricing-v1", r#"{"product_type": "mug"}"#])?;

        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(json["recommended_price"], 20.99);
        assert_eq!(json["product_type"], "mug");

        Ok(())
    }

    #[test]
    fn v1_unknown_product_prints_rejection_and_fails() -> TestResult {
        let (code, json) = run_json(&["pricing-v1", r#"{"product_type": "canvas"}"#])?;

        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(json["error"], "Invalid product_type: 'canvas'");
        assert_eq!(json["valid_options"][5], "tote-bag");
        assert!(json["example"].is_string());

        Ok(())
    }

    #[test]
    fn v1_without_argument_prints_usage() -> TestResult {
        let (code, json) = run_json(&["pricing-v1"])?;

        assert_eq!(code, ExitCode::FAILURE);
        assert!(json["error"].as_str().is_some_and(|error| error.starts_with("Usage:")));
        assert_eq!(json["valid_options"][0], "t-shirt");

        Ok(())
    }

    #[test]
    fn v1_invalid_json_prints_example() -> TestResult {
        let (code, json) = run_json(&["pricing-v1", "{not json"])?;

        assert_eq!(code, ExitCode::FAILURE);
        assert!(
            json["error"]
                .as_str()
                .is_some_and(|error| error.starts_with("Invalid JSON input:"))
        );
        assert!(json["example"].is_string());

        Ok(())
    }

    #[test]
    fn v1_missing_product_type_lists_options() -> TestResult {
        let (code, json) = run_json(&["pricing-v1", r#"{"type": "mug"}"#])?;

        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(json["error"], "Missing required field: product_type");
        assert!(json["valid_options"].is_array());

        Ok(())
    }

    #[test]
    fn v2_prices_with_competitors() -> TestResult {
        let (code, json) = run_json(&[
            "pricing",
            "mug",
            "--competitor-prices",
            "14.99",
            "16.99",
        ])?;

        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(json["recommended_price"], 15.99);
        assert_eq!(json["competitor_analysis"]["count"], 2);
        assert_eq!(json["cost_source"], "standard");

        Ok(())
    }

    #[test]
    fn v2_accepts_unknown_product_with_custom_cost() -> TestResult {
        let (code, json) = run_json(&["pricing", "canvas", "--cost", "10"])?;

        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(json["cost_source"], "custom");

        Ok(())
    }

    #[test]
    fn v2_unknown_product_fails_without_document() {
        let result = run_cli(&["pricing", "canvas"]);

        assert!(matches!(
            result.as_ref().err().and_then(|error| error.downcast_ref::<CliError>()),
            Some(CliError::Pricing(PricingError::UnknownProduct { .. }))
        ));
    }
}
