//! Table output
//!
//! Renders calculator results as terminal tables for the `--output table` mode.

use std::io;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, iso};
use tabled::{
    builder::Builder,
    settings::{Alignment, Color, Style, object::Rows, object::Columns},
};
use thiserror::Error;

use crate::{
    niche::{v1::NicheVerdictV1, v2::NicheVerdictV2},
    pricing::{
        percent_points,
        v1::{PricingV1Outcome, PricingV1Rejection, PricingV1Result},
        v2::PricingV2Result,
    },
    seo::SeoReport,
};

/// Errors that can occur when writing a table.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing to the output failed
    #[error("Failed to write table: {0}")]
    Io(#[from] io::Error),

    /// Amount does not fit in minor units
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(Decimal),
}

/// Results that can be written as a terminal table.
pub trait Tabulate {
    /// Write the table, followed by any list sections, to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or an amount cannot be formatted.
    fn write_table(&self, out: &mut impl io::Write) -> Result<(), ReportError>;
}

/// Format a dollar amount, e.g. `$20.99`.
///
/// # Errors
///
/// Returns [`ReportError::AmountOutOfRange`] if the amount has no `i64` cent value.
pub fn usd(amount: Decimal) -> Result<String, ReportError> {
    let minor = (amount * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .ok_or(ReportError::AmountOutOfRange(amount))?;

    Ok(Money::from_minor(minor, iso::USD).to_string())
}

fn write_fields(out: &mut impl io::Write, fields: &[(&str, String)]) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["Field", "Value"]);

    for (name, value) in fields {
        builder.push_record([(*name).to_string(), value.clone()]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::first(), Alignment::left());

    writeln!(out, "{table}")?;

    Ok(())
}

fn write_list(out: &mut impl io::Write, heading: &str, items: &[String]) -> Result<(), ReportError> {
    if items.is_empty() {
        return Ok(());
    }

    writeln!(out, "{heading}:")?;

    for item in items {
        writeln!(out, "  - {item}")?;
    }

    Ok(())
}

impl Tabulate for SeoReport {
    fn write_table(&self, out: &mut impl io::Write) -> Result<(), ReportError> {
        write_fields(
            out,
            &[
                ("Title length", self.title_length.to_string()),
                ("Tags", self.tag_count.to_string()),
                ("Description words", self.description_length_words.to_string()),
                ("SEO score", self.seo_score.to_string()),
            ],
        )?;

        write_list(out, "Warnings", &self.warnings)
    }
}

impl Tabulate for PricingV1Result {
    fn write_table(&self, out: &mut impl io::Write) -> Result<(), ReportError> {
        let breakdown = &self.cost_breakdown;

        write_fields(
            out,
            &[
                ("Product", self.product_type.to_string()),
                ("Base cost", usd(self.base_cost)?),
                ("Recommended price", usd(self.recommended_price)?),
                ("Minimum price", usd(self.minimum_price)?),
                ("Profit margin", format!("{}%", self.profit_margin_percent)),
                ("Platform fees", usd(breakdown.platform_fees_estimate)?),
                ("Profit", usd(breakdown.profit_at_recommended)?),
            ],
        )
    }
}

impl Tabulate for PricingV1Rejection {
    fn write_table(&self, out: &mut impl io::Write) -> Result<(), ReportError> {
        let options = self
            .valid_options
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        write_fields(
            out,
            &[
                ("Error", self.error.clone()),
                ("Valid options", options),
                ("Example", self.example.clone()),
            ],
        )
    }
}

impl Tabulate for PricingV1Outcome {
    fn write_table(&self, out: &mut impl io::Write) -> Result<(), ReportError> {
        match self {
            PricingV1Outcome::Priced(result) => result.write_table(out),
            PricingV1Outcome::Rejected(rejection) => rejection.write_table(out),
        }
    }
}

impl Tabulate for PricingV2Result {
    fn write_table(&self, out: &mut impl io::Write) -> Result<(), ReportError> {
        let mut fields = vec![
            ("Product", self.product_type.clone()),
            ("Base cost", usd(self.base_cost)?),
            (
                "Target margin",
                format!("{}%", percent_points(self.target_margin, 2)),
            ),
            ("Recommended price", usd(self.recommended_price)?),
            (
                "Price range",
                format!(
                    "{} - {}",
                    usd(self.price_range.min)?,
                    usd(self.price_range.max)?
                ),
            ),
            (
                "Margin achieved",
                format!("{}%", percent_points(self.margin_achieved, 2)),
            ),
            ("Platform fees", usd(self.breakdown.platform_fees)?),
            ("Profit", usd(self.breakdown.profit)?),
        ];

        if let Some(analysis) = &self.competitor_analysis {
            fields.push(("Competitor average", usd(analysis.average)?));
            fields.push((
                "Competitor deviation",
                format!("{}% ({} prices)", analysis.deviation_percent, analysis.count),
            ));
        }

        write_fields(out, &fields)?;
        write_list(out, "Warnings", &self.warnings)
    }
}

impl Tabulate for NicheVerdictV1 {
    fn write_table(&self, out: &mut impl io::Write) -> Result<(), ReportError> {
        let mut fields = vec![
            ("Valid", self.valid.to_string()),
            (
                "Recommendation",
                serde_label(&self.recommendation),
            ),
            ("Confidence", serde_label(&self.confidence)),
        ];

        if let Some(scores) = &self.scores {
            fields.push(("Competition score", scores.competition_score.to_string()));
            fields.push(("Trend score", scores.trend_score_value.to_string()));
            fields.push(("Total score", scores.total_score.to_string()));
        }

        fields.push(("Reasoning", self.reasoning.clone()));

        write_fields(out, &fields)?;
        write_list(out, "Concerns", &self.concerns)
    }
}

impl Tabulate for NicheVerdictV2 {
    fn write_table(&self, out: &mut impl io::Write) -> Result<(), ReportError> {
        let mut fields = vec![
            ("Niche", self.niche.clone()),
            ("Decision", serde_label(&self.decision)),
            ("Confidence", self.confidence.to_string()),
            ("Etsy listings", self.etsy_count.to_string()),
            (
                "Trend",
                format!("{} ({})", self.trend_score, self.trend_direction),
            ),
        ];

        if let Some(assignment) = &self.brand_assignment {
            fields.push(("Brand", assignment.brand.to_string()));
        }

        if let Some(sub_niches) = &self.sub_niches {
            fields.push(("Sub-niches", sub_niches.join(", ")));
        }

        write_fields(out, &fields)?;
        write_list(out, "Reasoning", &self.reasoning)?;
        write_list(out, "Warnings", &self.warnings)
    }
}

/// The serialized name of a unit enum variant, e.g. `proceed` or `GO`.
fn serde_label(value: &impl serde::Serialize) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(label)) => label,
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::{
        niche::v2::{NicheQueryV2, NicheRuleV2},
        pricing::{v1::PricingRequestV1, v1::PricingRuleV1, v2::PricingRequest, v2::PricingRuleV2},
        rule::Rule,
    };

    fn render(value: &impl Tabulate) -> Result<String, Box<dyn std::error::Error>> {
        let mut out = Vec::new();
        value.write_table(&mut out)?;

        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn usd_formats_dollars_and_cents() -> TestResult {
        assert_eq!(usd(Decimal::new(2099, 2))?, "$20.99");
        assert_eq!(usd(Decimal::new(8, 0))?, "$8.00");

        Ok(())
    }

    #[test]
    fn markup_pricing_table_shows_money() -> TestResult {
        let outcome = PricingRuleV1::default().evaluate(&PricingRequestV1::new("mug"))?;
        let table = render(&outcome)?;

        assert!(table.contains("Recommended price"));
        assert!(table.contains("$20.99"));
        assert!(table.contains("39.4%"));

        Ok(())
    }

    #[test]
    fn rejection_table_lists_options() -> TestResult {
        let outcome = PricingRuleV1::default().evaluate(&PricingRequestV1::new("blanket"))?;
        let table = render(&outcome)?;

        assert!(table.contains("t-shirt, hoodie, mug, poster, sticker, tote-bag"));

        Ok(())
    }

    #[test]
    fn margin_pricing_table_includes_range() -> TestResult {
        let result = PricingRuleV2::default().evaluate(&PricingRequest::new("hoodie"))?;
        let table = render(&result)?;

        assert!(table.contains("$43.99 - $64.99"));

        Ok(())
    }

    #[test]
    fn niche_table_shows_decision_and_brand() -> TestResult {
        let verdict = NicheRuleV2::default().evaluate(&NicheQueryV2::new("jdm drift cars", 5_000, 80))?;
        let table = render(&verdict)?;

        assert!(table.contains("GO"));
        assert!(table.contains("Touge"));
        assert!(table.contains("Reasoning:"));

        Ok(())
    }
}
