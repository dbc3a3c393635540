//! Markup pricing
//!
//! `recommended = charm(base_cost * markup)` and
//! `minimum = charm(base_cost / (1 - min_margin - fees))`.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::{
    fees::EtsyFees,
    pricing::{PricingError, charm_price, cost_over, round_money},
    products::{ProductCatalog, ProductType},
    rule::Rule,
};

/// Errors reading a markup pricing request.
#[derive(Debug, Error)]
pub enum PricingInputError {
    /// Input was not valid JSON.
    #[error("Invalid JSON input: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Input did not contain a `product_type` field.
    #[error("Missing required field: product_type")]
    MissingProductType,
}

/// A markup pricing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingRequestV1 {
    /// Product type as supplied; may not be a known product
    pub product_type: String,
}

impl PricingRequestV1 {
    /// Create a request for a product type name.
    pub fn new(product_type: impl Into<String>) -> Self {
        Self {
            product_type: product_type.into(),
        }
    }

    /// Parse a request from a JSON document such as `{"product_type": "mug"}`.
    ///
    /// A `product_type` that is not a string is kept in its JSON form and
    /// later rejected as an unknown product.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingInputError`] if the JSON is malformed or the field is missing.
    pub fn from_json(input: &str) -> Result<Self, PricingInputError> {
        let value: Value = serde_json::from_str(input)?;

        match value.get("product_type") {
            Some(Value::String(product_type)) => Ok(Self::new(product_type.clone())),
            Some(other) => Ok(Self::new(other.to_string())),
            None => Err(PricingInputError::MissingProductType),
        }
    }
}

/// Cost breakdown at the recommended price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    /// Production cost
    pub production: Decimal,

    /// Percentage fees charged at the recommended price
    pub platform_fees_estimate: Decimal,

    /// What is left after production and fees
    pub profit_at_recommended: Decimal,
}

/// A priced product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingV1Result {
    /// Product priced
    pub product_type: ProductType,

    /// Production cost
    pub base_cost: Decimal,

    /// Markup price ending in `.99`
    pub recommended_price: Decimal,

    /// Lowest price that still keeps the minimum margin, ending in `.99`
    pub minimum_price: Decimal,

    /// Profit as percent points of the recommended price
    pub profit_margin_percent: Decimal,

    /// Cost breakdown at the recommended price
    pub cost_breakdown: CostBreakdown,
}

/// Structured rejection for a product type the catalogue does not carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingV1Rejection {
    /// What went wrong
    pub error: String,

    /// Product types that can be priced
    pub valid_options: Vec<ProductType>,

    /// Example invocation
    pub example: String,
}

/// Outcome of a markup pricing request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PricingV1Outcome {
    /// The product was priced.
    Priced(PricingV1Result),

    /// The product type is not in the catalogue.
    Rejected(PricingV1Rejection),
}

impl PricingV1Outcome {
    /// Check if the request was rejected.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Markup pricing strategy.
#[derive(Debug, Clone)]
pub struct PricingRuleV1 {
    catalog: ProductCatalog,
    fees: EtsyFees,
}

impl PricingRuleV1 {
    /// Create the strategy from a product catalogue and fee schedule.
    #[must_use]
    pub fn new(catalog: ProductCatalog, fees: EtsyFees) -> Self {
        Self { catalog, fees }
    }

    /// Product types that can be priced.
    #[must_use]
    pub fn valid_options(&self) -> Vec<ProductType> {
        self.catalog.product_types()
    }

    fn reject(&self, product_type: &str) -> PricingV1Rejection {
        let valid_options = self.valid_options();
        let first = valid_options.first().map_or("t-shirt", |option| option.as_str());

        PricingV1Rejection {
            error: format!("Invalid product_type: '{product_type}'"),
            valid_options,
            example: format!("pod-calc pricing-v1 '{{\"product_type\": \"{first}\"}}'"),
        }
    }
}

impl Default for PricingRuleV1 {
    fn default() -> Self {
        Self::new(ProductCatalog::default(), EtsyFees::default())
    }
}

impl Rule for PricingRuleV1 {
    type Input = PricingRequestV1;
    type Output = PricingV1Outcome;
    type Error = PricingError;

    #[tracing::instrument(name = "pricing_v1", skip_all, fields(product_type = %input.product_type))]
    fn evaluate(&self, input: &PricingRequestV1) -> Result<PricingV1Outcome, PricingError> {
        let Ok((product_type, spec)) = self.catalog.lookup(&input.product_type) else {
            debug!("unknown product type");

            return Ok(PricingV1Outcome::Rejected(self.reject(&input.product_type)));
        };

        let fee_percent = self.fees.total_percent;

        let recommended_price = charm_price(
            spec.base_cost
                .checked_mul(spec.markup)
                .ok_or(PricingError::Overflow)?,
        );

        let minimum_price = charm_price(cost_over(
            spec.base_cost,
            Decimal::ONE - spec.min_margin - fee_percent,
            fee_percent,
            spec.min_margin,
        )?);

        let platform_fees = self.fees.percentage_fees(recommended_price);
        let profit = recommended_price - spec.base_cost - platform_fees;
        let margin_percent = (profit / recommended_price * Decimal::ONE_HUNDRED).round_dp(1);

        debug!(%recommended_price, %minimum_price, %margin_percent, "priced product");

        Ok(PricingV1Outcome::Priced(PricingV1Result {
            product_type,
            base_cost: round_money(spec.base_cost),
            recommended_price: round_money(recommended_price),
            minimum_price: round_money(minimum_price),
            profit_margin_percent: margin_percent,
            cost_breakdown: CostBreakdown {
                production: round_money(spec.base_cost),
                platform_fees_estimate: round_money(platform_fees),
                profit_at_recommended: round_money(profit),
            },
        }))
    }
}
