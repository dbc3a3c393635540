//! Margin pricing
//!
//! Solves for the price that leaves the target margin after percentage fees:
//! `price = charm(cost / ((1 - fees) * (1 - margin)))`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    fees::EtsyFees,
    pricing::{PricingError, charm_price, cost_over, percent_points, round_money},
    products::ProductCatalog,
    rule::Rule,
};

/// Acceptable margin band.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarginBand {
    /// Lowest margin considered healthy
    pub min: Decimal,

    /// Margin used when none is requested
    pub ideal: Decimal,

    /// Highest margin considered competitive
    pub max: Decimal,
}

impl MarginBand {
    /// Check that `0 <= min <= ideal <= max < 1`.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        Decimal::ZERO <= self.min
            && self.min <= self.ideal
            && self.ideal <= self.max
            && self.max < Decimal::ONE
    }
}

impl Default for MarginBand {
    fn default() -> Self {
        Self {
            min: Decimal::new(25, 2),
            ideal: Decimal::new(35, 2),
            max: Decimal::new(50, 2),
        }
    }
}

/// Settings for the margin pricing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PricingV2Rules {
    /// Margin band
    pub margins: MarginBand,

    /// Deviation from the competitor average that triggers a warning
    pub competitor_tolerance: Decimal,
}

impl Default for PricingV2Rules {
    fn default() -> Self {
        Self {
            margins: MarginBand::default(),
            competitor_tolerance: Decimal::new(20, 2),
        }
    }
}

/// A margin pricing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingRequest {
    /// Product type as supplied
    pub product_type: String,

    /// Production cost overriding the catalogue
    pub custom_cost: Option<Decimal>,

    /// Margin overriding the ideal margin
    pub target_margin: Option<Decimal>,

    /// Prices of comparable listings
    pub competitor_prices: Vec<Decimal>,
}

impl PricingRequest {
    /// Create a request for a catalogue product at the ideal margin.
    pub fn new(product_type: impl Into<String>) -> Self {
        Self {
            product_type: product_type.into(),
            ..Self::default()
        }
    }

    /// Override the production cost.
    #[must_use]
    pub fn with_cost(mut self, cost: Decimal) -> Self {
        self.custom_cost = Some(cost);
        self
    }

    /// Override the target margin.
    #[must_use]
    pub fn with_margin(mut self, margin: Decimal) -> Self {
        self.target_margin = Some(margin);
        self
    }

    /// Compare against competitor prices.
    #[must_use]
    pub fn with_competitor_prices(mut self, prices: impl Into<Vec<Decimal>>) -> Self {
        self.competitor_prices = prices.into();
        self
    }
}

/// Where the production cost came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CostSource {
    /// Product catalogue
    Standard,

    /// Supplied with the request
    Custom,
}

/// Prices at the edges of the margin band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    /// Price at the minimum margin
    pub min: Decimal,

    /// Price at the maximum margin
    pub max: Decimal,
}

/// Fee and profit breakdown at the recommended price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBreakdown {
    /// Production cost
    pub production: Decimal,

    /// Percentage fees
    pub platform_fees: Decimal,

    /// Profit after production and fees
    pub profit: Decimal,
}

/// Comparison with competitor prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompetitorAnalysis {
    /// Number of competitor prices
    pub count: usize,

    /// Mean competitor price
    pub average: Decimal,

    /// Deviation of the recommended price from the mean, in percent points
    pub deviation_percent: Decimal,
}

/// A margin-priced product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingV2Result {
    /// Product type as supplied
    pub product_type: String,

    /// Production cost used
    pub base_cost: Decimal,

    /// Where the production cost came from
    pub cost_source: CostSource,

    /// Margin the price was solved for
    pub target_margin: Decimal,

    /// Price ending in `.99`
    pub recommended_price: Decimal,

    /// Prices at the minimum and maximum margins
    pub price_range: PriceRange,

    /// Margin actually achieved after charm rounding (fraction, 4 dp)
    pub margin_achieved: Decimal,

    /// Fee and profit breakdown
    pub breakdown: PriceBreakdown,

    /// Comparison with competitor prices, when any were supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor_analysis: Option<CompetitorAnalysis>,

    /// Soft problems with the request
    pub warnings: Vec<String>,
}

/// Margin pricing strategy.
#[derive(Debug, Clone)]
pub struct PricingRuleV2 {
    catalog: ProductCatalog,
    fees: EtsyFees,
    rules: PricingV2Rules,
}

impl PricingRuleV2 {
    /// Create the strategy from its catalogue, fee schedule and margin rules.
    #[must_use]
    pub fn new(catalog: ProductCatalog, fees: EtsyFees, rules: PricingV2Rules) -> Self {
        Self {
            catalog,
            fees,
            rules,
        }
    }

    /// Charm price that leaves `margin` of the sale after fees.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Unpriceable`] if fees and margin consume the whole price.
    pub fn price_at(&self, cost: Decimal, margin: Decimal) -> Result<Decimal, PricingError> {
        let fee_percent = self.fees.total_percent;
        let divisor = self.fees.net_rate() * (Decimal::ONE - margin);

        Ok(charm_price(cost_over(cost, divisor, fee_percent, margin)?))
    }

    fn resolve_cost(&self, request: &PricingRequest) -> Result<(Decimal, CostSource), PricingError> {
        if let Some(cost) = request.custom_cost {
            if cost <= Decimal::ZERO {
                return Err(PricingError::InvalidCost(cost));
            }

            return Ok((cost, CostSource::Custom));
        }

        self.catalog
            .lookup(&request.product_type)
            .map(|(_, spec)| (spec.base_cost, CostSource::Standard))
            .map_err(|unknown| PricingError::UnknownProduct {
                product_type: unknown.0,
                valid_options: self.catalog.product_types(),
            })
    }

    fn margin_warning(&self, margin: Decimal) -> Option<String> {
        let band = &self.rules.margins;

        if margin < band.min {
            Some(format!(
                "Target margin {}% is below the minimum of {}%",
                percent_points(margin, 1),
                percent_points(band.min, 1),
            ))
        } else if margin > band.max {
            Some(format!(
                "Target margin {}% is above the maximum of {}%",
                percent_points(margin, 1),
                percent_points(band.max, 1),
            ))
        } else {
            None
        }
    }

    fn compare_competitors(
        &self,
        price: Decimal,
        competitor_prices: &[Decimal],
        warnings: &mut Vec<String>,
    ) -> Result<Option<CompetitorAnalysis>, PricingError> {
        if competitor_prices.is_empty() {
            return Ok(None);
        }

        if let Some(invalid) = competitor_prices.iter().find(|p| **p <= Decimal::ZERO) {
            return Err(PricingError::InvalidCompetitorPrice(*invalid));
        }

        let total = competitor_prices
            .iter()
            .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(*p))
            .ok_or(PricingError::Overflow)?;

        let average = total
            .checked_div(Decimal::from(competitor_prices.len()))
            .ok_or(PricingError::Overflow)?;
        let deviation = (price - average)
            .checked_div(average)
            .ok_or(PricingError::Overflow)?;
        let deviation_percent = deviation
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(PricingError::Overflow)?
            .round_dp(1);
        let tolerance = self.rules.competitor_tolerance;

        if deviation > tolerance {
            warnings.push(format!(
                "Price {price} is {deviation_percent}% above the competitor average of {}",
                round_money(average),
            ));
        } else if deviation < -tolerance {
            warnings.push(format!(
                "Price {price} is {}% below the competitor average of {}",
                deviation_percent.abs(),
                round_money(average),
            ));
        }

        Ok(Some(CompetitorAnalysis {
            count: competitor_prices.len(),
            average: round_money(average),
            deviation_percent,
        }))
    }
}

impl Default for PricingRuleV2 {
    fn default() -> Self {
        Self::new(
            ProductCatalog::default(),
            EtsyFees::default(),
            PricingV2Rules::default(),
        )
    }
}

impl Rule for PricingRuleV2 {
    type Input = PricingRequest;
    type Output = PricingV2Result;
    type Error = PricingError;

    #[tracing::instrument(
        name = "pricing_v2",
        skip_all,
        fields(
            product_type = %input.product_type,
            custom_cost = input.custom_cost.is_some(),
            competitors = input.competitor_prices.len()
        )
    )]
    fn evaluate(&self, input: &PricingRequest) -> Result<PricingV2Result, PricingError> {
        let (cost, cost_source) = self.resolve_cost(input)?;

        let margin = input.target_margin.unwrap_or(self.rules.margins.ideal);
        if margin < Decimal::ZERO || margin >= Decimal::ONE {
            return Err(PricingError::MarginOutOfRange(margin));
        }

        let mut warnings = Vec::new();
        warnings.extend(self.margin_warning(margin));

        let price = self.price_at(cost, margin)?;

        let price_range = PriceRange {
            min: self.price_at(cost, self.rules.margins.min)?,
            max: self.price_at(cost, self.rules.margins.max)?,
        };

        let platform_fees = self.fees.percentage_fees(price);
        let profit = price - cost - platform_fees;
        let margin_achieved = ((price * self.fees.net_rate() - cost) / price).round_dp(4);

        let competitor_analysis =
            self.compare_competitors(price, &input.competitor_prices, &mut warnings)?;

        debug!(%cost, %margin, %price, warnings = warnings.len(), "priced product");

        Ok(PricingV2Result {
            product_type: input.product_type.clone(),
            base_cost: round_money(cost),
            cost_source,
            target_margin: margin,
            recommended_price: round_money(price),
            price_range,
            margin_achieved,
            breakdown: PriceBreakdown {
                production: round_money(cost),
                platform_fees: round_money(platform_fees),
                profit: round_money(profit),
            },
            competitor_analysis,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::products::ProductType;

    #[test]
    fn mug_at_ideal_margin() -> TestResult {
        let result = PricingRuleV2::default().evaluate(&PricingRequest::new("mug"))?;

        // 8 / (0.775 * 0.65) = 15.88
        assert_eq!(result.base_cost, Decimal::new(8, 0));
        assert_eq!(result.cost_source, CostSource::Standard);
        assert_eq!(result.target_margin, Decimal::new(35, 2));
        assert_eq!(result.recommended_price, Decimal::new(1599, 2));
        assert!(result.warnings.is_empty());
        assert!(result.competitor_analysis.is_none());

        Ok(())
    }

    #[test]
    fn price_range_spans_margin_band() -> TestResult {
        let result = PricingRuleV2::default().evaluate(&PricingRequest::new("hoodie"))?;

        // 25 / (0.775 * 0.75) = 43.01, 25 / (0.775 * 0.5) = 64.52
        assert_eq!(result.price_range.min, Decimal::new(4399, 2));
        assert_eq!(result.price_range.max, Decimal::new(6499, 2));
        assert!(result.price_range.min <= result.recommended_price);
        assert!(result.recommended_price <= result.price_range.max);

        Ok(())
    }

    #[test]
    fn every_product_ends_in_ninety_nine_and_covers_cost() -> TestResult {
        let rule = PricingRuleV2::default();

        for product_type in ProductType::ALL {
            let result = rule.evaluate(&PricingRequest::new(product_type.as_str()))?;

            assert_eq!(
                result.recommended_price.fract(),
                Decimal::new(99, 2),
                "{product_type} should end in .99"
            );
            assert!(
                result.recommended_price >= result.base_cost,
                "{product_type} should cover its cost"
            );
        }

        Ok(())
    }

    #[test]
    fn margin_achieved_reflects_rounded_price() -> TestResult {
        let result = PricingRuleV2::default().evaluate(&PricingRequest::new("mug"))?;

        // (15.99 * 0.775 - 8) / 15.99
        assert_eq!(result.margin_achieved, Decimal::new(2747, 4));
        assert_eq!(result.breakdown.platform_fees, Decimal::new(360, 2));
        assert_eq!(result.breakdown.profit, Decimal::new(439, 2));

        Ok(())
    }

    #[test]
    fn custom_cost_overrides_catalog() -> TestResult {
        let request = PricingRequest::new("mug").with_cost(Decimal::new(10, 0));
        let result = PricingRuleV2::default().evaluate(&request)?;

        assert_eq!(result.base_cost, Decimal::new(10, 0));
        assert_eq!(result.cost_source, CostSource::Custom);

        Ok(())
    }

    #[test]
    fn custom_cost_allows_unknown_products() -> TestResult {
        let request = PricingRequest::new("canvas").with_cost(Decimal::new(18, 0));
        let result = PricingRuleV2::default().evaluate(&request)?;

        assert_eq!(result.product_type, "canvas");
        assert_eq!(result.cost_source, CostSource::Custom);

        Ok(())
    }

    #[test]
    fn unknown_product_without_cost_is_a_hard_failure() {
        let result = PricingRuleV2::default().evaluate(&PricingRequest::new("canvas"));

        assert!(matches!(
            result,
            Err(PricingError::UnknownProduct { ref product_type, .. }) if product_type == "canvas"
        ));
    }

    #[test]
    fn non_positive_custom_cost_is_rejected() {
        let request = PricingRequest::new("mug").with_cost(Decimal::ZERO);

        assert_eq!(
            PricingRuleV2::default().evaluate(&request),
            Err(PricingError::InvalidCost(Decimal::ZERO))
        );
    }

    #[test]
    fn margin_outside_band_warns_but_still_prices() -> TestResult {
        let rule = PricingRuleV2::default();

        let low = rule.evaluate(&PricingRequest::new("mug").with_margin(Decimal::new(10, 2)))?;
        let high = rule.evaluate(&PricingRequest::new("mug").with_margin(Decimal::new(60, 2)))?;

        assert_eq!(low.target_margin, Decimal::new(10, 2));
        assert_eq!(low.warnings.len(), 1);
        assert!(low.warnings.iter().any(|w| w.contains("below the minimum")));

        assert_eq!(high.warnings.len(), 1);
        assert!(high.warnings.iter().any(|w| w.contains("above the maximum")));
        // 8 / (0.775 * 0.4) = 25.80
        assert_eq!(high.recommended_price, Decimal::new(2599, 2));

        Ok(())
    }

    #[test]
    fn impossible_margins_are_rejected() {
        let rule = PricingRuleV2::default();

        assert_eq!(
            rule.evaluate(&PricingRequest::new("mug").with_margin(Decimal::ONE)),
            Err(PricingError::MarginOutOfRange(Decimal::ONE))
        );
        assert_eq!(
            rule.evaluate(&PricingRequest::new("mug").with_margin(Decimal::NEGATIVE_ONE)),
            Err(PricingError::MarginOutOfRange(Decimal::NEGATIVE_ONE))
        );
    }

    #[test]
    fn competitor_prices_within_tolerance_do_not_warn() -> TestResult {
        let request = PricingRequest::new("mug")
            .with_competitor_prices([Decimal::new(15, 0), Decimal::new(17, 0)]);
        let result = PricingRuleV2::default().evaluate(&request)?;

        let analysis = result
            .competitor_analysis
            .ok_or("expected competitor analysis")?;

        assert_eq!(analysis.count, 2);
        assert_eq!(analysis.average, Decimal::new(16, 0));
        assert!(result.warnings.is_empty());

        Ok(())
    }

    #[test]
    fn price_well_above_competitors_warns() -> TestResult {
        let request = PricingRequest::new("mug")
            .with_competitor_prices([Decimal::new(10, 0), Decimal::new(12, 0)]);
        let result = PricingRuleV2::default().evaluate(&request)?;

        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings.iter().any(|w| w.contains("above the competitor average")));

        Ok(())
    }

    #[test]
    fn price_well_below_competitors_warns() -> TestResult {
        let request = PricingRequest::new("mug").with_competitor_prices([Decimal::new(30, 0)]);
        let result = PricingRuleV2::default().evaluate(&request)?;

        assert!(result.warnings.iter().any(|w| w.contains("below the competitor average")));

        let analysis = result
            .competitor_analysis
            .ok_or("expected competitor analysis")?;
        assert!(analysis.deviation_percent < Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn non_positive_competitor_price_is_rejected() {
        let request = PricingRequest::new("mug").with_competitor_prices([Decimal::ZERO]);

        assert_eq!(
            PricingRuleV2::default().evaluate(&request),
            Err(PricingError::InvalidCompetitorPrice(Decimal::ZERO))
        );
    }

    #[test]
    fn vanishing_competitor_price_is_an_overflow_error() {
        let request = PricingRequest::new("mug").with_competitor_prices([Decimal::new(1, 28)]);

        assert_eq!(
            PricingRuleV2::default().evaluate(&request),
            Err(PricingError::Overflow)
        );
    }

    #[test]
    fn margin_band_ordering() {
        assert!(MarginBand::default().is_ordered());
        assert!(
            !MarginBand {
                min: Decimal::new(5, 1),
                ideal: Decimal::new(3, 1),
                max: Decimal::new(6, 1),
            }
            .is_ordered()
        );
    }
}
