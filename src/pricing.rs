//! Pricing
//!
//! Two independent pricing strategies share the product catalogue, the fee
//! schedule and charm rounding, but keep their own formulas and error policy:
//!
//! - [`v1::PricingRuleV1`] marks the base cost up by a per-product multiplier
//!   and reports unknown products as a structured rejection.
//! - [`v2::PricingRuleV2`] solves for the price that yields a target margin
//!   after fees and treats unknown products as a hard failure.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::products::ProductType;

pub mod v1;
pub mod v2;

/// Errors that stop a price from being calculated.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The product type is not in the catalogue and no custom cost was given.
    #[error("Invalid product_type: '{product_type}'")]
    UnknownProduct {
        /// Product type as supplied
        product_type: String,

        /// Product types the catalogue does know about
        valid_options: Vec<ProductType>,
    },

    /// A custom production cost was zero or negative.
    #[error("custom cost must be greater than zero, got {0}")]
    InvalidCost(Decimal),

    /// A requested margin is outside `[0, 1)`.
    #[error("margin must be at least 0 and below 1, got {0}")]
    MarginOutOfRange(Decimal),

    /// A competitor price was zero or negative.
    #[error("competitor prices must be greater than zero, got {0}")]
    InvalidCompetitorPrice(Decimal),

    /// Fees and margin leave nothing of the price to cover the cost.
    #[error("fees of {fee_percent} and margin of {margin} leave no room to cover cost")]
    Unpriceable {
        /// Fee fraction in force
        fee_percent: Decimal,

        /// Margin fraction requested
        margin: Decimal,
    },

    /// Decimal arithmetic overflowed.
    #[error("price calculation overflowed")]
    Overflow,
}

/// Charm pricing: drop to the whole unit below and end the price in `.99`.
#[must_use]
pub fn charm_price(price: Decimal) -> Decimal {
    price.floor() + Decimal::new(99, 2)
}

/// Round a money amount to cents.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Express a fraction as percent points, e.g. `0.355` as `35.5`.
#[must_use]
pub fn percent_points(fraction: Decimal, dp: u32) -> Decimal {
    (fraction * Decimal::ONE_HUNDRED).round_dp(dp)
}

/// Divide `cost` by `divisor`, rejecting divisors that cannot yield a price.
fn cost_over(
    cost: Decimal,
    divisor: Decimal,
    fee_percent: Decimal,
    margin: Decimal,
) -> Result<Decimal, PricingError> {
    if divisor <= Decimal::ZERO {
        return Err(PricingError::Unpriceable {
            fee_percent,
            margin,
        });
    }

    cost.checked_div(divisor).ok_or(PricingError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charm_price_floors_and_adds_ninety_nine_cents() {
        assert_eq!(charm_price(Decimal::new(20, 0)), Decimal::new(2099, 2));
        assert_eq!(charm_price(Decimal::new(2999, 2)), Decimal::new(2999, 2));
        assert_eq!(charm_price(Decimal::new(21001, 3)), Decimal::new(2199, 2));
    }

    #[test]
    fn charm_price_of_cents_is_ninety_nine_cents() {
        assert_eq!(charm_price(Decimal::new(5, 2)), Decimal::new(99, 2));
    }

    #[test]
    fn round_money_uses_bankers_rounding() {
        assert_eq!(round_money(Decimal::new(4725, 3)), Decimal::new(472, 2));
        assert_eq!(round_money(Decimal::new(4735, 3)), Decimal::new(474, 2));
    }

    #[test]
    fn percent_points_scales_and_rounds() {
        assert_eq!(
            percent_points(Decimal::new(3555, 4), 1),
            Decimal::new(356, 1)
        );
    }

    #[test]
    fn cost_over_rejects_non_positive_divisor() {
        let result = cost_over(
            Decimal::TEN,
            Decimal::ZERO,
            Decimal::new(5, 1),
            Decimal::new(5, 1),
        );

        assert!(matches!(result, Err(PricingError::Unpriceable { .. })));
    }
}
