//! Marketplace fees

use rust_decimal::Decimal;
use serde::Deserialize;

/// Etsy fee schedule.
///
/// Only `total_percent` feeds the pricing formulas; the itemised fees are kept
/// so the schedule can be reported and overridden as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct EtsyFees {
    /// Flat fee per listing
    pub listing: Decimal,

    /// Transaction fee (fraction of price)
    pub transaction: Decimal,

    /// Payment processing fee (fraction of price)
    pub payment: Decimal,

    /// Payment processing fee (flat, per order)
    pub payment_fixed: Decimal,

    /// Offsite ads fee, worst case for shops under $10K
    pub offsite_ads: Decimal,

    /// Total percentage-based fees applied to a sale price
    pub total_percent: Decimal,
}

impl EtsyFees {
    /// Percentage-based fees charged on a sale at `price`.
    #[must_use]
    pub fn percentage_fees(&self, price: Decimal) -> Decimal {
        price * self.total_percent
    }

    /// Fraction of the sale price left after percentage fees.
    #[must_use]
    pub fn net_rate(&self) -> Decimal {
        Decimal::ONE - self.total_percent
    }
}

impl Default for EtsyFees {
    fn default() -> Self {
        Self {
            listing: Decimal::new(20, 2),
            transaction: Decimal::new(65, 3),
            payment: Decimal::new(3, 2),
            payment_fixed: Decimal::new(25, 2),
            offsite_ads: Decimal::new(15, 2),
            total_percent: Decimal::new(225, 3),
        }
    }
}
