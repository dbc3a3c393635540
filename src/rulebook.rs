//! Rule book
//!
//! Every threshold, fee and table the calculators use, loadable from YAML.
//! Sections left out of the file keep their built-in values.

use std::{fs, path::Path};

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    fees::EtsyFees,
    niche::{
        brands::BrandKeywords,
        v1::{NicheRuleV1, NicheV1Rules},
        v2::{NicheRuleV2, NicheV2Rules},
    },
    pricing::{v1::PricingRuleV1, v2::PricingRuleV2, v2::PricingV2Rules},
    products::ProductCatalog,
    seo::{SeoRules, SeoValidator},
};

/// Rule book errors
#[derive(Debug, Error)]
pub enum RuleBookError {
    /// IO error reading the rule book
    #[error("Failed to read rule book: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Margin band is not `0 <= min <= ideal <= max < 1`
    #[error("Invalid margin band: min {min}, ideal {ideal}, max {max}")]
    InvalidMarginBand {
        /// Lowest margin
        min: Decimal,
        /// Default margin
        ideal: Decimal,
        /// Highest margin
        max: Decimal,
    },

    /// Total fee percentage is not in `[0, 1)`
    #[error("Invalid total fee percentage: {0}")]
    InvalidFeePercent(Decimal),

    /// Product table has no entries
    #[error("Product table is empty")]
    EmptyCatalog,
}

/// All calculator settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleBook {
    /// SEO thresholds
    pub seo: SeoRules,

    /// Product cost table; replaces the built-in table when present
    pub products: ProductCatalog,

    /// Etsy fee schedule
    pub fees: EtsyFees,

    /// Margin pricing settings
    pub pricing: PricingV2Rules,

    /// Banded niche thresholds
    pub niche_v1: NicheV1Rules,

    /// Gated niche thresholds
    pub niche_v2: NicheV2Rules,

    /// Brand keyword lists
    pub brands: BrandKeywords,
}

impl RuleBook {
    /// Parse and validate a YAML rule book.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or the values are inconsistent.
    pub fn from_yaml_str(contents: &str) -> Result<Self, RuleBookError> {
        let rule_book: RuleBook = serde_norway::from_str(contents)?;

        rule_book.validate()?;

        Ok(rule_book)
    }

    /// Read, parse and validate a YAML rule book.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or see [`RuleBook::from_yaml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RuleBookError> {
        let path = path.as_ref();

        debug!(path = %path.display(), "loading rule book");

        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Check cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), RuleBookError> {
        let band = self.pricing.margins;

        if !band.is_ordered() {
            return Err(RuleBookError::InvalidMarginBand {
                min: band.min,
                ideal: band.ideal,
                max: band.max,
            });
        }

        if self.fees.total_percent < Decimal::ZERO || self.fees.total_percent >= Decimal::ONE {
            return Err(RuleBookError::InvalidFeePercent(self.fees.total_percent));
        }

        if self.products.is_empty() {
            return Err(RuleBookError::EmptyCatalog);
        }

        Ok(())
    }

    /// SEO validator using these rules.
    #[must_use]
    pub fn seo_validator(&self) -> SeoValidator {
        SeoValidator::new(self.seo)
    }

    /// Markup pricing strategy using these rules.
    #[must_use]
    pub fn pricing_v1(&self) -> PricingRuleV1 {
        PricingRuleV1::new(self.products.clone(), self.fees)
    }

    /// Margin pricing strategy using these rules.
    #[must_use]
    pub fn pricing_v2(&self) -> PricingRuleV2 {
        PricingRuleV2::new(self.products.clone(), self.fees, self.pricing)
    }

    /// Banded niche strategy using these rules.
    #[must_use]
    pub fn niche_v1(&self) -> NicheRuleV1 {
        NicheRuleV1::new(self.niche_v1)
    }

    /// Gated niche strategy using these rules.
    #[must_use]
    pub fn niche_v2(&self) -> NicheRuleV2 {
        NicheRuleV2::new(self.niche_v2.clone(), self.brands.clone())
    }
}
