//! POD Calc
//!
//! Deterministic calculators for a print-on-demand shop: listing SEO checks,
//! Etsy pricing and niche validation. Each calculator is a [`rule::Rule`] built
//! from a section of the [`rulebook::RuleBook`].

pub mod fees;
pub mod niche;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod report;
pub mod rule;
pub mod rulebook;
pub mod seo;
