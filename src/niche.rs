//! Niche validation
//!
//! Two independent strategies for deciding whether a niche is worth designing for:
//!
//! - [`v1::NicheRuleV1`] sums banded competition and trend scores.
//! - [`v2::NicheRuleV2`] applies hard-reject gates, then pass/fail checks with
//!   an accumulated confidence, and assigns a brand to viable niches.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod brands;
pub mod v1;
pub mod v2;

/// Errors reading or validating a niche query.
#[derive(Debug, Error)]
pub enum NicheInputError {
    /// Input was not valid JSON.
    #[error("Invalid JSON input: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Required fields were missing.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// `etsy_count` could not be read as an integer.
    #[error("etsy_count must be an integer")]
    InvalidEtsyCount,

    /// `trend_score` could not be read as a number.
    #[error("trend_score must be a number between 0.0 and 1.0")]
    InvalidTrendScore,

    /// A 0-100 trend score was above 100.
    #[error("trend_score must be between 0 and 100, got {0}")]
    TrendScoreOutOfRange(u8),
}

/// Direction a search trend is moving in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Interest is growing
    Rising,

    /// Interest is flat
    #[default]
    Stable,

    /// Interest is falling
    Declining,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrendDirection::Rising => "rising",
            TrendDirection::Stable => "stable",
            TrendDirection::Declining => "declining",
        })
    }
}

/// Product brands a niche can be designed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum Brand {
    /// LWF Designs
    #[serde(rename = "LWF")]
    #[value(name = "LWF")]
    Lwf,

    /// Touge
    #[serde(rename = "Touge")]
    #[value(name = "Touge")]
    Touge,
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Brand::Lwf => "LWF",
            Brand::Touge => "Touge",
        })
    }
}
