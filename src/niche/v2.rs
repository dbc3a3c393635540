//! Gated niche validation
//!
//! Hard-reject gates are checked first, in order: saturation, then a declining
//! trend below the floor. Surviving niches pass or fail on listing count and
//! trend score, and collect confidence bonuses on the way.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::{
    niche::{
        Brand, NicheInputError, TrendDirection,
        brands::{BrandAssignment, BrandKeywords},
    },
    rule::Rule,
};

/// Thresholds and bonuses for the gated niche strategy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NicheV2Rules {
    /// Listing counts at or above this are rejected outright
    pub saturation_threshold: u64,

    /// Declining trends below this score are rejected outright
    pub declining_floor: u8,

    /// Listing counts must be below this to pass
    pub green_light_max: u64,

    /// Trend scores must be at least this to pass
    pub trend_minimum: u8,

    /// Smallest listing count in the ideal range
    pub ideal_etsy_min: u64,

    /// Largest listing count in the ideal range
    pub ideal_etsy_max: u64,

    /// Trend score that counts as excellent
    pub trend_excellent: u8,

    /// Trend score that counts as strong
    pub trend_strong: u8,

    /// Confidence before any bonus
    pub base_confidence: Decimal,

    /// Bonus for a listing count in the ideal range
    pub ideal_etsy_bonus: Decimal,

    /// Bonus for an excellent trend
    pub trend_excellent_bonus: Decimal,

    /// Bonus for a strong trend
    pub trend_strong_bonus: Decimal,

    /// Bonus for a rising trend
    pub rising_bonus: Decimal,

    /// Lowest confidence reported
    pub min_confidence: Decimal,

    /// Highest confidence reported
    pub max_confidence: Decimal,

    /// Confidence of a saturation rejection
    pub saturated_confidence: Decimal,

    /// Confidence of a declining-trend rejection
    pub declining_confidence: Decimal,

    /// Suffixes combined with the niche name to suggest sub-niches
    pub sub_niche_modifiers: Vec<String>,

    /// Most sub-niches suggested
    pub max_sub_niches: usize,

    /// Niche names this short or shorter get no sub-niches
    pub min_niche_length: usize,
}

impl Default for NicheV2Rules {
    fn default() -> Self {
        Self {
            saturation_threshold: 100_000,
            declining_floor: 30,
            green_light_max: 50_000,
            trend_minimum: 40,
            ideal_etsy_min: 1_000,
            ideal_etsy_max: 20_000,
            trend_excellent: 70,
            trend_strong: 55,
            base_confidence: Decimal::new(50, 2),
            ideal_etsy_bonus: Decimal::new(15, 2),
            trend_excellent_bonus: Decimal::new(20, 2),
            trend_strong_bonus: Decimal::new(10, 2),
            rising_bonus: Decimal::new(10, 2),
            min_confidence: Decimal::new(10, 2),
            max_confidence: Decimal::new(95, 2),
            saturated_confidence: Decimal::new(95, 2),
            declining_confidence: Decimal::new(90, 2),
            sub_niche_modifiers: ["gifts", "vintage", "funny", "minimalist"]
                .map(String::from)
                .to_vec(),
            max_sub_niches: 3,
            min_niche_length: 3,
        }
    }
}

/// A niche to validate, with a 0-100 trend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NicheQueryV2 {
    /// Niche name
    pub niche: String,

    /// Active Etsy listings
    pub etsy_count: u64,

    /// Trend score, 0-100
    pub trend_score: u8,

    /// Direction the trend is moving in
    pub trend_direction: TrendDirection,

    /// Brand to use instead of keyword matching
    pub brand_hint: Option<Brand>,
}

impl NicheQueryV2 {
    /// Create a query with a stable trend and no brand hint.
    pub fn new(niche: impl Into<String>, etsy_count: u64, trend_score: u8) -> Self {
        Self {
            niche: niche.into(),
            etsy_count,
            trend_score,
            trend_direction: TrendDirection::Stable,
            brand_hint: None,
        }
    }

    /// Set the trend direction.
    #[must_use]
    pub fn with_direction(mut self, trend_direction: TrendDirection) -> Self {
        self.trend_direction = trend_direction;
        self
    }

    /// Set the brand hint.
    #[must_use]
    pub fn with_brand_hint(mut self, brand: Brand) -> Self {
        self.brand_hint = Some(brand);
        self
    }
}

/// Go / no-go decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    /// Design for this niche
    Go,

    /// Skip this niche
    Skip,
}

/// Verdict of the gated niche strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NicheVerdictV2 {
    /// Niche name
    pub niche: String,

    /// Go / no-go
    pub decision: Decision,

    /// Confidence in the decision, 2 dp
    pub confidence: Decimal,

    /// Active Etsy listings
    pub etsy_count: u64,

    /// Trend score, 0-100
    pub trend_score: u8,

    /// Trend direction
    pub trend_direction: TrendDirection,

    /// Checks made, in order
    pub reasoning: Vec<String>,

    /// Soft problems
    pub warnings: Vec<String>,

    /// Brand for a GO niche
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_assignment: Option<BrandAssignment>,

    /// Suggested sub-niches for a GO niche
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_niches: Option<SmallVec<[String; 3]>>,
}

/// Gated niche strategy.
#[derive(Debug, Clone, Default)]
pub struct NicheRuleV2 {
    rules: NicheV2Rules,
    brands: BrandKeywords,
}

impl NicheRuleV2 {
    /// Create the strategy from its thresholds and brand keywords.
    #[must_use]
    pub fn new(rules: NicheV2Rules, brands: BrandKeywords) -> Self {
        Self { rules, brands }
    }

    fn hard_reject(&self, query: &NicheQueryV2) -> Option<NicheVerdictV2> {
        let rules = &self.rules;

        if query.etsy_count >= rules.saturation_threshold {
            let mut verdict = blank_verdict(query, Decision::Skip, rules.saturated_confidence);
            verdict.reasoning.push(format!(
                "Etsy count {} is at or above the saturation threshold of {}",
                query.etsy_count, rules.saturation_threshold
            ));

            return Some(verdict);
        }

        if query.trend_direction == TrendDirection::Declining
            && query.trend_score < rules.declining_floor
        {
            let mut verdict = blank_verdict(query, Decision::Skip, rules.declining_confidence);
            verdict.reasoning.push(format!(
                "Declining trend with score {} below the floor of {}",
                query.trend_score, rules.declining_floor
            ));

            return Some(verdict);
        }

        None
    }

    fn confidence(&self, query: &NicheQueryV2, reasoning: &mut Vec<String>) -> Decimal {
        let rules = &self.rules;
        let mut confidence = rules.base_confidence;

        if (rules.ideal_etsy_min..=rules.ideal_etsy_max).contains(&query.etsy_count) {
            confidence += rules.ideal_etsy_bonus;
            reasoning.push(format!(
                "Etsy count within ideal range ({}-{})",
                rules.ideal_etsy_min, rules.ideal_etsy_max
            ));
        }

        if query.trend_score >= rules.trend_excellent {
            confidence += rules.trend_excellent_bonus;
            reasoning.push(format!("Excellent trend score (>= {})", rules.trend_excellent));
        } else if query.trend_score >= rules.trend_strong {
            confidence += rules.trend_strong_bonus;
            reasoning.push(format!("Strong trend score (>= {})", rules.trend_strong));
        }

        if query.trend_direction == TrendDirection::Rising {
            confidence += rules.rising_bonus;
            reasoning.push("Rising trend direction".to_string());
        }

        confidence
            .max(rules.min_confidence)
            .min(rules.max_confidence)
            .round_dp(2)
    }

    /// Suggested sub-niches, or `None` when the niche name is too short.
    pub fn sub_niches(&self, niche: &str) -> Option<SmallVec<[String; 3]>> {
        let niche = niche.trim();

        if niche.chars().count() <= self.rules.min_niche_length {
            return None;
        }

        Some(
            self.rules
                .sub_niche_modifiers
                .iter()
                .take(self.rules.max_sub_niches)
                .map(|modifier| format!("{niche} {modifier}"))
                .collect(),
        )
    }
}

impl Rule for NicheRuleV2 {
    type Input = NicheQueryV2;
    type Output = NicheVerdictV2;
    type Error = NicheInputError;

    #[tracing::instrument(
        name = "niche_v2",
        skip_all,
        fields(
            niche = %input.niche,
            etsy_count = input.etsy_count,
            trend_score = input.trend_score,
            trend_direction = %input.trend_direction
        )
    )]
    fn evaluate(&self, input: &NicheQueryV2) -> Result<NicheVerdictV2, NicheInputError> {
        if input.trend_score > 100 {
            return Err(NicheInputError::TrendScoreOutOfRange(input.trend_score));
        }

        if let Some(verdict) = self.hard_reject(input) {
            debug!(confidence = %verdict.confidence, "hard reject");

            return Ok(verdict);
        }

        let rules = &self.rules;
        let mut reasoning = Vec::new();
        let mut warnings = Vec::new();

        let etsy_pass = input.etsy_count < rules.green_light_max;
        reasoning.push(if etsy_pass {
            format!(
                "Etsy count {} is below the green-light threshold of {}",
                input.etsy_count, rules.green_light_max
            )
        } else {
            format!(
                "Etsy count {} is at or above the green-light threshold of {}",
                input.etsy_count, rules.green_light_max
            )
        });

        let trend_pass = input.trend_score >= rules.trend_minimum;
        reasoning.push(if trend_pass {
            format!(
                "Trend score {} meets the minimum of {}",
                input.trend_score, rules.trend_minimum
            )
        } else {
            format!(
                "Trend score {} is below the minimum of {}",
                input.trend_score, rules.trend_minimum
            )
        });

        if input.trend_direction == TrendDirection::Declining {
            warnings.push("Trend direction is declining".to_string());
        }

        let confidence = self.confidence(input, &mut reasoning);

        let decision = if etsy_pass && trend_pass {
            Decision::Go
        } else {
            Decision::Skip
        };

        let mut verdict = blank_verdict(input, decision, confidence);

        if decision == Decision::Go {
            let (assignment, tied) = self.brands.assign(&input.niche, input.brand_hint);

            if tied {
                warnings.push(format!(
                    "No clear brand match for '{}'; defaulting to {}",
                    input.niche, assignment.brand
                ));
            }

            verdict.brand_assignment = Some(assignment);
            verdict.sub_niches = self.sub_niches(&input.niche);
        }

        debug!(?decision, %confidence, etsy_pass, trend_pass, "validated niche");

        verdict.reasoning = reasoning;
        verdict.warnings = warnings;

        Ok(verdict)
    }
}

fn blank_verdict(query: &NicheQueryV2, decision: Decision, confidence: Decimal) -> NicheVerdictV2 {
    NicheVerdictV2 {
        niche: query.niche.clone(),
        decision,
        confidence,
        etsy_count: query.etsy_count,
        trend_score: query.trend_score,
        trend_direction: query.trend_direction,
        reasoning: Vec::new(),
        warnings: Vec::new(),
        brand_assignment: None,
        sub_niches: None,
    }
}
