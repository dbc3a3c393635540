//! Banded niche scoring
//!
//! A competition score (0-3) from the Etsy listing count, cross-checked against
//! the trend, plus a trend score (0-2), summed and mapped to a recommendation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{niche::NicheInputError, rule::Rule};

/// Band thresholds for the banded niche strategy.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct NicheV1Rules {
    /// Listing counts below this are low competition
    pub low_competition_below: i64,

    /// Listing counts up to and including this are moderate competition
    pub moderate_competition_max: i64,

    /// Trend needed (exclusive) for low competition to be the best case
    pub low_competition_trend: f64,

    /// Trend needed (exclusive) for moderate competition to be the best case
    pub moderate_competition_trend: f64,

    /// Trend needed (exclusive) for high competition to be worth it
    pub high_competition_trend: f64,

    /// Trends below this are a dying market
    pub dying_trend_below: f64,

    /// Trends at or above this are a growing market
    pub growing_trend_from: f64,
}

impl Default for NicheV1Rules {
    fn default() -> Self {
        Self {
            low_competition_below: 1_000,
            moderate_competition_max: 10_000,
            low_competition_trend: 0.3,
            moderate_competition_trend: 0.5,
            high_competition_trend: 0.7,
            dying_trend_below: 0.2,
            growing_trend_from: 0.5,
        }
    }
}

/// A niche to score, with a 0-1 trend.
#[derive(Debug, Clone, PartialEq)]
pub struct NicheQueryV1 {
    /// Niche name
    pub niche: String,

    /// Active Etsy listings; negative values are rejected during evaluation
    pub etsy_count: i64,

    /// Normalised trend score, expected in `[0, 1]`
    pub trend_score: f64,
}

impl NicheQueryV1 {
    /// Create a query.
    pub fn new(niche: impl Into<String>, etsy_count: i64, trend_score: f64) -> Self {
        Self {
            niche: niche.into(),
            etsy_count,
            trend_score,
        }
    }

    /// Parse a query from a JSON document with `niche`, `etsy_count` and `trend_score`.
    ///
    /// Numeric fields may be given as numbers or numeric strings; fractional
    /// listing counts are truncated.
    ///
    /// # Errors
    ///
    /// Returns a [`NicheInputError`] if the JSON is malformed, fields are
    /// missing, or a field has the wrong type.
    pub fn from_json(input: &str) -> Result<Self, NicheInputError> {
        let value: Value = serde_json::from_str(input)?;
        let empty = Map::new();
        let fields = value.as_object().unwrap_or(&empty);

        let missing: Vec<&'static str> = ["niche", "etsy_count", "trend_score"]
            .into_iter()
            .filter(|field| !fields.contains_key(*field))
            .collect();

        let (Some(niche), Some(etsy_count), Some(trend_score)) = (
            fields.get("niche"),
            fields.get("etsy_count"),
            fields.get("trend_score"),
        ) else {
            return Err(NicheInputError::MissingFields(missing));
        };

        let niche = match niche {
            Value::String(niche) => niche.clone(),
            other => other.to_string(),
        };

        let etsy_count = integer(etsy_count).ok_or(NicheInputError::InvalidEtsyCount)?;
        let trend_score = number(trend_score).ok_or(NicheInputError::InvalidTrendScore)?;

        Ok(Self::new(niche, etsy_count, trend_score))
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "fractional listing counts are truncated toward zero"
)]
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// How sure the verdict is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// High confidence
    High,

    /// Medium confidence
    Medium,

    /// Low confidence
    Low,
}

/// What to do with the niche.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    /// Go ahead
    Proceed,

    /// Go ahead carefully, or research more
    Caution,

    /// Drop the niche
    Reject,
}

/// Sub-scores behind a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NicheScores {
    /// Competition score, 0-3
    pub competition_score: u8,

    /// Trend score, 0-2
    pub trend_score_value: u8,

    /// Sum of both, 0-5
    pub total_score: u8,
}

/// Verdict of the banded niche strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NicheVerdictV1 {
    /// Whether the niche is viable
    pub valid: bool,

    /// How sure the verdict is
    pub confidence: ConfidenceLevel,

    /// Concerns raised along the way
    pub concerns: Vec<String>,

    /// What to do
    pub recommendation: Recommendation,

    /// Why
    pub reasoning: String,

    /// Sub-scores, absent when the input failed validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<NicheScores>,
}

/// Banded niche strategy.
#[derive(Debug, Clone, Default)]
pub struct NicheRuleV1 {
    rules: NicheV1Rules,
}

impl NicheRuleV1 {
    /// Create the strategy with the given band thresholds.
    #[must_use]
    pub fn new(rules: NicheV1Rules) -> Self {
        Self { rules }
    }

    fn competition_score(
        &self,
        etsy_count: i64,
        trend: f64,
        reasoning: &mut Vec<String>,
        concerns: &mut Vec<String>,
    ) -> u8 {
        let rules = &self.rules;
        let shown = percent(trend);

        if etsy_count < rules.low_competition_below {
            if trend > rules.low_competition_trend {
                reasoning.push(format!(
                    "Low competition ({etsy_count} listings) with decent trend ({shown})"
                ));
                3
            } else {
                reasoning.push(format!(
                    "Low competition ({etsy_count} listings) but weak trend ({shown})"
                ));
                concerns.push("Low competition may indicate insufficient demand".to_string());
                1
            }
        } else if etsy_count <= rules.moderate_competition_max {
            if trend > rules.moderate_competition_trend {
                reasoning.push(format!(
                    "Moderate competition ({etsy_count} listings) with strong trend ({shown})"
                ));
                3
            } else {
                reasoning.push(format!(
                    "Moderate competition ({etsy_count} listings) with moderate trend ({shown})"
                ));
                2
            }
        } else if trend > rules.high_competition_trend {
            reasoning.push(format!(
                "High competition ({etsy_count} listings) but very strong trend ({shown})"
            ));
            concerns.push("High competition requires unique angle to succeed".to_string());
            2
        } else {
            reasoning.push(format!(
                "High competition ({etsy_count} listings) with insufficient trend ({shown})"
            ));
            concerns.push("Oversaturated market".to_string());
            0
        }
    }

    fn trend_score_value(
        &self,
        trend: f64,
        reasoning: &mut Vec<String>,
        concerns: &mut Vec<String>,
    ) -> u8 {
        if trend < self.rules.dying_trend_below {
            reasoning.push("Declining/dead market - insufficient interest".to_string());
            concerns.push("Trend score indicates dying market".to_string());
            0
        } else if trend < self.rules.growing_trend_from {
            reasoning.push("Stable but not growing market".to_string());
            1
        } else {
            reasoning.push("Growing market with strong interest".to_string());
            2
        }
    }
}

/// Render a 0-1 fraction as a percentage with one decimal, e.g. `40.0%`.
fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

impl Rule for NicheRuleV1 {
    type Input = NicheQueryV1;
    type Output = NicheVerdictV1;
    type Error = std::convert::Infallible;

    #[tracing::instrument(
        name = "niche_v1",
        skip_all,
        fields(niche = %input.niche, etsy_count = input.etsy_count, trend_score = input.trend_score)
    )]
    fn evaluate(&self, input: &NicheQueryV1) -> Result<NicheVerdictV1, Self::Error> {
        let mut concerns = Vec::new();

        if input.etsy_count < 0 {
            concerns.push("Invalid Etsy count (negative value)".to_string());
        }
        if !(0.0..=1.0).contains(&input.trend_score) {
            concerns.push("Trend score must be between 0.0 and 1.0".to_string());
        }

        if !concerns.is_empty() {
            debug!(?concerns, "input validation failed");

            return Ok(NicheVerdictV1 {
                valid: false,
                confidence: ConfidenceLevel::Low,
                concerns,
                recommendation: Recommendation::Reject,
                reasoning: "Input validation failed".to_string(),
                scores: None,
            });
        }

        let mut reasoning = Vec::new();

        let competition_score = self.competition_score(
            input.etsy_count,
            input.trend_score,
            &mut reasoning,
            &mut concerns,
        );
        let trend_score_value =
            self.trend_score_value(input.trend_score, &mut reasoning, &mut concerns);
        let total_score = competition_score + trend_score_value;

        let (valid, confidence, recommendation, headline) = match total_score {
            4.. => (
                true,
                ConfidenceLevel::High,
                Recommendation::Proceed,
                "Strong opportunity",
            ),
            3 => (
                true,
                ConfidenceLevel::Medium,
                Recommendation::Caution,
                "Viable with caution",
            ),
            2 => {
                concerns.push("Consider additional research before proceeding".to_string());
                (
                    false,
                    ConfidenceLevel::Medium,
                    Recommendation::Caution,
                    "Borderline case",
                )
            }
            _ => (
                false,
                ConfidenceLevel::High,
                Recommendation::Reject,
                "Poor opportunity",
            ),
        };

        debug!(competition_score, trend_score_value, total_score, valid, "scored niche");

        Ok(NicheVerdictV1 {
            valid,
            confidence,
            concerns,
            recommendation,
            reasoning: format!("{headline}: {}", reasoning.join("; ")),
            scores: Some(NicheScores {
                competition_score,
                trend_score_value,
                total_score,
            }),
        })
    }
}
