//! Listing SEO
//!
//! Checks an Etsy listing draft against fixed title, tag and description rules
//! and scores it by the number of warnings raised.

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::rule::Rule;

/// Errors loading a listing draft.
#[derive(Debug, Error)]
pub enum SeoError {
    /// IO error reading the listing file
    #[error("Failed to read listing file: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse listing JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// SEO thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SeoRules {
    /// Longest title allowed, in characters
    pub title_max: usize,

    /// Exact number of tags expected
    pub tag_count: usize,

    /// Fewest description words allowed
    pub description_min_words: usize,

    /// Leading description characters that must contain a keyword
    pub description_keyword_window: usize,

    /// Score deducted per warning
    pub warning_penalty: Decimal,
}

impl Default for SeoRules {
    fn default() -> Self {
        Self {
            title_max: 140,
            tag_count: 13,
            description_min_words: 300,
            description_keyword_window: 160,
            warning_penalty: Decimal::new(15, 2),
        }
    }
}

/// A listing draft to validate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListingDraft {
    /// Listing title
    pub title: String,

    /// Listing tags, in order
    pub tags: Vec<String>,

    /// Listing description
    pub description: String,

    /// Keyword the title should lead with
    pub primary_keyword: String,

    /// Keywords the description should open with; defaults to the primary keyword
    pub keywords: Option<Vec<String>>,
}

impl ListingDraft {
    /// Keywords to look for in the description.
    ///
    /// Falls back to the primary keyword when no keywords, or an empty list, were given.
    pub fn effective_keywords(&self) -> Vec<&str> {
        match self.keywords.as_deref() {
            Some(keywords) if !keywords.is_empty() => {
                keywords.iter().map(String::as_str).collect()
            }
            _ => vec![self.primary_keyword.as_str()],
        }
    }

    /// Read a draft from a JSON file holding a `listing` object.
    ///
    /// Missing fields default to empty values.
    ///
    /// # Errors
    ///
    /// Returns a [`SeoError`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SeoError> {
        let contents = fs::read_to_string(path)?;

        Self::from_json(&contents)
    }

    /// Parse a draft from a JSON document holding a `listing` object.
    ///
    /// # Errors
    ///
    /// Returns [`SeoError::Json`] if the document is malformed.
    pub fn from_json(contents: &str) -> Result<Self, SeoError> {
        #[derive(Deserialize)]
        struct ListingFile {
            #[serde(default)]
            listing: ListingDraft,
        }

        let file: ListingFile = serde_json::from_str(contents)?;

        Ok(file.listing)
    }
}

/// SEO validation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeoReport {
    /// Title length in characters
    pub title_length: usize,

    /// Number of tags
    pub tag_count: usize,

    /// Number of whitespace-separated words in the description
    pub description_length_words: usize,

    /// Score between 0 and 1
    pub seo_score: Decimal,

    /// Warnings raised, `null` when there are none
    #[serde(serialize_with = "serialize_warnings")]
    pub warnings: Vec<String>,
}

fn serialize_warnings<S: serde::Serializer>(
    warnings: &[String],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    if warnings.is_empty() {
        serializer.serialize_none()
    } else {
        serializer.collect_seq(warnings)
    }
}

/// Listing SEO validator.
#[derive(Debug, Clone, Default)]
pub struct SeoValidator {
    rules: SeoRules,
}

impl SeoValidator {
    /// Create a validator with the given thresholds.
    #[must_use]
    pub fn new(rules: SeoRules) -> Self {
        Self { rules }
    }

    /// Title length and primary keyword checks.
    pub fn check_title(&self, title: &str, primary_keyword: &str) -> Vec<String> {
        let mut warnings = Vec::new();
        let length = title.chars().count();

        if length > self.rules.title_max {
            warnings.push(format!(
                "Title exceeds {} characters ({length}).",
                self.rules.title_max
            ));
        }

        let keyword = primary_keyword.to_lowercase();
        let title = title.to_lowercase();

        if !title.split_whitespace().any(|token| token == keyword) {
            warnings.push("Primary keyword not front-loaded in title.".to_string());
        }

        warnings
    }

    /// Tag count, duplicate and empty tag checks.
    pub fn check_tags(&self, tags: &[String]) -> Vec<String> {
        let mut warnings = Vec::new();
        let unique: FxHashSet<&str> = tags.iter().map(String::as_str).collect();

        if tags.len() != self.rules.tag_count {
            warnings.push(format!(
                "Expected {} tags, found {}.",
                self.rules.tag_count,
                tags.len()
            ));
        }

        if unique.len() != tags.len() {
            warnings.push("Duplicate tags detected.".to_string());
        }

        if tags.iter().any(String::is_empty) {
            warnings.push("Empty tag detected.".to_string());
        }

        warnings
    }

    /// Description length and leading keyword checks.
    pub fn check_description(&self, description: &str, keywords: &[&str]) -> Vec<String> {
        let mut warnings = Vec::new();

        if description.split_whitespace().count() < self.rules.description_min_words {
            warnings.push(format!(
                "Description under {} words.",
                self.rules.description_min_words
            ));
        }

        let window = self.rules.description_keyword_window;
        let snippet: String = description.chars().take(window).collect::<String>().to_lowercase();

        if !keywords
            .iter()
            .any(|keyword| snippet.contains(&keyword.to_lowercase()))
        {
            warnings.push(format!(
                "No primary keywords found within first {window} characters."
            ));
        }

        warnings
    }

    /// Score a listing: one penalty per warning, floored at zero, 2 dp.
    #[must_use]
    pub fn score(&self, warning_count: usize) -> Decimal {
        let deduction = self.rules.warning_penalty * Decimal::from(warning_count);

        (Decimal::ONE - deduction).round_dp(2).max(Decimal::ZERO)
    }
}

impl Rule for SeoValidator {
    type Input = ListingDraft;
    type Output = SeoReport;
    type Error = std::convert::Infallible;

    #[tracing::instrument(name = "seo", skip_all, fields(tags = input.tags.len()))]
    fn evaluate(&self, input: &ListingDraft) -> Result<SeoReport, Self::Error> {
        let mut warnings = self.check_title(&input.title, &input.primary_keyword);
        warnings.extend(self.check_tags(&input.tags));
        warnings.extend(self.check_description(&input.description, &input.effective_keywords()));

        let seo_score = self.score(warnings.len());

        debug!(warnings = warnings.len(), %seo_score, "validated listing");

        Ok(SeoReport {
            title_length: input.title.chars().count(),
            tag_count: input.tags.len(),
            description_length_words: input.description.split_whitespace().count(),
            seo_score,
            warnings,
        })
    }
}
