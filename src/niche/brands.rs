//! Brand assignment

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::niche::Brand;

/// Keyword lists that pull a niche towards each brand.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BrandKeywords {
    /// Keywords for LWF Designs
    pub lwf: Vec<String>,

    /// Keywords for Touge
    pub touge: Vec<String>,

    /// Brand used when the keyword counts tie
    pub fallback: Brand,
}

impl Default for BrandKeywords {
    fn default() -> Self {
        let words = |list: &[&str]| -> Vec<String> { list.iter().map(ToString::to_string).collect() };

        Self {
            lwf: words(&[
                "cottagecore",
                "floral",
                "botanical",
                "garden",
                "gardening",
                "nature",
                "mushroom",
                "witchy",
                "boho",
                "retro",
                "cat",
                "dog",
                "coffee",
                "book",
                "plant",
                "teacher",
                "mom",
                "pickleball",
                "camping",
                "hiking",
            ]),
            touge: words(&[
                "jdm",
                "car",
                "cars",
                "drift",
                "drifting",
                "racing",
                "race",
                "touge",
                "mountain",
                "tuner",
                "turbo",
                "rotary",
                "motorsport",
                "garage",
                "engine",
                "street",
                "auto",
                "automotive",
                "mechanic",
                "midnight",
            ]),
            fallback: Brand::Lwf,
        }
    }
}

/// How a brand was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMethod {
    /// Caller supplied the brand
    Hint,

    /// One brand matched more keywords
    KeywordMatch,

    /// Keyword counts tied; the fallback brand was used
    Default,
}

/// Brand chosen for a niche.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandAssignment {
    /// Chosen brand
    pub brand: Brand,

    /// How it was chosen
    pub method: AssignmentMethod,

    /// Niche words that matched the chosen brand's keywords
    pub matched_keywords: SmallVec<[String; 4]>,
}

impl BrandKeywords {
    fn keywords(&self, brand: Brand) -> &[String] {
        match brand {
            Brand::Lwf => &self.lwf,
            Brand::Touge => &self.touge,
        }
    }

    /// Niche words found in a brand's keyword list, in niche order, without repeats.
    pub fn matches(&self, niche: &str, brand: Brand) -> SmallVec<[String; 4]> {
        let keywords: FxHashSet<String> = self
            .keywords(brand)
            .iter()
            .map(|keyword| keyword.to_lowercase())
            .collect();

        let mut seen = FxHashSet::default();

        tokens(niche)
            .filter(|token| keywords.contains(token))
            .filter(|token| seen.insert(token.clone()))
            .collect()
    }

    /// Pick a brand for a niche.
    ///
    /// An explicit hint wins. Otherwise the brand whose keywords overlap the
    /// niche's words the most is chosen; a tie falls back to
    /// [`BrandKeywords::fallback`] and reports `true` as the second element.
    pub fn assign(&self, niche: &str, hint: Option<Brand>) -> (BrandAssignment, bool) {
        if let Some(brand) = hint {
            return (
                BrandAssignment {
                    brand,
                    method: AssignmentMethod::Hint,
                    matched_keywords: self.matches(niche, brand),
                },
                false,
            );
        }

        let lwf = self.matches(niche, Brand::Lwf);
        let touge = self.matches(niche, Brand::Touge);

        let (brand, method, matched_keywords) = match lwf.len().cmp(&touge.len()) {
            std::cmp::Ordering::Greater => (Brand::Lwf, AssignmentMethod::KeywordMatch, lwf),
            std::cmp::Ordering::Less => (Brand::Touge, AssignmentMethod::KeywordMatch, touge),
            std::cmp::Ordering::Equal => {
                let matched = match self.fallback {
                    Brand::Lwf => lwf,
                    Brand::Touge => touge,
                };

                (self.fallback, AssignmentMethod::Default, matched)
            }
        };

        let tied = method == AssignmentMethod::Default;

        (
            BrandAssignment {
                brand,
                method,
                matched_keywords,
            },
            tied,
        )
    }
}

/// Lowercased alphanumeric words of a niche name.
fn tokens(niche: &str) -> impl Iterator<Item = String> + '_ {
    niche
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;

    #[test]
    fn hint_wins_over_keywords() {
        let (assignment, tied) = BrandKeywords::default().assign("jdm drift cars", Some(Brand::Lwf));

        assert_eq!(assignment.brand, Brand::Lwf);
        assert_eq!(assignment.method, AssignmentMethod::Hint);
        assert!(assignment.matched_keywords.is_empty());
        assert!(!tied);
    }

    #[test]
    fn most_keyword_matches_wins() {
        let (assignment, tied) = BrandKeywords::default().assign("JDM Drift-Car Garage", None);

        assert_eq!(assignment.brand, Brand::Touge);
        assert_eq!(assignment.method, AssignmentMethod::KeywordMatch);
        let expected: SmallVec<[String; 4]> = smallvec![
            "jdm".to_string(),
            "drift".to_string(),
            "car".to_string(),
            "garage".to_string()
        ];
        assert_eq!(assignment.matched_keywords, expected);
        assert!(!tied);
    }

    #[test]
    fn lwf_keywords_match() {
        let (assignment, _) = BrandKeywords::default().assign("cottagecore mushroom cat", None);

        assert_eq!(assignment.brand, Brand::Lwf);
        assert_eq!(assignment.matched_keywords.len(), 3);
    }

    #[test]
    fn tie_falls_back_and_reports_it() {
        let (assignment, tied) = BrandKeywords::default().assign("coffee car", None);

        assert_eq!(assignment.brand, Brand::Lwf);
        assert_eq!(assignment.method, AssignmentMethod::Default);
        assert!(tied);

        let (assignment, tied) = BrandKeywords::default().assign("quantum knitting", None);

        assert_eq!(assignment.method, AssignmentMethod::Default);
        assert!(assignment.matched_keywords.is_empty());
        assert!(tied);
    }

    #[test]
    fn repeated_words_count_once() {
        let keywords = BrandKeywords::default();

        assert_eq!(keywords.matches("car car car", Brand::Touge).len(), 1);
    }
}
