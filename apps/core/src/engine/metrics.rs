//! Text metrics for generated output.
//!
//! Scores a piece of text along four independent axes:
//! - coverage: how many tenet words appear (whole-word, case-insensitive)
//! - diversity: unique whitespace tokens over total tokens
//! - order: one minus the normalized character entropy
//! - division: a configurable placeholder, not derived from the text
//!
//! The overall score averages coverage, diversity and order.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::config::MetricsConfig;

/// Guards the diversity ratio against empty text.
const DIVERSITY_EPSILON: f64 = 1e-10;

/// Scores for one generated text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Tenet coverage, boosted then clamped to [0, 1].
    pub coverage_score: f64,
    /// Lexical diversity in [0, 1].
    pub diversity_score: f64,
    /// `1 - disorder`, in [0, 1].
    pub order_score: f64,
    /// Placeholder for a future negative signal. Not part of `overall_score`.
    pub division_score: f64,
    /// Mean of coverage, diversity and order.
    pub overall_score: f64,
}

impl Metrics {
    pub fn is_finite(&self) -> bool {
        [
            self.coverage_score,
            self.diversity_score,
            self.order_score,
            self.division_score,
            self.overall_score,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Computes [`Metrics`] for arbitrary text.
#[derive(Debug, Clone)]
pub struct TextMetrics {
    tenets: Vec<String>,
    coverage_boost: f64,
    disorder_normalization: f64,
    division_placeholder: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMetrics {
    pub fn new() -> Self {
        Self::with_config(&MetricsConfig::default())
    }

    /// Tenets are lowercased and deduplicated, keeping their first position.
    pub fn with_config(config: &MetricsConfig) -> Self {
        let mut seen = HashSet::new();
        let tenets = config
            .tenets
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();

        Self {
            tenets,
            coverage_boost: config.coverage_boost,
            disorder_normalization: config.disorder_normalization,
            division_placeholder: config.division_placeholder,
        }
    }

    pub fn tenets(&self) -> &[String] {
        &self.tenets
    }

    /// Shannon entropy of the character distribution, normalized and clamped to 1.
    ///
    /// Empty text has no disorder. Counts are summed in character order so the
    /// result is bit-for-bit repeatable.
    pub fn disorder(&self, text: &str) -> f64 {
        let mut frequency: BTreeMap<char, usize> = BTreeMap::new();
        let mut total = 0usize;
        for c in text.chars() {
            *frequency.entry(c).or_insert(0) += 1;
            total += 1;
        }
        if total == 0 {
            return 0.0;
        }

        let total = total as f64;
        let entropy: f64 = frequency
            .values()
            .map(|&count| {
                let p = count as f64 / total;
                -p * p.log2()
            })
            .sum();

        (entropy / self.disorder_normalization).min(1.0)
    }

    /// Fraction of tenets present, boosted, then clamped to 1.
    ///
    /// Tokens are compared after trimming surrounding punctuation so that
    /// "light." counts as "light".
    fn coverage(&self, text: &str) -> f64 {
        if self.tenets.is_empty() {
            return 0.0;
        }

        let lower = text.to_lowercase();
        let words: HashSet<&str> = lower
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|w| !w.is_empty())
            .collect();

        let matched = self
            .tenets
            .iter()
            .filter(|tenet| words.contains(tenet.as_str()))
            .count();

        let ratio = matched as f64 / self.tenets.len() as f64;
        (ratio * self.coverage_boost).min(1.0)
    }

    /// Unique raw tokens over total tokens. Case and punctuation are kept.
    fn diversity(&self, text: &str) -> f64 {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let unique: HashSet<&str> = tokens.iter().copied().collect();
        unique.len() as f64 / (tokens.len() as f64 + DIVERSITY_EPSILON)
    }

    pub fn score(&self, text: &str) -> Metrics {
        let coverage_score = self.coverage(text);
        let diversity_score = self.diversity(text);
        let order_score = 1.0 - self.disorder(text);

        Metrics {
            coverage_score,
            diversity_score,
            order_score,
            division_score: self.division_placeholder,
            overall_score: (coverage_score + diversity_score + order_score) / 3.0,
        }
    }
}
