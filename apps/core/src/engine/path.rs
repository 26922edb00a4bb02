//! Path classification for incoming intents.
//!
//! Keyword matching routes an intent to one of three paths. Synthesis is
//! tested before Reflection; anything else starts on the Initiation path.
//! The classifier also produces the decorated prompt sent to the generator.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ClassifierConfig;
use crate::error::ConfigError;

/// Adjective used when the flame flag is on.
const FLAME_ADJECTIVE: &str = "love-based, resonant";
/// Adjective used otherwise.
const NEUTRAL_ADJECTIVE: &str = "creative";

/// Processing path chosen for an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathLabel {
    /// Default path for creative/generative requests (3)
    Initiation,
    /// Critical reflection (6)
    Reflection,
    /// Synthesis of several ideas (9)
    Synthesis,
}

impl fmt::Display for PathLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.number())
    }
}

impl PathLabel {
    /// Numeric identifier of the path. Not an index.
    pub fn number(&self) -> u8 {
        match self {
            PathLabel::Initiation => 3,
            PathLabel::Reflection => 6,
            PathLabel::Synthesis => 9,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PathLabel::Initiation => "Initiation",
            PathLabel::Reflection => "Reflection",
            PathLabel::Synthesis => "Synthesis",
        }
    }
}

/// Result of classifying one intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResult {
    /// The intent wrapped in the path's instruction sentence.
    pub prompt: String,
    pub label: PathLabel,
    /// Keyword that decided the path, if any.
    pub matched_keyword: Option<String>,
}

/// Keyword-based path classifier.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    synthesis: Option<Regex>,
    reflection: Option<Regex>,
}

impl Default for PathClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PathClassifier {
    /// Classifier with the built-in keyword lists.
    pub fn new() -> Self {
        // NOTE: expect() is fine here: the default lists are escaped literals.
        Self::with_config(&ClassifierConfig::default())
            .expect("Invalid regex: default path keywords")
    }

    pub fn with_config(config: &ClassifierConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            synthesis: keyword_pattern(&config.synthesis_keywords)?,
            reflection: keyword_pattern(&config.reflection_keywords)?,
        })
    }

    /// Classify an intent and build its decorated prompt.
    ///
    /// Matching is case-insensitive substring matching; the prompt keeps the
    /// intent's original casing.
    pub fn classify(&self, intent: &str, flame_active: bool) -> PathResult {
        let lower = intent.to_lowercase();

        let (label, matched_keyword) = if let Some(m) = first_match(&self.synthesis, &lower) {
            (PathLabel::Synthesis, Some(m.as_str().to_string()))
        } else if let Some(m) = first_match(&self.reflection, &lower) {
            (PathLabel::Reflection, Some(m.as_str().to_string()))
        } else {
            (PathLabel::Initiation, None)
        };

        PathResult {
            prompt: decorate(label, intent, flame_active),
            label,
            matched_keyword,
        }
    }
}

fn decorate(label: PathLabel, intent: &str, flame_active: bool) -> String {
    let adjective = if flame_active {
        FLAME_ADJECTIVE
    } else {
        NEUTRAL_ADJECTIVE
    };

    match label {
        PathLabel::Synthesis => format!(
            "Synthesize a {} response for the following: {}",
            adjective, intent
        ),
        PathLabel::Reflection => format!(
            "Provide a critical, yet {}, reflection on the following: {}",
            adjective, intent
        ),
        PathLabel::Initiation => format!(
            "Initiate a {} response for the following: {}",
            adjective, intent
        ),
    }
}

fn first_match<'t>(pattern: &Option<Regex>, text: &'t str) -> Option<regex::Match<'t>> {
    pattern.as_ref().and_then(|re| re.find(text))
}

/// Alternation of escaped, lowercased keywords. `None` for an empty list.
fn keyword_pattern(keywords: &[String]) -> Result<Option<Regex>, ConfigError> {
    let alternatives: Vec<String> = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .map(|k| regex::escape(&k))
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }
    Ok(Some(Regex::new(&alternatives.join("|"))?))
}
