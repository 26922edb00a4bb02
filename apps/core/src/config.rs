//! Interpreter configuration.
//!
//! Every tuning constant has a default. A JSON file named by `SYNTROPY_CONFIG`
//! can override any subset of them, and the generator settings can also be
//! overridden from the environment (`GEMINI_API_KEY`, `GEMINI_MODEL`,
//! `GEMINI_BASE_URL`).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use url::Url;
use validator::Validate;

use crate::engine::web::ResonanceGraph;
use crate::error::ConfigError;

/// Tenet words counted by the coverage score.
pub const DEFAULT_TENETS: &[&str] = &[
    "unity",
    "harmony",
    "resonance",
    "creation",
    "light",
    "sovereignty",
    "syntropy",
    "evolution",
    "consciousness",
    "truth",
];

/// Keywords that route an intent to the Synthesis path.
pub const DEFAULT_SYNTHESIS_KEYWORDS: &[&str] = &[
    "combine",
    "integrate",
    "summarize",
    "conclude",
    "synthesize",
    "unify",
    "connect",
];

/// Keywords that route an intent to the Reflection path.
pub const DEFAULT_REFLECTION_KEYWORDS: &[&str] = &[
    "compare",
    "contrast",
    "challenge",
    "refine",
    "why",
    "deconstruct",
    "analyze",
    "explain",
];

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variable pointing at a JSON configuration file.
pub const CONFIG_PATH_ENV: &str = "SYNTROPY_CONFIG";

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Constants used by the text metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MetricsConfig {
    #[validate(length(min = 1))]
    pub tenets: Vec<String>,
    /// Multiplier applied to the tenet ratio before clamping to 1.
    #[validate(range(min = 0.0))]
    pub coverage_boost: f64,
    /// Divisor that maps character entropy (bits) onto [0, 1].
    #[validate(range(min = 0.1))]
    pub disorder_normalization: f64,
    /// Value reported as the division score until a real signal exists.
    #[validate(range(min = 0.0, max = 1.0))]
    pub division_placeholder: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            tenets: owned(DEFAULT_TENETS),
            coverage_boost: 1.5,
            disorder_normalization: 5.0,
            division_placeholder: 0.1,
        }
    }
}

/// Keyword lists used by the path classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ClassifierConfig {
    #[validate(length(min = 1))]
    pub synthesis_keywords: Vec<String>,
    #[validate(length(min = 1))]
    pub reflection_keywords: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            synthesis_keywords: owned(DEFAULT_SYNTHESIS_KEYWORDS),
            reflection_keywords: owned(DEFAULT_REFLECTION_KEYWORDS),
        }
    }
}

/// Smoothing constants for relaxing the resonance web.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RelaxationConfig {
    #[validate(range(min = 0.0, max = 1.0))]
    pub decay: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub step: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub flame_boost: f64,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            decay: 0.98,
            step: 0.02,
            flame_boost: 0.05,
        }
    }
}

/// Settings for the HTTP text generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Never written back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    #[validate(length(min = 1))]
    pub model: String,
    #[validate(length(min = 1))]
    pub base_url: String,
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub top_p: f32,
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.8,
            top_p: 0.95,
            timeout_secs: 60,
        }
    }
}

/// Complete configuration for one interpreter session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct InterpreterConfig {
    pub metrics: MetricsConfig,
    pub classifier: ClassifierConfig,
    pub relaxation: RelaxationConfig,
    pub generator: GeneratorConfig,
    /// How many prior entries are sent to the generator as context.
    #[validate(range(min = 1))]
    pub history_window: usize,
    /// Upper bound on retained history; `None` keeps everything.
    pub max_history: Option<usize>,
    /// Initial resonance web.
    pub seed: ResonanceGraph,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            metrics: MetricsConfig::default(),
            classifier: ClassifierConfig::default(),
            relaxation: RelaxationConfig::default(),
            generator: GeneratorConfig::default(),
            history_window: 5,
            max_history: None,
            seed: ResonanceGraph::seed(),
        }
    }
}

impl InterpreterConfig {
    /// Loads the configuration file named by `SYNTROPY_CONFIG` (if any), then
    /// applies environment overrides and validates the result.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(env::VarError::NotPresent) => Self::default(),
            Err(e) => return Err(ConfigError::Env(format!("{}: {}", CONFIG_PATH_ENV, e))),
        };
        config.apply_env();
        config.validate_all()?;
        Ok(config)
    }

    /// Reads a JSON configuration file. Missing fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Loading configuration from {}", path.display());
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Applies generator overrides from the environment.
    pub fn apply_env(&mut self) {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_some() {
            self.generator.api_key = api_key;
        }
        if let Ok(model) = env::var("GEMINI_MODEL") {
            self.generator.model = model;
        }
        if let Ok(base_url) = env::var("GEMINI_BASE_URL") {
            self.generator.base_url = base_url;
        }
    }

    /// Validates every section plus the cross-field rules `validator` cannot express.
    pub fn validate_all(&self) -> Result<(), ConfigError> {
        self.validate()?;
        self.metrics.validate()?;
        self.classifier.validate()?;
        self.relaxation.validate()?;
        self.generator.validate()?;
        Url::parse(&self.generator.base_url)?;
        if self.max_history == Some(0) {
            return Err(ConfigError::Validation(
                "max_history must keep at least one entry".to_string(),
            ));
        }

        let synthesis: HashSet<String> = self
            .classifier
            .synthesis_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect();
        if let Some(shared) = self
            .classifier
            .reflection_keywords
            .iter()
            .find(|k| synthesis.contains(&k.to_lowercase()))
        {
            return Err(ConfigError::Validation(format!(
                "keyword '{}' appears in both synthesis and reflection lists",
                shared
            )));
        }

        self.seed.check()?;
        let dangling = self.seed.dangling_edges().count();
        if dangling > 0 {
            warn!("Seed graph has {} edge(s) with unknown endpoints", dangling);
        }
        Ok(())
    }
}
