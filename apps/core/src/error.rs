use std::io;
use thiserror::Error;

/// Prefix a generator uses to report a failure inside an otherwise successful reply.
pub const ERROR_SENTINEL: &str = "Error:";

/// Rejections that happen before any work is done.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    /// The intent is empty or only whitespace.
    #[error("Intent is empty")]
    EmptyIntent,

    /// Another intent is still being processed for this session.
    #[error("Another intent is still being processed")]
    Busy,
}

/// Failures reported by the external text generator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    /// The generator answered with an `Error:` prefixed message.
    #[error("{0}")]
    Sentinel(String),

    /// Transport-level failure (connection refused, TLS, malformed body).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with a non-success status.
    #[error("Generator returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered but produced no text.
    #[error("Generator returned no text")]
    EmptyResponse,

    /// The request did not complete in time.
    #[error("Generation timed out: {0}")]
    Timeout(String),

    /// The generator cannot be built from the current configuration.
    #[error("Generator configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Http(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for GenerationError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        GenerationError::Timeout(err.to_string())
    }
}

/// Outcome of a failed submission. Exactly one of these or a history entry is
/// produced per submission, and none of them leave state partially updated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProcessingError {
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Anything else: non-finite scores, poisoned session state.
    #[error("An unexpected error occurred during processing: {0}")]
    Unexpected(String),
}

/// Structural problems in a resonance web.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),

    #[error("node '{id}' vitality {value} outside [0, 1]")]
    VitalityOutOfRange { id: String, value: f64 },

    #[error("edge '{from}' -> '{to}' coherence {value} outside [0, 1]")]
    CoherenceOutOfRange { from: String, to: String, value: f64 },
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Environment error: {0}")]
    Env(String),

    #[error("Seed graph error: {0}")]
    Graph(#[from] GraphError),
}

impl From<validator::ValidationErrors> for ConfigError {
    fn from(err: validator::ValidationErrors) -> Self {
        ConfigError::Validation(format!("Validation errors: {}", err))
    }
}

impl From<url::ParseError> for ConfigError {
    fn from(err: url::ParseError) -> Self {
        ConfigError::Validation(format!("URL parse error: {}", err))
    }
}

impl From<regex::Error> for ConfigError {
    fn from(err: regex::Error) -> Self {
        ConfigError::Validation(format!("Keyword pattern error: {}", err))
    }
}
