//! Syntropic interpreter core.
//!
//! Routes a free-text intent to one of three paths, sends a decorated prompt
//! to an external generator, scores the reply and relaxes the resonance web
//! toward that score.

pub mod actors;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod session;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use actors::{ChatTurn, GeminiGenerator, Generator, Role};
pub use config::InterpreterConfig;
pub use engine::{
    GraphEdge, GraphNode, Metrics, PathClassifier, PathLabel, PathResult, ResonanceGraph,
    TextMetrics,
};
pub use error::{ConfigError, GenerationError, GraphError, InputError, ProcessingError};
pub use models::HistoryEntry;
pub use orchestrator::Orchestrator;
pub use session::Session;
