//! # Engine Module
//!
//! Pure, synchronous scoring and state evolution. Nothing here performs I/O.
//!
//! ## Components
//! - `metrics`: coverage, diversity, order and division scores for generated text
//! - `path`: keyword-based path classification and prompt decoration
//! - `web`: the resonance web and its relaxation step

pub mod metrics;
pub mod path;
pub mod web;

pub use metrics::{Metrics, TextMetrics};
pub use path::{PathClassifier, PathLabel, PathResult};
pub use web::{GraphEdge, GraphNode, ResonanceGraph};
