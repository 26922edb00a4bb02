use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{Metrics, PathResult, ResonanceGraph};

/// Represents one completed interaction: an intent, what the generator
/// produced for it, and the state of the resonance web afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The unique identifier for the entry (UUID v4).
    pub id: Uuid,
    /// The intent exactly as the user typed it.
    pub intent: String,
    /// The generated text.
    pub output: String,
    /// Scores computed from `output`.
    pub metrics: Metrics,
    /// When the entry was produced (serialized as ISO-8601).
    pub timestamp: DateTime<Utc>,
    /// The path the intent was routed to, with its decorated prompt.
    pub path: PathResult,
    /// Snapshot of the web after relaxation.
    pub graph: ResonanceGraph,
}

impl HistoryEntry {
    pub fn new(
        intent: String,
        output: String,
        metrics: Metrics,
        path: PathResult,
        graph: ResonanceGraph,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            intent,
            output,
            metrics,
            timestamp: Utc::now(),
            path,
            graph,
        }
    }

    /// One-line summary for logs and the CLI.
    pub fn summary(&self) -> String {
        format!(
            "Path: {}, Overall: {:.3} (coverage {:.2}, diversity {:.2}, order {:.2}), Vitality: {:.3}",
            self.path.label,
            self.metrics.overall_score,
            self.metrics.coverage_score,
            self.metrics.diversity_score,
            self.metrics.order_score,
            self.graph.mean_vitality()
        )
    }
}
