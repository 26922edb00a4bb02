//! Resonance web: a small fixed-topology graph that drifts toward the quality
//! of recent output.
//!
//! Nodes carry a vitality and edges a coherence, both in [0, 1]. Edges refer
//! to nodes by identifier. The topology is fixed once seeded; relaxation only
//! moves the scalars.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::metrics::Metrics;
use crate::config::RelaxationConfig;
use crate::error::GraphError;

/// A node of the web. Coordinates are display hints and never interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub vitality: f64,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, x: f64, y: f64, vitality: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            vitality,
        }
    }
}

/// An edge between two node identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub coherence: f64,
}

impl GraphEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, coherence: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            coherence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResonanceGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl ResonanceGraph {
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self { nodes, edges }
    }

    /// The default four-node web.
    pub fn seed() -> Self {
        Self::new(
            vec![
                GraphNode::new("heal", 50.0, 50.0, 0.9),
                GraphNode::new("unify", 250.0, 75.0, 0.85),
                GraphNode::new("create", 100.0, 250.0, 0.8),
                GraphNode::new("resonate", 200.0, 25.0, 0.95),
            ],
            vec![
                GraphEdge::new("heal", "unify", 0.7),
                GraphEdge::new("unify", "create", 0.65),
                GraphEdge::new("create", "resonate", 0.8),
                GraphEdge::new("heal", "resonate", 0.9),
            ],
        )
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edges whose endpoints both resolve, paired with their nodes.
    pub fn resolved_edges(&self) -> impl Iterator<Item = (&GraphEdge, &GraphNode, &GraphNode)> {
        self.edges.iter().filter_map(move |edge| {
            let source = self.node(&edge.source)?;
            let target = self.node(&edge.target)?;
            Some((edge, source, target))
        })
    }

    /// Edges with at least one unknown endpoint.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges
            .iter()
            .filter(move |e| self.node(&e.source).is_none() || self.node(&e.target).is_none())
    }

    pub fn mean_vitality(&self) -> f64 {
        mean(self.nodes.iter().map(|n| n.vitality))
    }

    pub fn mean_coherence(&self) -> f64 {
        mean(self.edges.iter().map(|e| e.coherence))
    }

    /// Checks identifiers are unique and every scalar lies in [0, 1].
    ///
    /// Dangling edges are not an error.
    pub fn check(&self) -> Result<(), GraphError> {
        let mut ids = HashSet::new();
        for node in &self.nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
            if !in_unit_range(node.vitality) {
                return Err(GraphError::VitalityOutOfRange {
                    id: node.id.clone(),
                    value: node.vitality,
                });
            }
        }
        for edge in &self.edges {
            if !in_unit_range(edge.coherence) {
                return Err(GraphError::CoherenceOutOfRange {
                    from: edge.source.clone(),
                    to: edge.target.clone(),
                    value: edge.coherence,
                });
            }
        }
        Ok(())
    }

    /// True when every scalar is finite.
    pub fn is_finite(&self) -> bool {
        self.nodes.iter().all(|n| n.vitality.is_finite())
            && self.edges.iter().all(|e| e.coherence.is_finite())
    }

    /// Returns a copy of the web moved one step toward `metrics`.
    ///
    /// Vitality follows the overall score (plus the flame boost when active),
    /// coherence follows the coverage score. Both are capped at 1. Order,
    /// identifiers, coordinates and dangling edges are preserved.
    pub fn relax(&self, metrics: &Metrics, flame_active: bool, params: &RelaxationConfig) -> Self {
        let boost = if flame_active { params.flame_boost } else { 0.0 };

        let nodes = self
            .nodes
            .iter()
            .map(|node| GraphNode {
                vitality: (node.vitality * params.decay + metrics.overall_score * params.step + boost)
                    .min(1.0),
                ..node.clone()
            })
            .collect();

        let edges = self
            .edges
            .iter()
            .map(|edge| GraphEdge {
                coherence: (edge.coherence * params.decay + metrics.coverage_score * params.step)
                    .min(1.0),
                ..edge.clone()
            })
            .collect();

        Self { nodes, edges }
    }
}

fn in_unit_range(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(overall: f64, coverage: f64) -> Metrics {
        Metrics {
            coverage_score: coverage,
            diversity_score: 1.0,
            order_score: 1.0,
            division_score: 0.1,
            overall_score: overall,
        }
    }

    #[test]
    fn test_seed_is_connected_and_valid() {
        let web = ResonanceGraph::seed();
        assert_eq!(web.nodes.len(), 4);
        assert_eq!(web.edges.len(), 4);
        assert!(web.check().is_ok());
        assert_eq!(web.dangling_edges().count(), 0);
        assert_eq!(web.resolved_edges().count(), 4);
    }

    #[test]
    fn test_single_relaxation_step() {
        let web = ResonanceGraph::seed();
        let params = RelaxationConfig::default();
        let relaxed = web.relax(&metrics(0.5, 0.6), false, &params);

        let heal = relaxed.node("heal").unwrap();
        assert!((heal.vitality - (0.9 * 0.98 + 0.5 * 0.02)).abs() < 1e-12);
        assert!((relaxed.edges[0].coherence - (0.7 * 0.98 + 0.6 * 0.02)).abs() < 1e-12);

        // Input untouched.
        assert_eq!(web, ResonanceGraph::seed());
    }

    #[test]
    fn test_flame_boost_applies_to_nodes_only() {
        let web = ResonanceGraph::seed();
        let params = RelaxationConfig::default();
        let cold = web.relax(&metrics(0.2, 0.2), false, &params);
        let warm = web.relax(&metrics(0.2, 0.2), true, &params);

        let create_cold = cold.node("create").unwrap().vitality;
        let create_warm = warm.node("create").unwrap().vitality;
        assert!((create_warm - create_cold - 0.05).abs() < 1e-12);
        assert_eq!(cold.edges, warm.edges);
    }

    #[test]
    fn test_saturation_converges_monotonically() {
        let params = RelaxationConfig::default();
        let full = metrics(1.0, 1.0);
        let mut web = ResonanceGraph::seed();

        for _ in 0..200 {
            let next = web.relax(&full, true, &params);
            for (before, after) in web.nodes.iter().zip(&next.nodes) {
                assert!(after.vitality >= before.vitality);
                assert!(after.vitality <= 1.0);
            }
            for (before, after) in web.edges.iter().zip(&next.edges) {
                assert!(after.coherence >= before.coherence);
                assert!(after.coherence <= 1.0);
            }
            web = next;
        }

        assert!(web.nodes.iter().all(|n| n.vitality == 1.0));
        assert!(web.edges.iter().all(|e| (1.0 - e.coherence) < 1e-1));
    }

    #[test]
    fn test_decays_toward_low_scores() {
        let params = RelaxationConfig::default();
        let mut web = ResonanceGraph::seed();
        for _ in 0..50 {
            let next = web.relax(&metrics(0.0, 0.0), false, &params);
            assert!(next.mean_vitality() < web.mean_vitality());
            web = next;
        }
        assert!(web.nodes.iter().all(|n| n.vitality >= 0.0));
    }

    #[test]
    fn test_topology_preserved() {
        let web = ResonanceGraph::seed();
        let relaxed = web.relax(&metrics(0.7, 0.3), true, &RelaxationConfig::default());

        let ids: Vec<&str> = web.nodes.iter().map(|n| n.id.as_str()).collect();
        let relaxed_ids: Vec<&str> = relaxed.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, relaxed_ids);

        for (a, b) in web.nodes.iter().zip(&relaxed.nodes) {
            assert_eq!((a.x, a.y), (b.x, b.y));
        }
        for (a, b) in web.edges.iter().zip(&relaxed.edges) {
            assert_eq!((&a.source, &a.target), (&b.source, &b.target));
        }
    }

    #[test]
    fn test_dangling_edges_preserved_and_skipped() {
        let mut web = ResonanceGraph::seed();
        web.edges.push(GraphEdge::new("heal", "ghost", 0.5));

        assert_eq!(web.dangling_edges().count(), 1);
        assert_eq!(web.resolved_edges().count(), 4);
        assert!(web.check().is_ok());

        let relaxed = web.relax(&metrics(0.5, 0.5), false, &RelaxationConfig::default());
        assert_eq!(relaxed.edges.len(), 5);
        assert_eq!(relaxed.edges[4].target, "ghost");
    }

    #[test]
    fn test_check_rejects_duplicates() {
        let mut web = ResonanceGraph::seed();
        web.nodes.push(GraphNode::new("heal", 0.0, 0.0, 0.1));
        assert_eq!(web.check(), Err(GraphError::DuplicateNode("heal".to_string())));
    }

    #[test]
    fn test_check_rejects_out_of_range_scalars() {
        let mut web = ResonanceGraph::seed();
        web.edges[1].coherence = -0.1;
        assert!(matches!(
            web.check(),
            Err(GraphError::CoherenceOutOfRange { ref from, .. }) if from == "unify"
        ));

        let mut web = ResonanceGraph::seed();
        web.nodes[2].vitality = f64::NAN;
        assert!(matches!(web.check(), Err(GraphError::VitalityOutOfRange { .. })));
    }

    #[test]
    fn test_json_round_trip_preserves_identifiers() {
        let web = ResonanceGraph::seed().relax(&metrics(0.4, 0.4), false, &RelaxationConfig::default());
        let json = serde_json::to_string(&web).unwrap();
        let back: ResonanceGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back, web);
    }

    #[test]
    fn test_empty_graph_means() {
        let web = ResonanceGraph::default();
        assert_eq!(web.mean_vitality(), 0.0);
        assert_eq!(web.mean_coherence(), 0.0);
    }
}
