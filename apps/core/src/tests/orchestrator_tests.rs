//! Orchestrator Tests
//!
//! Pipeline ordering, failure handling and the single in-flight rule.

use crate::actors::messages::Role;
use crate::config::InterpreterConfig;
use crate::engine::{PathClassifier, PathLabel, ResonanceGraph, TextMetrics};
use crate::error::{GenerationError, InputError, ProcessingError};
use crate::models::HistoryEntry;
use crate::orchestrator::Orchestrator;
use crate::tests::mocks::{GatedGenerator, ScriptedGenerator};
use std::sync::Arc;

const INTENT: &str = "combine and unify these ideas";
const OUTPUT: &str = "Unity and harmony emerge through creation and light.";

fn past_entry(i: usize) -> HistoryEntry {
    HistoryEntry::new(
        format!("intent {}", i),
        format!("output {}", i),
        TextMetrics::new().score(""),
        PathClassifier::new().classify("anything", false),
        ResonanceGraph::seed(),
    )
}

#[tokio::test]
async fn test_end_to_end_synthesis() {
    // 1. Arrange
    let generator = Arc::new(ScriptedGenerator::text(OUTPUT));
    let orchestrator = Orchestrator::new(generator.clone());
    let seed = ResonanceGraph::seed();

    // 2. Act
    let entry = orchestrator.process(INTENT, false, &[], &seed).await.unwrap();

    // 3. Assert
    assert_eq!(entry.intent, INTENT);
    assert_eq!(entry.output, OUTPUT);
    assert_eq!(entry.path.label, PathLabel::Synthesis);
    assert_eq!(
        entry.path.prompt,
        "Synthesize a creative response for the following: combine and unify these ideas"
    );

    let m = entry.metrics;
    assert!((m.coverage_score - 0.6).abs() < 1e-9);
    // "and" appears twice among eight tokens.
    assert!((m.diversity_score - 7.0 / 8.0).abs() < 1e-9);
    let order = 1.0 - TextMetrics::new().disorder(OUTPUT);
    assert!((m.order_score - order).abs() < 1e-12);
    assert!((m.overall_score - (0.6 + 7.0 / 8.0 + order) / 3.0).abs() < 1e-9);

    for (before, after) in seed.nodes.iter().zip(&entry.graph.nodes) {
        let expected = before.vitality * 0.98 + 0.02 * m.overall_score;
        assert!((after.vitality - expected).abs() < 1e-12);
    }
    for (before, after) in seed.edges.iter().zip(&entry.graph.edges) {
        let expected = before.coherence * 0.98 + 0.02 * m.coverage_score;
        assert!((after.coherence - expected).abs() < 1e-12);
    }

    // Input graph untouched.
    assert_eq!(seed, ResonanceGraph::seed());
    assert!(!orchestrator.is_busy());
}

#[tokio::test]
async fn test_invocation_wraps_decorated_prompt() {
    let generator = Arc::new(ScriptedGenerator::text(OUTPUT));
    let orchestrator = Orchestrator::new(generator.clone());

    orchestrator
        .process("Why does the river bend?", true, &[], &ResonanceGraph::seed())
        .await
        .unwrap();

    let calls = generator.calls();
    assert_eq!(calls.len(), 1);
    let prompt = &calls[0].prompt;
    assert!(prompt.starts_with("[BEGIN INVOCATION]"));
    assert!(prompt.contains(
        "Provide a critical, yet love-based, resonant, reflection on the following: Why does the river bend?"
    ));
    assert!(calls[0].history.is_empty());
}

#[tokio::test]
async fn test_sentinel_output_is_generation_failure() {
    let generator = Arc::new(ScriptedGenerator::text("Error: offline"));
    let orchestrator = Orchestrator::new(generator);

    let err = orchestrator
        .process(INTENT, false, &[], &ResonanceGraph::seed())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ProcessingError::Generation(GenerationError::Sentinel("Error: offline".to_string()))
    );
    assert_eq!(err.to_string(), "Generation failed: Error: offline");
    assert!(!orchestrator.is_busy());
}

#[tokio::test]
async fn test_error_word_inside_text_is_not_sentinel() {
    let generator = Arc::new(ScriptedGenerator::text("No Error: here, only light."));
    let orchestrator = Orchestrator::new(generator);

    let result = orchestrator
        .process(INTENT, false, &[], &ResonanceGraph::seed())
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_sentinel_must_lead_the_output() {
    let generator = Arc::new(ScriptedGenerator::text("  Error: indented, still a verse."));
    let orchestrator = Orchestrator::new(generator);

    let entry = orchestrator
        .process(INTENT, false, &[], &ResonanceGraph::seed())
        .await
        .unwrap();
    assert_eq!(entry.output, "  Error: indented, still a verse.");
}

#[tokio::test]
async fn test_generator_error_propagates() {
    let failure = GenerationError::Status {
        status: 503,
        body: "unavailable".to_string(),
    };
    let generator = Arc::new(ScriptedGenerator::always(Err(failure.clone())));
    let orchestrator = Orchestrator::new(generator);

    let err = orchestrator
        .process(INTENT, false, &[], &ResonanceGraph::seed())
        .await
        .unwrap_err();
    assert_eq!(err, ProcessingError::Generation(failure));
}

#[tokio::test]
async fn test_empty_intent_rejected_without_generation() {
    let generator = Arc::new(ScriptedGenerator::text(OUTPUT));
    let orchestrator = Orchestrator::new(generator.clone());
    let seed = ResonanceGraph::seed();

    for intent in ["", "   ", "\n\t "] {
        let err = orchestrator.process(intent, true, &[], &seed).await.unwrap_err();
        assert_eq!(err, ProcessingError::Input(InputError::EmptyIntent));
    }
    assert!(generator.calls().is_empty());
    assert!(!orchestrator.is_busy());
}

#[tokio::test]
async fn test_history_window_sends_last_entries_oldest_first() {
    let generator = Arc::new(ScriptedGenerator::text(OUTPUT));
    let orchestrator = Orchestrator::new(generator.clone());
    let history: Vec<HistoryEntry> = (0..7).map(past_entry).collect();

    orchestrator
        .process(INTENT, false, &history, &ResonanceGraph::seed())
        .await
        .unwrap();

    let turns = &generator.calls()[0].history;
    assert_eq!(turns.len(), 10);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[0].text, "intent 2");
    assert_eq!(turns[1].role, Role::Model);
    assert_eq!(turns[1].text, "output 2");
    assert_eq!(turns[9].text, "output 6");
}

#[tokio::test]
async fn test_configured_window() {
    let generator = Arc::new(ScriptedGenerator::text(OUTPUT));
    let config = InterpreterConfig {
        history_window: 2,
        ..InterpreterConfig::default()
    };
    let orchestrator = Orchestrator::with_config(generator.clone(), &config).unwrap();
    let history: Vec<HistoryEntry> = (0..4).map(past_entry).collect();

    orchestrator
        .process(INTENT, false, &history, &config.seed)
        .await
        .unwrap();

    let turns = &generator.calls()[0].history;
    assert_eq!(turns.len(), 4);
    assert_eq!(turns[0].text, "intent 2");
}

#[tokio::test]
async fn test_non_finite_metrics_are_unexpected() {
    let generator = Arc::new(ScriptedGenerator::text(OUTPUT));
    let mut config = InterpreterConfig::default();
    config.metrics.division_placeholder = f64::NAN;
    let orchestrator = Orchestrator::with_config(generator, &config).unwrap();

    let err = orchestrator
        .process(INTENT, false, &[], &config.seed)
        .await
        .unwrap_err();
    assert!(matches!(err, ProcessingError::Unexpected(_)));
}

#[tokio::test]
async fn test_second_submission_rejected_while_busy() {
    // 1. Arrange
    let generator = Arc::new(GatedGenerator::new(OUTPUT));
    let orchestrator = Arc::new(Orchestrator::new(generator.clone()));

    // 2. Act: park the first submission inside the generator
    let first = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            let seed = ResonanceGraph::seed();
            orchestrator.process(INTENT, false, &[], &seed).await
        })
    };
    generator.started.notified().await;
    assert!(orchestrator.is_busy());

    let second = orchestrator
        .process("another intent", false, &[], &ResonanceGraph::seed())
        .await;

    // 3. Assert
    assert_eq!(second.unwrap_err(), ProcessingError::Input(InputError::Busy));

    generator.release.notify_one();
    let first = first.await.unwrap();
    assert_eq!(first.unwrap().output, OUTPUT);
    assert!(!orchestrator.is_busy());

    // The slot is free again.
    generator.release.notify_one();
    let third = orchestrator
        .process("a third intent", false, &[], &ResonanceGraph::seed())
        .await;
    assert!(third.is_ok());
}
