//! Session - owns the history and resonance web for one user session.
//!
//! Each session owns its orchestrator, and with it the in-flight slot, so
//! independent sessions never block each other. A submission holds the slot
//! from the moment it is accepted until its entry is committed, so history
//! always reflects completion order and graph and history are replaced
//! together.

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, instrument};

use crate::actors::traits::Generator;
use crate::config::InterpreterConfig;
use crate::engine::ResonanceGraph;
use crate::error::{ConfigError, ProcessingError};
use crate::models::HistoryEntry;
use crate::orchestrator::Orchestrator;

struct SessionState {
    history: Vec<HistoryEntry>,
    graph: ResonanceGraph,
}

pub struct Session<G: Generator> {
    orchestrator: Orchestrator<G>,
    state: Mutex<SessionState>,
    max_history: Option<usize>,
}

impl<G: Generator> Session<G> {
    /// Creates a session starting from `seed` with an empty history.
    ///
    /// # Arguments
    ///
    /// * `orchestrator` - The pipeline owned by this session.
    /// * `seed` - The initial resonance web.
    /// * `max_history` - Oldest entries beyond this bound are dropped; `None` keeps all.
    ///   A bound of 0 is raised to 1 so the committed entry is always kept.
    pub fn new(orchestrator: Orchestrator<G>, seed: ResonanceGraph, max_history: Option<usize>) -> Self {
        Self {
            orchestrator,
            state: Mutex::new(SessionState {
                history: Vec::new(),
                graph: seed,
            }),
            max_history: max_history.map(|max| max.max(1)),
        }
    }

    /// Builds the orchestrator and session from a configuration.
    pub fn from_config(generator: Arc<G>, config: &InterpreterConfig) -> Result<Self, ConfigError> {
        let orchestrator = Orchestrator::with_config(generator, config)?;
        Ok(Self::new(orchestrator, config.seed.clone(), config.max_history))
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionState>, ProcessingError> {
        self.state
            .lock()
            .map_err(|_| ProcessingError::Unexpected("session state lock poisoned".to_string()))
    }

    /// Processes one intent and commits the result.
    ///
    /// Returns the new entry, or an error with history and graph unchanged.
    #[instrument(skip(self))]
    pub async fn submit(&self, intent: &str, flame_active: bool) -> Result<HistoryEntry, ProcessingError> {
        let _guard = self.orchestrator.try_begin()?;

        let (history, graph) = {
            let state = self.lock()?;
            (state.history.clone(), state.graph.clone())
        };

        let entry = self
            .orchestrator
            .run(intent, flame_active, &history, &graph)
            .await?;

        let mut state = self.lock()?;
        state.graph = entry.graph.clone();
        state.history.push(entry.clone());
        if let Some(max) = self.max_history {
            let len = state.history.len();
            if len > max {
                state.history.drain(..len - max);
            }
        }
        info!("Committed entry {} ({} in history)", entry.id, state.history.len());

        Ok(entry)
    }

    pub fn is_busy(&self) -> bool {
        self.orchestrator.is_busy()
    }

    pub fn history(&self) -> Result<Vec<HistoryEntry>, ProcessingError> {
        Ok(self.lock()?.history.clone())
    }

    pub fn graph(&self) -> Result<ResonanceGraph, ProcessingError> {
        Ok(self.lock()?.graph.clone())
    }

    pub fn latest(&self) -> Result<Option<HistoryEntry>, ProcessingError> {
        Ok(self.lock()?.history.last().cloned())
    }

    /// History as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String, ProcessingError> {
        let state = self.lock()?;
        serde_json::to_string_pretty(&state.history)
            .map_err(|e| ProcessingError::Unexpected(format!("JSON error: {}", e)))
    }
}
