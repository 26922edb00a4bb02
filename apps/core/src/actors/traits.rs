use crate::actors::messages::ChatTurn;
use crate::error::GenerationError;
use async_trait::async_trait;

/// Defines the public interface for the external text generator.
///
/// This trait abstracts the generation backend so the orchestrator can be
/// driven by a remote API in production and by scripted mocks in tests.
#[async_trait]
pub trait Generator: Send + Sync + 'static {
    /// Generates text for `prompt`, given prior turns in chronological order.
    ///
    /// Implementations may also report failure by returning text that starts
    /// with `Error:`; callers treat that the same as an `Err`.
    async fn generate(&self, prompt: String, history: Vec<ChatTurn>) -> Result<String, GenerationError>;
}
