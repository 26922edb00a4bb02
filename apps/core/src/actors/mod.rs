//! Collaborators that talk to the outside world.
//!
//! - `traits`: the `Generator` seam
//! - `messages`: conversation turns passed to a generator
//! - `gemini`: HTTP generator backed by the Gemini `generateContent` API

pub mod gemini;
pub mod messages;
pub mod traits;

pub use gemini::GeminiGenerator;
pub use messages::{ChatTurn, Role};
pub use traits::Generator;
