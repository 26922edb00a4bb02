use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::HistoryEntry;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
        }
    }
}

/// One turn of context sent to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Builds generator context from the last `window` history entries.
///
/// Each entry contributes its original intent as a user turn followed by its
/// output as a model turn, oldest first.
pub fn history_turns(history: &[HistoryEntry], window: usize) -> Vec<ChatTurn> {
    let start = history.len().saturating_sub(window);
    history[start..]
        .iter()
        .flat_map(|entry| {
            [
                ChatTurn::user(entry.intent.clone()),
                ChatTurn::model(entry.output.clone()),
            ]
        })
        .collect()
}
