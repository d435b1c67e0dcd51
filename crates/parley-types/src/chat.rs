//! Conversation turn and reply types for Parley.
//!
//! A conversation is an ordered sequence of role-tagged turns. Turns are
//! immutable once created and replayed to the completion service in
//! creation order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Re-export MessageRole from the llm module (it's used in both chat and
// completion contexts).
pub use crate::llm::MessageRole;

/// One role-tagged message unit in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: MessageRole,
    pub content: String,
}

impl Turn {
    /// A system-instruction turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// A user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// An assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// The reply returned to the client for one completed exchange.
///
/// `timestamp` serializes as an ISO-8601 string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub content: String,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
}

impl ChatReply {
    /// Build an assistant reply stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: MessageRole::Assistant,
            timestamp: Utc::now(),
        }
    }
}

/// Whether a get-or-create touched an existing session or made a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionOutcome {
    Created,
    Existing,
}

impl SessionOutcome {
    pub fn is_created(self) -> bool {
        matches!(self, SessionOutcome::Created)
    }
}
