//! Completion request/response types for Parley.
//!
//! These types model the data shapes for talking to the external
//! completion service: message roles, decoding parameters, full
//! responses, and streaming events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chat::Turn;

/// Role of a turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// Decoding parameters passed through to the completion service.
///
/// None of these are computed; they come from configuration and are
/// forwarded verbatim on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingParams {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_frequency_penalty")]
    pub frequency_penalty: f64,
    #[serde(default = "default_presence_penalty")]
    pub presence_penalty: f64,
}

fn default_temperature() -> f64 {
    0.8
}

fn default_max_tokens() -> u32 {
    500
}

fn default_top_p() -> f64 {
    1.0
}

fn default_frequency_penalty() -> f64 {
    0.3
}

fn default_presence_penalty() -> f64 {
    0.3
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            frequency_penalty: default_frequency_penalty(),
            presence_penalty: default_presence_penalty(),
        }
    }
}

/// Request to the completion service.
///
/// `turns` is replayed in creation order; the system instruction is
/// always `turns[0]` by the time a request is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub turns: Vec<Turn>,
    pub sampling: SamplingParams,
    #[serde(default)]
    pub stream: bool,
}

/// Response from the completion service for a non-streaming call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
}

/// Events emitted during a streaming completion.
///
/// `Done` is the in-band end-of-stream value; the wire-level `[DONE]`
/// sentinel is a serialization concern of the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// An incremental text fragment, in arrival order.
    Delta { text: String },
    /// The upstream signalled completion.
    Done,
}
