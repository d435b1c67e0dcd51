//! Chat endpoints: synchronous JSON and SSE streaming.
//!
//! POST /api/chat        -- full response as JSON
//! POST /api/chat/stream -- Server-Sent Events, one `data: <fragment>`
//!                          per fragment, closed by `data: [DONE]`
//!
//! Both accept the same body. When `session_id` is present the server
//! owns history in the session store; otherwise the caller-supplied
//! `history` is used and nothing is stored. On a mid-stream upstream
//! failure the SSE response ends WITHOUT the `[DONE]` sentinel, so
//! consumers can tell truncation from completion.

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_stream::Stream;
use tracing::Instrument;

use parley_observe::genai_attrs;
use parley_types::chat::{ChatReply, Turn};
use parley_types::persona::Persona;

use crate::http::error::AppError;
use crate::state::AppState;

/// Wire-level end-of-stream sentinel. Out-of-band marker, not content.
const DONE_SENTINEL: &str = "[DONE]";

/// Request body shared by both chat endpoints.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's new message.
    pub message: String,
    /// Prior turns, for the stateless call shape. Ignored when
    /// `session_id` is present (the store owns history then).
    #[serde(default)]
    pub history: Vec<Turn>,
    pub user_age: u32,
    pub bot_gender: String,
    pub bot_name: String,
    /// Session to continue (created on first use); absent means the
    /// caller owns history persistence.
    #[serde(default)]
    pub session_id: Option<String>,
}

impl ChatRequest {
    fn persona(&self) -> Persona {
        Persona {
            user_age: self.user_age,
            bot_gender: self.bot_gender.clone(),
            bot_name: self.bot_name.clone(),
        }
    }
}

/// Span carrying OTel GenAI semantic-convention attributes for one
/// completion call.
fn completion_span(state: &AppState) -> tracing::Span {
    let span = tracing::info_span!(
        "completion",
        "gen_ai.operation.name" = tracing::field::Empty,
        "gen_ai.provider.name" = tracing::field::Empty,
        "gen_ai.request.model" = tracing::field::Empty,
        "gen_ai.request.temperature" = tracing::field::Empty,
        "gen_ai.request.max_tokens" = tracing::field::Empty,
    );
    span.record(genai_attrs::GEN_AI_OPERATION_NAME, genai_attrs::OP_CHAT);
    span.record(
        genai_attrs::GEN_AI_PROVIDER_NAME,
        state.chat_service.provider_name(),
    );
    span.record(
        genai_attrs::GEN_AI_REQUEST_MODEL,
        state.config.llm.model.as_str(),
    );
    span.record(
        genai_attrs::GEN_AI_REQUEST_TEMPERATURE,
        state.config.llm.sampling.temperature,
    );
    span.record(
        genai_attrs::GEN_AI_REQUEST_MAX_TOKENS,
        state.config.llm.sampling.max_tokens,
    );
    span
}

/// POST /api/chat -- one full exchange.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let persona = body.persona();
    let span = completion_span(&state);

    let reply = match &body.session_id {
        Some(session_id) => {
            state
                .chat_service
                .complete_with_session(session_id, &persona, &body.message)
                .instrument(span)
                .await?
        }
        None => {
            state
                .chat_service
                .complete_with_history(&persona, &body.history, &body.message)
                .instrument(span)
                .await?
        }
    };

    Ok(Json(reply))
}

/// POST /api/chat/stream -- SSE streaming exchange.
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let persona = body.persona();
    let span = completion_span(&state);

    let reply_stream = match &body.session_id {
        Some(session_id) => {
            state
                .chat_service
                .stream_with_session(session_id, &persona, &body.message)
                .instrument(span)
                .await?
        }
        None => {
            state
                .chat_service
                .stream_with_history(&persona, &body.history, &body.message)
                .instrument(span)
                .await?
        }
    };

    let sse_stream = async_stream::stream! {
        let mut reply_stream = reply_stream;
        let mut failed = false;

        while let Some(item) = reply_stream.next().await {
            match item {
                Ok(fragment) => {
                    yield Ok::<_, Infallible>(Event::default().data(fragment));
                }
                Err(e) => {
                    tracing::error!(error = %e, "stream failed mid-transfer");
                    failed = true;
                    break;
                }
            }
        }

        if !failed {
            yield Ok(Event::default().data(DONE_SENTINEL));
        }
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_minimal_body() {
        let body: ChatRequest = serde_json::from_str(
            r#"{"message": "hi", "user_age": 24, "bot_gender": "female", "bot_name": "Minji"}"#,
        )
        .unwrap();
        assert_eq!(body.message, "hi");
        assert!(body.history.is_empty());
        assert!(body.session_id.is_none());
        assert_eq!(body.persona().bot_name, "Minji");
    }

    #[test]
    fn test_chat_request_with_history_and_session() {
        let body: ChatRequest = serde_json::from_str(
            r#"{
                "message": "hi",
                "history": [
                    {"role": "user", "content": "a"},
                    {"role": "assistant", "content": "b"}
                ],
                "user_age": 30,
                "bot_gender": "male",
                "bot_name": "Cheolsu",
                "session_id": "abc-123"
            }"#,
        )
        .unwrap();
        assert_eq!(body.history.len(), 2);
        assert_eq!(body.session_id.as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_chat_request_rejects_bad_role() {
        let result = serde_json::from_str::<ChatRequest>(
            r#"{
                "message": "hi",
                "history": [{"role": "wizard", "content": "a"}],
                "user_age": 30,
                "bot_gender": "male",
                "bot_name": "Cheolsu"
            }"#,
        );
        assert!(result.is_err());
    }
}
