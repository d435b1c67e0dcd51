//! CompletionProvider trait definition.
//!
//! Uses native async fn in traits (RPITIT, Rust 2024 edition) for
//! `complete`; `stream` returns a boxed stream so implementations can
//! hand back adapter pipelines without naming their types.
//!
//! Implementations live in parley-infra (e.g. `OpenAiCompatibleProvider`).

use std::pin::Pin;

use futures_util::Stream;

use parley_types::error::UpstreamError;
use parley_types::llm::{CompletionRequest, CompletionResponse, StreamEvent};

/// Boxed stream of completion events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, UpstreamError>> + Send + 'static>>;

/// Client for the external completion service.
///
/// One attempt per call; retries, if desired, belong to the caller.
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Send the full turn list and receive the complete response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, UpstreamError>> + Send;

    /// Open a streaming call. The stream is finite and not restartable;
    /// it ends after a `StreamEvent::Done` or an error.
    fn stream(&self, request: CompletionRequest) -> EventStream;
}
