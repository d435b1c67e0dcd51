//! OpenAI SSE stream to [`StreamEvent`] adapter.
//!
//! Maps `async-openai`'s [`ChatCompletionResponseStream`] chunks to the
//! provider-agnostic [`StreamEvent`] enum: one `Delta` per non-empty
//! content fragment, in arrival order, then a single `Done` when the
//! upstream stream finishes. The wire-level `[DONE]` sentinel is
//! consumed by `async-openai`; it never reaches this layer.

use futures_util::StreamExt;

use async_openai::types::chat::ChatCompletionResponseStream;

use parley_core::llm::EventStream;
use parley_types::error::UpstreamError;
use parley_types::llm::StreamEvent;

/// Adapt an async-openai chunk stream to [`StreamEvent`]s.
pub fn map_openai_stream(stream: ChatCompletionResponseStream) -> EventStream {
    Box::pin(async_stream::try_stream! {
        let mut stream = stream;

        while let Some(result) = stream.next().await {
            let chunk = result.map_err(|e| UpstreamError::Stream(e.to_string()))?;

            // Typically one choice per chunk.
            for choice in &chunk.choices {
                if let Some(content) = &choice.delta.content {
                    if !content.is_empty() {
                        yield StreamEvent::Delta {
                            text: content.clone(),
                        };
                    }
                }
            }
        }

        yield StreamEvent::Done;
    })
}
