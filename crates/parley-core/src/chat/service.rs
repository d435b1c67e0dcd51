//! Completion gateway orchestrating assembly, the upstream call, and
//! session appends.
//!
//! Two call shapes feed one pipeline: session-backed (history owned by
//! the `SessionStore`, appends on success) and stateless (caller-owned
//! history, no store mutation). Both come in full-response and
//! streaming flavors.
//!
//! Append discipline: the user and assistant turns are written only
//! after the upstream call succeeds -- for streams, only after the
//! final chunk (append-on-completion). A failed call never mutates the
//! session. The per-session lock is held for the whole exchange, so
//! concurrent requests on one session id serialize instead of
//! interleaving their appends.

use std::pin::Pin;
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, warn};

use parley_types::chat::{ChatReply, MessageRole, Turn};
use parley_types::config::LlmConfig;
use parley_types::error::{ChatError, UpstreamError};
use parley_types::llm::{CompletionRequest, StreamEvent};
use parley_types::persona::Persona;

use crate::assemble::MessageAssembler;
use crate::llm::CompletionProvider;
use crate::session::{Session, SessionStore};

/// Lazy sequence of reply text fragments. Finite, not restartable;
/// fragments already yielded are never retracted.
pub type ReplyStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send + 'static>>;

/// The completion gateway.
///
/// Generic over `CompletionProvider` so tests can stub the upstream
/// service (parley-core never depends on parley-infra).
pub struct ChatService<P: CompletionProvider> {
    store: SessionStore,
    assembler: MessageAssembler,
    provider: P,
    config: LlmConfig,
}

impl<P: CompletionProvider> ChatService<P> {
    pub fn new(
        store: SessionStore,
        assembler: MessageAssembler,
        provider: P,
        config: LlmConfig,
    ) -> Self {
        Self {
            store,
            assembler,
            provider,
            config,
        }
    }

    /// Access the session store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Access the message assembler.
    pub fn assembler(&self) -> &MessageAssembler {
        &self.assembler
    }

    /// Name of the configured upstream provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    // --- Full-response entry points ---

    /// One exchange against a stored session.
    ///
    /// Renders the persona instruction, locks the session for the whole
    /// exchange, calls the upstream once, then appends the user and
    /// assistant turns in that order.
    pub async fn complete_with_session(
        &self,
        session_id: &str,
        persona: &Persona,
        message: &str,
    ) -> Result<ChatReply, ChatError> {
        let instruction = self.assembler.render_instruction(persona)?;
        let (session, outcome) = self.store.open(session_id, &instruction);
        let mut session = session.lock_owned().await;
        debug!(session_id, ?outcome, turns = session.turns().len(), "exchange started");

        let turns = MessageAssembler::assemble(&instruction, session.turns(), message);
        let content = self.call_upstream(turns).await?;

        session.append(MessageRole::User, message);
        session.append(MessageRole::Assistant, content.clone());
        Ok(ChatReply::assistant(content))
    }

    /// One exchange against caller-supplied history. No store mutation;
    /// the caller owns history persistence.
    pub async fn complete_with_history(
        &self,
        persona: &Persona,
        history: &[Turn],
        message: &str,
    ) -> Result<ChatReply, ChatError> {
        let turns = self.assembler.build(persona, message, history)?;
        let content = self.call_upstream(turns).await?;
        Ok(ChatReply::assistant(content))
    }

    // --- Streaming entry points ---

    /// Streaming exchange against a stored session.
    ///
    /// The session lock is moved into the returned stream and held
    /// until it ends, so the appends after the final chunk cannot race
    /// another exchange. Dropping the stream mid-transfer releases the
    /// lock and the upstream connection without appending anything.
    pub async fn stream_with_session(
        &self,
        session_id: &str,
        persona: &Persona,
        message: &str,
    ) -> Result<ReplyStream, ChatError> {
        let instruction = self.assembler.render_instruction(persona)?;
        let (session, _) = self.store.open(session_id, &instruction);
        let guard = session.lock_owned().await;
        let turns = MessageAssembler::assemble(&instruction, guard.turns(), message);
        Ok(self.relay_stream(turns, Some((guard, message.to_string()))))
    }

    /// Streaming exchange against caller-supplied history. No store
    /// mutation.
    pub async fn stream_with_history(
        &self,
        persona: &Persona,
        history: &[Turn],
        message: &str,
    ) -> Result<ReplyStream, ChatError> {
        let turns = self.assembler.build(persona, message, history)?;
        Ok(self.relay_stream(turns, None))
    }

    // --- Internals ---

    fn request(&self, turns: Vec<Turn>, stream: bool) -> CompletionRequest {
        CompletionRequest {
            model: self.config.model.clone(),
            turns,
            sampling: self.config.sampling.clone(),
            stream,
        }
    }

    /// Single bounded upstream call. Empty content is a failure, not an
    /// empty success.
    async fn call_upstream(&self, turns: Vec<Turn>) -> Result<String, ChatError> {
        let request = self.request(turns, false);
        debug!(model = %request.model, turns = request.turns.len(), "calling completion service");

        let timeout = Duration::from_secs(self.config.request_timeout_secs);
        let response = tokio::time::timeout(timeout, self.provider.complete(&request))
            .await
            .map_err(|_| UpstreamError::Timeout)??;

        if response.content.is_empty() {
            return Err(ChatError::EmptyResponse);
        }
        Ok(response.content)
    }

    /// Relay upstream fragments, appending the exchange (when
    /// session-backed) only after the upstream signals done.
    fn relay_stream(
        &self,
        turns: Vec<Turn>,
        append_to: Option<(OwnedMutexGuard<Session>, String)>,
    ) -> ReplyStream {
        let request = self.request(turns, true);
        let chunk_timeout = Duration::from_secs(self.config.request_timeout_secs);
        let upstream = self.provider.stream(request);

        Box::pin(async_stream::try_stream! {
            let mut append_to = append_to;
            let mut full = String::new();
            let mut upstream = std::pin::pin!(upstream);

            loop {
                let next = tokio::time::timeout(chunk_timeout, upstream.next())
                    .await
                    .map_err(|_| UpstreamError::Timeout)?;
                let Some(event) = next else {
                    // Upstream ended without an explicit Done marker.
                    break;
                };
                match event? {
                    StreamEvent::Delta { text } => {
                        if !text.is_empty() {
                            full.push_str(&text);
                            yield text;
                        }
                    }
                    StreamEvent::Done => break,
                }
            }

            if full.is_empty() {
                warn!("stream ended without content");
                Err(ChatError::EmptyResponse)?;
            }

            if let Some((mut session, user_message)) = append_to.take() {
                session.append(MessageRole::User, user_message);
                session.append(MessageRole::Assistant, full);
                debug!(session_id = %session.id(), "exchange appended after final chunk");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::PersonaTemplate;
    use crate::llm::EventStream;
    use parley_types::llm::CompletionResponse;

    /// Upstream stub: replies with `chunks` (concatenated for full
    /// responses, one delta per element for streams) or fails.
    struct StubProvider {
        chunks: Vec<&'static str>,
        fail: bool,
    }

    impl StubProvider {
        fn replying(chunks: Vec<&'static str>) -> Self {
            Self {
                chunks,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                chunks: Vec::new(),
                fail: true,
            }
        }
    }

    impl CompletionProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse, UpstreamError> {
            if self.fail {
                return Err(UpstreamError::Transport("connection reset".to_string()));
            }
            Ok(CompletionResponse {
                content: self.chunks.concat(),
                model: "stub-model".to_string(),
            })
        }

        fn stream(&self, _request: CompletionRequest) -> EventStream {
            if self.fail {
                return Box::pin(futures_util::stream::once(async {
                    Err(UpstreamError::Stream("broken pipe".to_string()))
                }));
            }
            let chunks: Vec<String> = self.chunks.iter().map(|c| c.to_string()).collect();
            Box::pin(async_stream::stream! {
                for chunk in chunks {
                    yield Ok(StreamEvent::Delta { text: chunk });
                }
                yield Ok(StreamEvent::Done);
            })
        }
    }

    fn service(provider: StubProvider) -> ChatService<StubProvider> {
        ChatService::new(
            SessionStore::new(200),
            MessageAssembler::new(PersonaTemplate::new("You are {bot_name}.")),
            provider,
            LlmConfig::default(),
        )
    }

    fn persona() -> Persona {
        Persona {
            user_age: 24,
            bot_gender: "female".to_string(),
            bot_name: "Minji".to_string(),
        }
    }

    #[tokio::test]
    async fn test_complete_returns_assistant_reply_with_timestamp() {
        let service = service(StubProvider::replying(vec!["hi there"]));
        let reply = service
            .complete_with_history(&persona(), &[], "hello")
            .await
            .unwrap();

        assert_eq!(reply.content, "hi there");
        assert_eq!(reply.role, MessageRole::Assistant);
        // Serialized timestamp parses back as ISO-8601.
        let json = serde_json_value(&reply);
        let ts = json["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    fn serde_json_value(reply: &ChatReply) -> serde_json::Value {
        serde_json::to_value(reply).unwrap()
    }

    #[tokio::test]
    async fn test_complete_with_session_appends_user_then_assistant() {
        let service = service(StubProvider::replying(vec!["hi there"]));
        let reply = service
            .complete_with_session("s1", &persona(), "hello")
            .await
            .unwrap();
        assert_eq!(reply.content, "hi there");

        let history = service.store().history("s1", "unused").await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, MessageRole::System);
        assert_eq!(history[0].content, "You are Minji.");
        assert_eq!(history[1], Turn::user("hello"));
        assert_eq!(history[2], Turn::assistant("hi there"));
    }

    #[tokio::test]
    async fn test_complete_with_history_leaves_store_untouched() {
        let service = service(StubProvider::replying(vec!["ok"]));
        let history = vec![Turn::user("a"), Turn::assistant("b")];
        service
            .complete_with_history(&persona(), &history, "hello")
            .await
            .unwrap();

        assert_eq!(service.store().session_count(), 0);
    }

    #[tokio::test]
    async fn test_complete_failure_is_atomic() {
        let service = service(StubProvider::failing());
        let err = service
            .complete_with_session("s1", &persona(), "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Upstream(_)));

        // The session was created but no exchange turn landed.
        let history = service.store().history("s1", "unused").await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, MessageRole::System);
    }

    #[tokio::test]
    async fn test_empty_response_is_failure_with_no_append() {
        let service = service(StubProvider::replying(vec![]));
        let err = service
            .complete_with_session("s1", &persona(), "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::EmptyResponse));

        let history = service.store().history("s1", "unused").await;
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_stream_relays_fragments_and_appends_after_final_chunk() {
        let service = service(StubProvider::replying(vec!["h", "i"]));
        let mut stream = service
            .stream_with_session("s1", &persona(), "hello")
            .await
            .unwrap();

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first, "h");

        // Mid-stream the session lock is still held by the exchange.
        let (handle, _) = service.store().open("s1", "unused");
        assert!(handle.try_lock().is_err());

        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second, "i");
        assert!(stream.next().await.is_none());

        // Appended only after the final chunk, as one concatenated turn.
        let history = service.store().history("s1", "unused").await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[1], Turn::user("hello"));
        assert_eq!(history[2], Turn::assistant("hi"));
    }

    #[tokio::test]
    async fn test_stream_failure_yields_error_and_no_append() {
        let service = service(StubProvider::failing());
        let mut stream = service
            .stream_with_session("s1", &persona(), "hello")
            .await
            .unwrap();

        let item = stream.next().await.unwrap();
        assert!(matches!(item, Err(ChatError::Upstream(_))));
        assert!(stream.next().await.is_none());

        let history = service.store().history("s1", "unused").await;
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_stream_dropped_midway_releases_lock_without_append() {
        let service = service(StubProvider::replying(vec!["h", "i"]));
        {
            let mut stream = service
                .stream_with_session("s1", &persona(), "hello")
                .await
                .unwrap();
            let _ = stream.next().await;
            // Client disconnects here: stream dropped before completion.
        }

        let history = service.store().history("s1", "unused").await;
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_stream_with_history_leaves_store_untouched() {
        let service = service(StubProvider::replying(vec!["h", "i"]));
        let stream = service
            .stream_with_history(&persona(), &[Turn::user("a")], "hello")
            .await
            .unwrap();

        let fragments: Vec<_> = stream.map(|r| r.unwrap()).collect::<Vec<_>>().await;
        assert_eq!(fragments, vec!["h", "i"]);
        assert_eq!(service.store().session_count(), 0);
    }

    #[tokio::test]
    async fn test_template_error_surfaces_before_any_call() {
        let service = ChatService::new(
            SessionStore::new(200),
            MessageAssembler::new(PersonaTemplate::new("{bad_key}")),
            StubProvider::replying(vec!["x"]),
            LlmConfig::default(),
        );
        let err = service
            .complete_with_session("s1", &persona(), "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Template(_)));
        // Rendering failed before the session could be created.
        assert_eq!(service.store().session_count(), 0);
    }

    #[tokio::test]
    async fn test_consecutive_exchanges_accumulate_history() {
        let service = service(StubProvider::replying(vec!["reply"]));
        for _ in 0..3 {
            service
                .complete_with_session("s1", &persona(), "again")
                .await
                .unwrap();
        }

        let history = service.store().history("s1", "unused").await;
        // System turn + 3 exchanges of 2 turns each.
        assert_eq!(history.len(), 7);
    }
}
