//! OpenAI-compatible completion provider.
//!
//! One [`OpenAiCompatibleProvider`] serves the hosted OpenAI API and
//! any other endpoint speaking the same chat-completions dialect, via a
//! configurable base URL. Uses [`async_openai`] for type-safe
//! request/response handling and built-in SSE streaming.

pub mod config;
pub mod streaming;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use secrecy::ExposeSecret;

use parley_core::llm::{CompletionProvider, EventStream};
use parley_types::error::UpstreamError;
use parley_types::llm::{CompletionRequest, CompletionResponse, MessageRole};

use self::config::OpenAiCompatConfig;
use self::streaming::map_openai_stream;

/// Provider for any OpenAI-compatible chat-completions API.
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
        }
    }

    /// Map a generic [`CompletionRequest`] to the wire request shape.
    fn build_request(&self, request: &CompletionRequest, stream: bool) -> CreateChatCompletionRequest {
        let messages: Vec<ChatCompletionRequestMessage> = request
            .turns
            .iter()
            .map(|turn| match turn.role {
                MessageRole::System => {
                    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                        content: ChatCompletionRequestSystemMessageContent::Text(
                            turn.content.clone(),
                        ),
                        name: None,
                    })
                }
                MessageRole::User => {
                    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                        content: ChatCompletionRequestUserMessageContent::Text(
                            turn.content.clone(),
                        ),
                        name: None,
                    })
                }
                MessageRole::Assistant => {
                    #[allow(deprecated)]
                    ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                        content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                            turn.content.clone(),
                        )),
                        refusal: None,
                        name: None,
                        audio: None,
                        tool_calls: None,
                        function_call: None,
                    })
                }
            })
            .collect();

        let sampling = &request.sampling;
        CreateChatCompletionRequest {
            model: request.model.clone(),
            messages,
            max_completion_tokens: Some(sampling.max_tokens),
            temperature: Some(sampling.temperature as f32),
            top_p: Some(sampling.top_p as f32),
            frequency_penalty: Some(sampling.frequency_penalty as f32),
            presence_penalty: Some(sampling.presence_penalty as f32),
            stream: if stream { Some(true) } else { None },
            ..Default::default()
        }
    }
}

impl CompletionProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, UpstreamError> {
        let wire_request = self.build_request(request, false);

        let response = self
            .client
            .chat()
            .create(wire_request)
            .await
            .map_err(map_openai_error)?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            model: response.model,
        })
    }

    fn stream(&self, request: CompletionRequest) -> EventStream {
        let wire_request = self.build_request(&request, true);
        let client = self.client.clone();

        Box::pin(async_stream::try_stream! {
            let openai_stream = client
                .chat()
                .create_stream(wire_request)
                .await
                .map_err(map_openai_error)?;

            let mut inner = map_openai_stream(openai_stream);

            use futures_util::StreamExt;
            while let Some(event) = inner.next().await {
                yield event?;
            }
        })
    }
}

/// Classify an [`async_openai::error::OpenAIError`] as an [`UpstreamError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> UpstreamError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "authentication_error"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
                || api_err.message.contains("Invalid API key")
            {
                UpstreamError::AuthenticationFailed
            } else if code == "rate_limit_exceeded"
                || code == "insufficient_quota"
                || error_type == "rate_limit_error"
                || error_type == "insufficient_quota"
            {
                UpstreamError::RateLimited
            } else {
                UpstreamError::Api {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => {
            if let Some(status) = reqwest_err.status() {
                match status.as_u16() {
                    401 => UpstreamError::AuthenticationFailed,
                    429 => UpstreamError::RateLimited,
                    _ => UpstreamError::Transport(err.to_string()),
                }
            } else {
                UpstreamError::Transport(err.to_string())
            }
        }
        OpenAIError::JSONDeserialize(_, content) => {
            UpstreamError::Transport(format!("failed to parse response: {content}"))
        }
        OpenAIError::StreamError(stream_err) => UpstreamError::Stream(stream_err.to_string()),
        OpenAIError::InvalidArgument(msg) => UpstreamError::Api {
            message: msg.clone(),
        },
        _ => UpstreamError::Api {
            message: err.to_string(),
        },
    }
}
