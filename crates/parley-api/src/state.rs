//! Application state wiring the pipeline together.
//!
//! AppState holds the concrete chat service used by both the CLI and
//! the REST API. The service is generic over the provider port, but
//! AppState pins it to the OpenAI-compatible infra implementation.

use std::path::Path;
use std::sync::Arc;

use parley_core::assemble::MessageAssembler;
use parley_core::chat::ChatService;
use parley_core::session::SessionStore;
use parley_infra::llm::OpenAiCompatibleProvider;
use parley_infra::llm::openai_compat::config::OpenAiCompatConfig;
use parley_types::config::AppConfig;

/// Concrete type alias for the service generic pinned to the infra
/// provider.
pub type ConcreteChatService = ChatService<OpenAiCompatibleProvider>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Initialize the application state: read config, resolve the API
    /// credential, load the persona template, wire the service.
    ///
    /// A missing credential or unreadable template is a fatal error --
    /// the process must not serve traffic without them.
    pub async fn init(config_path: &Path) -> anyhow::Result<Self> {
        let config = parley_infra::config::load_config(config_path).await;

        let api_key = parley_infra::credentials::api_key_from_env()?;
        let template =
            parley_infra::template::load_persona_template(Path::new(&config.persona_template))
                .await?;

        let provider = OpenAiCompatibleProvider::new(OpenAiCompatConfig::openai(api_key));
        let chat_service = ChatService::new(
            SessionStore::new(config.session.max_turns),
            MessageAssembler::new(template),
            provider,
            config.llm.clone(),
        );

        Ok(Self {
            chat_service: Arc::new(chat_service),
            config: Arc::new(config),
        })
    }
}
