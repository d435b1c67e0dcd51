//! Application configuration for Parley.
//!
//! Deserialized from `config.toml`; every field has a default so a
//! missing or partial file still yields a runnable configuration. The
//! API credential is NOT part of this file -- it comes from the
//! environment at startup.

use serde::{Deserialize, Serialize};

use crate::llm::SamplingParams;

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the static page shells; skipped when absent.
    #[serde(default = "default_web_dir")]
    pub web_dir: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_web_dir() -> String {
    "web".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            web_dir: default_web_dir(),
        }
    }
}

/// Completion service settings: model, decoding parameters, timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub sampling: SamplingParams,
    /// Bound on upstream suspension: the whole call for a full
    /// completion, each awaited chunk for a stream.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            sampling: SamplingParams::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Session store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cap on turns kept per session (system turn included). The oldest
    /// non-system turns are evicted past this point.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

fn default_max_turns() -> usize {
    200
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// Path of the persona instruction template file.
    #[serde(default = "default_persona_template")]
    pub persona_template: String,
}

fn default_persona_template() -> String {
    "prompts/persona.txt".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            llm: LlmConfig::default(),
            session: SessionConfig::default(),
            persona_template: default_persona_template(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.request_timeout_secs, 60);
        assert_eq!(config.session.max_turns, 200);
        assert_eq!(config.persona_template, "prompts/persona.txt");
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: AppConfig = toml::from_str(
            r#"
[server]
port = 9090

[llm]
model = "gpt-4o"

[llm.sampling]
temperature = 0.9
"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.llm.model, "gpt-4o");
        assert!((config.llm.sampling.temperature - 0.9).abs() < f64::EPSILON);
        // Unset sampling fields keep their defaults.
        assert_eq!(config.llm.sampling.max_tokens, 500);
    }
}
