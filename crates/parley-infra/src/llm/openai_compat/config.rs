//! Connection settings for an OpenAI-compatible endpoint.

use secrecy::SecretString;

/// Default OpenAI API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for one OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct OpenAiCompatConfig {
    /// Human-readable name for logs (e.g. "openai").
    pub provider_name: String,
    pub api_key: SecretString,
    pub base_url: String,
}

impl OpenAiCompatConfig {
    /// Settings for the hosted OpenAI API.
    pub fn openai(api_key: SecretString) -> Self {
        Self {
            provider_name: "openai".to_string(),
            api_key,
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    /// Settings for any other OpenAI-compatible endpoint.
    pub fn compatible(
        provider_name: impl Into<String>,
        api_key: SecretString,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            provider_name: provider_name.into(),
            api_key,
            base_url: base_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_defaults() {
        let config = OpenAiCompatConfig::openai(SecretString::from("sk-test"));
        assert_eq!(config.provider_name, "openai");
        assert_eq!(config.base_url, OPENAI_BASE_URL);
    }

    #[test]
    fn test_compatible_endpoint() {
        let config = OpenAiCompatConfig::compatible(
            "local",
            SecretString::from("key"),
            "http://localhost:8080/v1",
        );
        assert_eq!(config.provider_name, "local");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
    }
}
