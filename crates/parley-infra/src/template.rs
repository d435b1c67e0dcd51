//! Persona template file loading.
//!
//! The template is read once at startup and cached in application
//! state; an unreadable file is a fatal [`ConfigError`].

use std::path::Path;

use parley_core::assemble::PersonaTemplate;
use parley_types::error::ConfigError;

/// Load and trim the persona instruction template from `path`.
pub async fn load_persona_template(path: &Path) -> Result<PersonaTemplate, ConfigError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(PersonaTemplate::new(content.trim())),
        Err(err) => Err(ConfigError::TemplateUnreadable(
            path.display().to_string(),
            err.to_string(),
        )),
    }
}
