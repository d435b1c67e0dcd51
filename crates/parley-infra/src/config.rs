//! Configuration loader for Parley.
//!
//! Reads `config.toml` from the working directory (or the path given on
//! the command line) and deserializes it into [`AppConfig`]. Falls back
//! to defaults when the file is missing or malformed; only the API
//! credential is load-bearing at startup, and that lives in the
//! environment, not here.

use std::path::Path;

use parley_types::config::AppConfig;

/// Load configuration from `path`.
///
/// - Missing file: returns [`AppConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the
///   default.
pub async fn load_config(path: &Path) -> AppConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no config file at {}, using defaults", path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("failed to read {}: {err}, using defaults", path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("failed to parse {}: {err}, using defaults", path.display());
            AppConfig::default()
        }
    }
}
