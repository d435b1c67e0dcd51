//! Environment credential resolution.
//!
//! The completion service API key is read from the process environment
//! exactly once, at startup. Absence is a fatal [`ConfigError`], never
//! a per-request failure.
//!
//! Key resolution: `PARLEY_OPENAI_API_KEY` first, then the conventional
//! `OPENAI_API_KEY`.

use secrecy::SecretString;

use parley_types::error::ConfigError;

/// Parley-scoped variable, checked first.
pub const PRIMARY_VAR: &str = "PARLEY_OPENAI_API_KEY";

/// Conventional variable, checked as a fallback.
pub const FALLBACK_VAR: &str = "OPENAI_API_KEY";

/// Resolve the completion service API key from the environment.
pub fn api_key_from_env() -> Result<SecretString, ConfigError> {
    for var in [PRIMARY_VAR, FALLBACK_VAR] {
        match std::env::var(var) {
            Ok(value) if !value.is_empty() => return Ok(SecretString::from(value)),
            // Unset, empty, or not valid Unicode -- keep looking.
            _ => {}
        }
    }
    Err(ConfigError::MissingCredential(FALLBACK_VAR.to_string()))
}
