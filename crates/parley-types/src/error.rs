use thiserror::Error;

/// Fatal construction/startup failures.
///
/// A process that hits one of these must not serve traffic.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("credential '{0}' is not set in the environment")]
    MissingCredential(String),

    #[error("persona template '{0}' could not be read: {1}")]
    TemplateUnreadable(String, String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Persona template rendering failures.
///
/// Surfaced as bad persona input (4xx), not as a server fault.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template references unknown placeholder '{{{0}}}'")]
    UnknownPlaceholder(String),

    #[error("template has an unclosed '{{' placeholder")]
    UnclosedPlaceholder,

    #[error("template has a stray '}}' outside any placeholder")]
    StrayBrace,
}

/// Failures of the external completion service.
///
/// Transport, auth, and quota failures all land here; the HTTP boundary
/// surfaces them as a generic 5xx and logs the detail.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited or quota exhausted")]
    RateLimited,

    #[error("api error: {message}")]
    Api { message: String },

    #[error("stream error: {0}")]
    Stream(String),

    #[error("upstream call timed out")]
    Timeout,
}

/// Composite error for one chat exchange.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("completion service returned no content")]
    EmptyResponse,
}
