//! Observability setup for Parley: tracing subscriber initialization
//! and GenAI semantic-convention attribute constants.

pub mod genai_attrs;
pub mod tracing_setup;
