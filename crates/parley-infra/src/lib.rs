//! Infrastructure layer for Parley.
//!
//! Contains the implementations behind the ports defined in
//! `parley-core`: the OpenAI-compatible completion provider, config
//! file loading, environment credential resolution, and persona
//! template loading.

pub mod config;
pub mod credentials;
pub mod llm;
pub mod template;
