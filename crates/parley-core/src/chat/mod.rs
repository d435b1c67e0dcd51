//! The completion gateway.

pub mod service;

pub use service::{ChatService, ReplyStream};
