//! Business logic for Parley.
//!
//! This crate holds the three components of the relay pipeline: the
//! in-memory session store, the persona message assembler, and the
//! completion gateway (`ChatService`). It defines the
//! `CompletionProvider` port that the infrastructure layer implements
//! and depends only on `parley-types` -- never on `parley-infra` or any
//! HTTP/IO crate.

pub mod assemble;
pub mod chat;
pub mod llm;
pub mod session;
