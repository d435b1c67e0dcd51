//! HTTP/REST API layer for Parley.
//!
//! Axum-based API: JSON chat at `/api/chat`, SSE streaming at
//! `/api/chat/stream`, static page shells, CORS and request tracing.

pub mod error;
pub mod handlers;
pub mod router;
