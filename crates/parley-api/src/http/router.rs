//! Axum router configuration with middleware.
//!
//! API routes under `/api/`, a `/health` endpoint, and -- when the web
//! directory exists -- the static page shells at `/`, `/onboarding`,
//! and `/chat`. Middleware: CORS, request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let web_dir = state.config.server.web_dir.clone();

    let mut router = Router::new()
        .route("/api/chat", post(handlers::chat::chat))
        .route("/api/chat/stream", post(handlers::chat::chat_stream))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Serve the static page shells from disk if the directory exists.
    // API routes and /health take priority; other assets (scripts,
    // styles) fall through to the directory service.
    if std::path::Path::new(&web_dir).exists() {
        router = router
            .route_service("/", ServeFile::new(format!("{web_dir}/index.html")))
            .route_service("/onboarding", ServeFile::new(format!("{web_dir}/onboarding.html")))
            .route_service("/chat", ServeFile::new(format!("{web_dir}/chat.html")))
            .fallback_service(ServeDir::new(&web_dir));
        tracing::info!(path = %web_dir, "static page shells enabled");
    }

    router
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
