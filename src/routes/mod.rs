//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! JSON API only. `/api/chat` talks to the model, `/api/preview` runs the
//! same pipeline on supplied source, `/api/components` lists what the
//! preview can render.

pub mod chat;
pub mod components;
pub mod preview;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// API router with CORS, request tracing and the body size limit.
pub fn app(state: AppState, body_limit: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat::chat))
        .route("/api/preview", post(preview::preview))
        .route("/api/components", get(components::list_components))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
