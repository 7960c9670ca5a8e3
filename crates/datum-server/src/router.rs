use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use datum_backend::Backend;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all datum endpoints.
pub fn build_router(backend: Arc<Backend>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/create", post(handler::create_token))
        .route("/create/onetime/:parent", post(handler::create_onetime))
        .fallback(handler::dispatch)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { backend })
}
