//! HTTP API for the RAG service

pub mod health;
pub mod query;


pub use health::{root, sanity, SANITY_QUESTION};
pub use query::{query, ErrorResponse, QueryResponse};

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// All routes, with request tracing and CORS open to any origin.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/sanity", get(sanity))
        .route("/query", post(query))
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
