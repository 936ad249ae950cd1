//! Liveness and backend sanity check endpoints

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};

use crate::api::query::QueryResponse;
use crate::AppState;

pub const SANITY_QUESTION: &str = "What is the cause of heart attack?";

#[derive(Debug, Serialize, Deserialize)]
pub struct SanityResponse {
    pub question: String,
    #[serde(flatten)]
    pub result: QueryResponse,
}

pub async fn root() -> Json<QueryResponse> {
    Json(QueryResponse::answer("Hello, world!"))
}

/// Runs a fixed question through the full chain.
pub async fn sanity(State(app_state): State<AppState>) -> Json<SanityResponse> {
    let result = app_state.chain.answer(SANITY_QUESTION).await;

    Json(SanityResponse {
        question: SANITY_QUESTION.to_string(),
        result: QueryResponse::from_chain(result),
    })
}
