//! Question answering endpoint

use axum::{
    body::{Body, Bytes},
    extract::{Form, FromRequest, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, StatusCode},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::core::ChainError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct QueryResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl QueryResponse {
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            response: text.into(),
            error: None,
        }
    }

    pub fn from_chain(result: Result<String, ChainError>) -> Self {
        match result {
            Ok(answer) => Self::answer(answer),
            Err(err) => {
                tracing::error!(code = err.code(), "Chain failed: {}", err);
                Self {
                    response: apology(err.code()),
                    error: Some(err.code().to_string()),
                }
            }
        }
    }
}

/// User-facing text returned in place of an answer when the chain fails.
pub fn apology(code: &str) -> String {
    format!(
        "Sorry, I ran into an issue when processing your previous question (error code {}), \
         feel free to try again. If the issue persists, I recommend trying to contact your \
         healthcare provider with your question instead.",
        code
    )
}

/// The `question` field of a form-encoded or JSON request body.
#[derive(Debug)]
pub struct Question(pub String);

type Rejection = (StatusCode, Json<ErrorResponse>);

fn reject(error: &str, message: impl Into<String>) -> Rejection {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.to_string(),
            message: message.into(),
        }),
    )
}

const JSON_MEDIA_TYPE: &str = "application/json";
const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

/// Lowercased media type of the request, without parameters.
fn media_type(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    value
        .split(';')
        .next()
        .map(|essence| essence.trim().to_ascii_lowercase())
}

fn missing_question() -> Rejection {
    reject("missing_question", "The `question` field is required")
}

impl<S> FromRequest<S> for Question
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let bytes = Bytes::from_request(Request::from_parts(parts.clone(), body), state)
            .await
            .map_err(|e| reject("invalid_body", e.body_text()))?;

        // An empty POST carries no question whatever its content type.
        if bytes.trim_ascii().is_empty() {
            return Err(missing_question());
        }

        let body = match media_type(&parts.headers).as_deref() {
            Some(JSON_MEDIA_TYPE) => serde_json::from_slice::<QueryRequest>(&bytes)
                .map_err(|e| reject("invalid_body", format!("Failed to parse the JSON body: {}", e)))?,
            media => {
                if media == Some(FORM_MEDIA_TYPE) {
                    parts
                        .headers
                        .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_MEDIA_TYPE));
                }
                Form::<QueryRequest>::from_request(Request::from_parts(parts, Body::from(bytes)), state)
                    .await
                    .map(|Form(body)| body)
                    .map_err(|e| reject("invalid_body", e.body_text()))?
            }
        };

        body.question
            .map(|question| question.trim().to_string())
            .filter(|question| !question.is_empty())
            .map(Question)
            .ok_or_else(missing_question)
    }
}

pub async fn query(
    State(app_state): State<AppState>,
    Question(question): Question,
) -> Json<QueryResponse> {
    tracing::debug!("Answering question: {}", question);
    Json(QueryResponse::from_chain(app_state.chain.answer(&question).await))
}
