//! API routes

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::conversation::Message;
use crate::core::ChatError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Absent and blank are both rejected with a client error.
    #[serde(default)]
    pub message: Option<String>,

    /// Prior turns of this conversation, supplied by the client. The
    /// server keeps no session state.
    #[serde(default)]
    pub history: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    name: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Failures surfaced to callers. Descriptions are intentionally generic;
/// details stay in the server log.
#[derive(Debug)]
enum ApiError {
    EmptyMessage,
    Engine(ChatError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::EmptyMessage => (StatusCode::BAD_REQUEST, "message is required"),
            ApiError::Engine(ChatError::NonTermination { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "conversation did not terminate",
            ),
            ApiError::Engine(ChatError::Provider(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "upstream model request failed",
            ),
        };

        (
            status,
            Json(ErrorBody {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        name: state.persona.name.clone(),
    })
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = match request.message.as_deref() {
        Some(message) if !message.trim().is_empty() => message,
        _ => return Err(ApiError::EmptyMessage),
    };

    let response = state
        .engine
        .chat(message, &request.history)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "chat turn failed");
            ApiError::Engine(e)
        })?;

    Ok(Json(ChatResponse { response }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
}
