//! HTTP routes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use dungeonmind_domain::{
    CommandRequest, FieldError, GameSession, GameState, SessionId, ValidationError,
};

use crate::app::App;
use crate::use_cases::prompt;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/generate", post(generate))
        .route("/api/session/{session_id}", get(get_session))
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    game_state: GameState,
    session_id: SessionId,
    success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    game_state: GameState,
    session_id: SessionId,
    last_command: Option<String>,
}

/// `POST /api/generate` - run one turn of the game.
///
/// An unknown `sessionId` is not an error here: the turn proceeds as if no
/// session was given and a fresh one is created. The generator itself never
/// fails, so the only error paths are body validation and store surprises.
async fn generate(
    State(app): State<Arc<App>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let request = CommandRequest::from_value(&body)?;

    // Resolve the current state: an existing session's state, or the
    // authored opening scene for a fresh game.
    let current_session = request
        .session_id
        .as_deref()
        .and_then(|raw| raw.parse::<SessionId>().ok())
        .and_then(|id| app.store.get(id));
    let current_state = match &current_session {
        Some(session) => session.game_state.clone(),
        None => prompt::initial_state(),
    };

    let new_state = app.generator.generate(&request.command, &current_state).await;

    let session = match current_session {
        Some(session) => app
            .store
            .update(session.id, new_state.clone(), request.command.clone())
            .ok_or_else(|| ApiError::internal(
                "Failed to generate game content",
                format!("session {} vanished during update", session.id),
            ))?,
        None => app
            .store
            .create(new_state.clone(), Some(request.command.clone()), None),
    };

    Ok(Json(GenerateResponse {
        game_state: new_state,
        session_id: session.id,
        success: true,
    }))
}

/// `GET /api/session/{session_id}` - fetch a stored session.
///
/// Unlike the generate endpoint, an unknown id here is a hard 404. A path
/// segment that does not even parse as an id is just as unknown.
async fn get_session(
    State(app): State<Arc<App>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = session_id
        .parse::<SessionId>()
        .ok()
        .and_then(|id| app.store.get(id))
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;

    let game_state = revalidate_stored_state(&session)
        .map_err(|e| ApiError::internal("Failed to get session", e.to_string()))?;

    Ok(Json(SessionResponse {
        game_state,
        session_id: session.id,
        last_command: session.last_command,
    }))
}

/// Guard against store corruption: re-run the stored state through the
/// schema boundary before handing it back to the client.
fn revalidate_stored_state(session: &GameSession) -> Result<GameState, ValidationError> {
    let wire = serde_json::to_value(&session.game_state)
        .map_err(|e| ValidationError::single("$", e.to_string()))?;
    GameState::from_value(&wire)
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest {
        message: String,
        errors: Vec<FieldError>,
    },
    Internal {
        message: String,
        error: String,
    },
}

impl ApiError {
    fn internal(message: impl Into<String>, error: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
            error: error.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::BadRequest {
            message: "Invalid request data".to_string(),
            errors: e.errors,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": message })),
            )
                .into_response(),
            ApiError::BadRequest { message, errors } => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": message, "errors": errors })),
            )
                .into_response(),
            ApiError::Internal { message, error } => {
                tracing::error!(%message, %error, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": message, "error": error })),
                )
                    .into_response()
            }
        }
    }
}
