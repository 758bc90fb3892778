//! AI panel routes.
//!
//! Each handler is a thin shell over [`crate::services::assistant`]; the
//! status mapping below is the only HTTP-specific logic.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::auth::AuthUser;
use super::workspaces::store_error_to_status;
use crate::services::assistant::{self, AssistantError, PanelExchange};
use crate::services::store::Diagram;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    pub workspace_id: Uuid,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistBody {
    pub workspace_id: Uuid,
    pub prompt: String,
    #[serde(default)]
    pub include_context: bool,
}

pub(crate) fn assistant_error_to_status(err: AssistantError) -> StatusCode {
    match err {
        AssistantError::LlmNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        AssistantError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AssistantError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        AssistantError::Llm(e) if e.retryable() => StatusCode::SERVICE_UNAVAILABLE,
        AssistantError::Llm(_) => StatusCode::BAD_GATEWAY,
        AssistantError::Store(e) => store_error_to_status(e),
    }
}

/// `POST /api/ai/coder`
pub async fn coder(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ChatBody>,
) -> Result<Json<PanelExchange>, StatusCode> {
    let exchange = assistant::coder(&state, auth.user.id, body.workspace_id, &body.message)
        .await
        .map_err(assistant_error_to_status)?;
    Ok(Json(exchange))
}

/// `POST /api/ai/tutor`
pub async fn tutor(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ChatBody>,
) -> Result<Json<PanelExchange>, StatusCode> {
    let exchange = assistant::tutor(&state, auth.user.id, body.workspace_id, &body.message)
        .await
        .map_err(assistant_error_to_status)?;
    Ok(Json(exchange))
}

/// `POST /api/ai/artist`: generate and store a Mermaid diagram.
pub async fn artist(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ArtistBody>,
) -> Result<(StatusCode, Json<Diagram>), StatusCode> {
    let diagram = assistant::artist(&state, auth.user.id, body.workspace_id, &body.prompt, body.include_context)
        .await
        .map_err(assistant_error_to_status)?;
    Ok((StatusCode::CREATED, Json(diagram)))
}

#[cfg(test)]
#[path = "ai_test.rs"]
mod tests;
