//! Diagram routes. Generation lives under `/api/ai/artist`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use super::auth::AuthUser;
use super::workspaces::{deleted_status, store_error_to_status};
use crate::services::store::{self, Diagram};
use crate::state::AppState;

/// `GET /api/workspaces/{id}/diagrams`: newest first.
pub async fn list_diagrams(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<Vec<Diagram>>, StatusCode> {
    let diagrams = store::list_diagrams(&state.pool, auth.user.id, workspace_id)
        .await
        .map_err(store_error_to_status)?;
    Ok(Json(diagrams))
}

/// `DELETE /api/diagrams/{id}`
pub async fn delete_diagram(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(diagram_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let deleted = store::delete_diagram(&state.pool, auth.user.id, diagram_id)
        .await
        .map_err(store_error_to_status)?;
    Ok(deleted_status(deleted))
}
