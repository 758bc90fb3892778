//! Workspace routes: CRUD plus per-panel message history.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::auth::AuthUser;
use crate::services::store::{self, ChatMessage, Panel, StoreError, Workspace, WorkspacePatch};
use crate::state::AppState;

pub(crate) fn store_error_to_status(err: StoreError) -> StatusCode {
    match err {
        StoreError::NotFound => StatusCode::NOT_FOUND,
        StoreError::Invalid(_) => StatusCode::BAD_REQUEST,
        StoreError::Database(e) => {
            tracing::error!(error = %e, "store query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn deleted_status(deleted: bool) -> StatusCode {
    if deleted { StatusCode::NO_CONTENT } else { StatusCode::NOT_FOUND }
}

#[derive(Deserialize)]
pub struct CreateWorkspaceBody {
    pub name: String,
}

/// `GET /api/workspaces`
pub async fn list_workspaces(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Workspace>>, StatusCode> {
    let workspaces = store::list_workspaces(&state.pool, auth.user.id)
        .await
        .map_err(store_error_to_status)?;
    Ok(Json(workspaces))
}

/// `POST /api/workspaces`
pub async fn create_workspace(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateWorkspaceBody>,
) -> Result<(StatusCode, Json<Workspace>), StatusCode> {
    let workspace = store::create_workspace(&state.pool, auth.user.id, &body.name)
        .await
        .map_err(store_error_to_status)?;
    tracing::info!(workspace_id = %workspace.id, user_id = %auth.user.id, "workspace created");
    Ok((StatusCode::CREATED, Json(workspace)))
}

/// `GET /api/workspaces/{id}`
pub async fn get_workspace(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<Workspace>, StatusCode> {
    let workspace = store::get_workspace(&state.pool, auth.user.id, workspace_id)
        .await
        .map_err(store_error_to_status)?;
    Ok(Json(workspace))
}

/// `PATCH /api/workspaces/{id}`: rename or toggle panels.
pub async fn update_workspace(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Json(patch): Json<WorkspacePatch>,
) -> Result<Json<Workspace>, StatusCode> {
    let workspace = store::update_workspace(&state.pool, auth.user.id, workspace_id, &patch)
        .await
        .map_err(store_error_to_status)?;
    Ok(Json(workspace))
}

/// `DELETE /api/workspaces/{id}`
pub async fn delete_workspace(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let deleted = store::delete_workspace(&state.pool, auth.user.id, workspace_id)
        .await
        .map_err(store_error_to_status)?;
    Ok(deleted_status(deleted))
}

/// `GET /api/workspaces/{id}/messages/{panel}`: `coder` or `tutor` history,
/// oldest first.
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, panel)): Path<(Uuid, String)>,
) -> Result<Json<Vec<ChatMessage>>, StatusCode> {
    let panel: Panel = panel.parse().map_err(store_error_to_status)?;
    let messages = store::list_messages(&state.pool, auth.user.id, workspace_id, panel)
        .await
        .map_err(store_error_to_status)?;
    Ok(Json(messages))
}

#[cfg(test)]
#[path = "workspaces_test.rs"]
mod tests;
