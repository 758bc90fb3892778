//! Reminder routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::auth::AuthUser;
use super::workspaces::{deleted_status, store_error_to_status};
use crate::services::store::{self, NewReminder, Reminder};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReminderPatchBody {
    pub completed: bool,
}

/// `GET /api/reminders`: soonest first.
pub async fn list_reminders(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Reminder>>, StatusCode> {
    let reminders = store::list_reminders(&state.pool, auth.user.id)
        .await
        .map_err(store_error_to_status)?;
    Ok(Json(reminders))
}

/// `POST /api/reminders`
pub async fn create_reminder(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewReminder>,
) -> Result<(StatusCode, Json<Reminder>), StatusCode> {
    let reminder = store::create_reminder(&state.pool, auth.user.id, &body)
        .await
        .map_err(store_error_to_status)?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

/// `PATCH /api/reminders/{id}`
pub async fn update_reminder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(reminder_id): Path<Uuid>,
    Json(body): Json<ReminderPatchBody>,
) -> Result<Json<Reminder>, StatusCode> {
    let reminder = store::set_reminder_completed(&state.pool, auth.user.id, reminder_id, body.completed)
        .await
        .map_err(store_error_to_status)?;
    Ok(Json(reminder))
}

/// `DELETE /api/reminders/{id}`
pub async fn delete_reminder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(reminder_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let deleted = store::delete_reminder(&state.pool, auth.user.id, reminder_id)
        .await
        .map_err(store_error_to_status)?;
    Ok(deleted_status(deleted))
}
