//! Store service: workspaces, panel messages, diagrams, reminders.
//!
//! DESIGN
//! ======
//! Every operation takes the shared `PgPool` and the calling user's id.
//! Workspace-scoped rows are reached only through a workspace the caller
//! owns; anything else is reported as [`StoreError::NotFound`] so foreign
//! ids are indistinguishable from missing ones.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::llm::types::Role;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Conversational panels that keep a message history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Coder,
    Tutor,
}

impl Panel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Coder => "coder",
            Self::Tutor => "tutor",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Panel {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coder" => Ok(Self::Coder),
            "tutor" => Ok(Self::Tutor),
            other => Err(StoreError::Invalid(format!("unknown panel: {other}"))),
        }
    }
}

fn parse_role(s: &str) -> Result<Role, StoreError> {
    match s {
        "user" => Ok(Role::User),
        "assistant" => Ok(Role::Assistant),
        other => Err(StoreError::Invalid(format!("unknown role: {other}"))),
    }
}

/// Which panels are open in a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelStates {
    #[serde(default = "panel_open")]
    pub coder: bool,
    #[serde(default = "panel_open")]
    pub artist: bool,
    #[serde(default = "panel_open")]
    pub tutor: bool,
}

fn panel_open() -> bool {
    true
}

impl Default for PanelStates {
    fn default() -> Self {
        Self { coder: true, artist: true, tutor: true }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub panel_states: PanelStates,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Partial workspace update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspacePatch {
    pub name: Option<String>,
    pub panel_states: Option<PanelStates>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub panel_type: Panel,
    pub role: Role,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub prompt: String,
    pub mermaid_code: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewDiagram<'a> {
    pub workspace_id: Uuid,
    pub prompt: &'a str,
    pub mermaid_code: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workspace_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub reminder_date: OffsetDateTime,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReminder {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub reminder_date: OffsetDateTime,
    #[serde(default)]
    pub workspace_id: Option<Uuid>,
}

// =============================================================================
// ROW MAPPING
// =============================================================================

const WORKSPACE_COLUMNS: &str = "id, user_id, name, panel_states, created_at, updated_at";
const MESSAGE_COLUMNS: &str = "id, workspace_id, panel_type, role, content, created_at";
const DIAGRAM_COLUMNS: &str = "id, workspace_id, prompt, mermaid_code, created_at";
const REMINDER_COLUMNS: &str = "id, user_id, workspace_id, title, description, reminder_date, completed, created_at";

fn workspace_from_row(row: &PgRow) -> Result<Workspace, StoreError> {
    let Json(panel_states): Json<PanelStates> = row.try_get("panel_states")?;
    Ok(Workspace {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        panel_states,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn message_from_row(row: &PgRow) -> Result<ChatMessage, StoreError> {
    let panel: String = row.try_get("panel_type")?;
    let role: String = row.try_get("role")?;
    Ok(ChatMessage {
        id: row.try_get("id")?,
        workspace_id: row.try_get("workspace_id")?,
        panel_type: panel.parse()?,
        role: parse_role(&role)?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
    })
}

fn diagram_from_row(row: &PgRow) -> Result<Diagram, StoreError> {
    Ok(Diagram {
        id: row.try_get("id")?,
        workspace_id: row.try_get("workspace_id")?,
        prompt: row.try_get("prompt")?,
        mermaid_code: row.try_get("mermaid_code")?,
        created_at: row.try_get("created_at")?,
    })
}

fn reminder_from_row(row: &PgRow) -> Result<Reminder, StoreError> {
    Ok(Reminder {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        workspace_id: row.try_get("workspace_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        reminder_date: row.try_get("reminder_date")?,
        completed: row.try_get("completed")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Trim a user-supplied name or title, rejecting blank and over-long input.
pub(crate) fn clean_text(field: &str, raw: &str, max_chars: usize) -> Result<String, StoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Invalid(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(StoreError::Invalid(format!("{field} must be at most {max_chars} characters")));
    }
    Ok(trimmed.to_string())
}

const NAME_MAX_CHARS: usize = 200;

// =============================================================================
// WORKSPACES
// =============================================================================

/// Create a workspace with all panels open.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] for a blank name or a database error.
pub async fn create_workspace(pool: &PgPool, user_id: Uuid, name: &str) -> Result<Workspace, StoreError> {
    let name = clean_text("name", name, NAME_MAX_CHARS)?;
    let sql = format!(
        "INSERT INTO workspaces (id, user_id, name, panel_states) VALUES ($1, $2, $3, $4) RETURNING {WORKSPACE_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&name)
        .bind(Json(PanelStates::default()))
        .fetch_one(pool)
        .await?;
    workspace_from_row(&row)
}

/// Fetch one workspace owned by `user_id`.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] when absent or owned by someone else.
pub async fn get_workspace(pool: &PgPool, user_id: Uuid, workspace_id: Uuid) -> Result<Workspace, StoreError> {
    let sql = format!("SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE id = $1 AND user_id = $2");
    let row = sqlx::query(&sql)
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound)?;
    workspace_from_row(&row)
}

/// List the caller's workspaces, most recently updated first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_workspaces(pool: &PgPool, user_id: Uuid) -> Result<Vec<Workspace>, StoreError> {
    let sql = format!("SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE user_id = $1 ORDER BY updated_at DESC");
    let rows = sqlx::query(&sql).bind(user_id).fetch_all(pool).await?;
    rows.iter().map(workspace_from_row).collect()
}

/// Apply a partial update and bump `updated_at`.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] for a blank name, [`StoreError::NotFound`]
/// for a foreign or missing workspace, or a database error.
pub async fn update_workspace(
    pool: &PgPool,
    user_id: Uuid,
    workspace_id: Uuid,
    patch: &WorkspacePatch,
) -> Result<Workspace, StoreError> {
    let name = patch
        .name
        .as_deref()
        .map(|n| clean_text("name", n, NAME_MAX_CHARS))
        .transpose()?;
    let sql = format!(
        "UPDATE workspaces
         SET name = COALESCE($3, name),
             panel_states = COALESCE($4, panel_states),
             updated_at = now()
         WHERE id = $1 AND user_id = $2
         RETURNING {WORKSPACE_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(workspace_id)
        .bind(user_id)
        .bind(name)
        .bind(patch.panel_states.map(Json))
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound)?;
    workspace_from_row(&row)
}

/// Delete a workspace and, by cascade, its messages and diagrams.
///
/// # Errors
///
/// Returns a database error if the delete fails.
pub async fn delete_workspace(pool: &PgPool, user_id: Uuid, workspace_id: Uuid) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM workspaces WHERE id = $1 AND user_id = $2")
        .bind(workspace_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Fail with [`StoreError::NotFound`] unless the caller owns the workspace.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] or a database error.
pub async fn ensure_workspace(pool: &PgPool, user_id: Uuid, workspace_id: Uuid) -> Result<(), StoreError> {
    let owned: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM workspaces WHERE id = $1 AND user_id = $2)")
        .bind(workspace_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    if owned { Ok(()) } else { Err(StoreError::NotFound) }
}

// =============================================================================
// MESSAGES
// =============================================================================

/// Append a message to a panel conversation and bump the workspace.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] for a foreign workspace or a database
/// error.
pub async fn create_message(
    pool: &PgPool,
    user_id: Uuid,
    workspace_id: Uuid,
    panel: Panel,
    role: Role,
    content: &str,
) -> Result<ChatMessage, StoreError> {
    let mut tx = pool.begin().await?;
    let touched = sqlx::query("UPDATE workspaces SET updated_at = now() WHERE id = $1 AND user_id = $2")
        .bind(workspace_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    if touched.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    let sql = format!(
        "INSERT INTO messages (id, workspace_id, panel_type, role, content)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {MESSAGE_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(Uuid::new_v4())
        .bind(workspace_id)
        .bind(panel.as_str())
        .bind(role.as_str())
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;
    message_from_row(&row)
}

/// List a panel's conversation, oldest first.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] for a foreign workspace or a database
/// error.
pub async fn list_messages(
    pool: &PgPool,
    user_id: Uuid,
    workspace_id: Uuid,
    panel: Panel,
) -> Result<Vec<ChatMessage>, StoreError> {
    ensure_workspace(pool, user_id, workspace_id).await?;
    let sql = format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages
         WHERE workspace_id = $1 AND panel_type = $2
         ORDER BY created_at ASC, id ASC"
    );
    let rows = sqlx::query(&sql)
        .bind(workspace_id)
        .bind(panel.as_str())
        .fetch_all(pool)
        .await?;
    rows.iter().map(message_from_row).collect()
}

// =============================================================================
// DIAGRAMS
// =============================================================================

/// Persist a generated diagram.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] for a foreign workspace or a database
/// error.
pub async fn create_diagram(pool: &PgPool, user_id: Uuid, diagram: NewDiagram<'_>) -> Result<Diagram, StoreError> {
    let sql = format!(
        "INSERT INTO diagrams (id, workspace_id, prompt, mermaid_code)
         SELECT $1, w.id, $3, $4 FROM workspaces w WHERE w.id = $2 AND w.user_id = $5
         RETURNING {DIAGRAM_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(Uuid::new_v4())
        .bind(diagram.workspace_id)
        .bind(diagram.prompt)
        .bind(diagram.mermaid_code)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound)?;
    diagram_from_row(&row)
}

/// List a workspace's diagrams, newest first.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] for a foreign workspace or a database
/// error.
pub async fn list_diagrams(pool: &PgPool, user_id: Uuid, workspace_id: Uuid) -> Result<Vec<Diagram>, StoreError> {
    ensure_workspace(pool, user_id, workspace_id).await?;
    let sql = format!("SELECT {DIAGRAM_COLUMNS} FROM diagrams WHERE workspace_id = $1 ORDER BY created_at DESC, id DESC");
    let rows = sqlx::query(&sql).bind(workspace_id).fetch_all(pool).await?;
    rows.iter().map(diagram_from_row).collect()
}

/// Delete a diagram in one of the caller's workspaces.
///
/// # Errors
///
/// Returns a database error if the delete fails.
pub async fn delete_diagram(pool: &PgPool, user_id: Uuid, diagram_id: Uuid) -> Result<bool, StoreError> {
    let result = sqlx::query(
        "DELETE FROM diagrams d USING workspaces w
         WHERE d.id = $1 AND d.workspace_id = w.id AND w.user_id = $2",
    )
    .bind(diagram_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

// =============================================================================
// REMINDERS
// =============================================================================

/// Create a reminder, optionally linked to one of the caller's workspaces.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] for a blank title, [`StoreError::NotFound`]
/// for a foreign workspace, or a database error.
pub async fn create_reminder(pool: &PgPool, user_id: Uuid, reminder: &NewReminder) -> Result<Reminder, StoreError> {
    let title = clean_text("title", &reminder.title, NAME_MAX_CHARS)?;
    if let Some(workspace_id) = reminder.workspace_id {
        ensure_workspace(pool, user_id, workspace_id).await?;
    }
    let description = reminder
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let sql = format!(
        "INSERT INTO reminders (id, user_id, workspace_id, title, description, reminder_date)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {REMINDER_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(reminder.workspace_id)
        .bind(&title)
        .bind(description)
        .bind(reminder.reminder_date)
        .fetch_one(pool)
        .await?;
    reminder_from_row(&row)
}

/// List the caller's reminders by due date.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_reminders(pool: &PgPool, user_id: Uuid) -> Result<Vec<Reminder>, StoreError> {
    let sql = format!("SELECT {REMINDER_COLUMNS} FROM reminders WHERE user_id = $1 ORDER BY reminder_date ASC, id ASC");
    let rows = sqlx::query(&sql).bind(user_id).fetch_all(pool).await?;
    rows.iter().map(reminder_from_row).collect()
}

/// Mark a reminder completed or open again.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] for a foreign or missing reminder, or a
/// database error.
pub async fn set_reminder_completed(
    pool: &PgPool,
    user_id: Uuid,
    reminder_id: Uuid,
    completed: bool,
) -> Result<Reminder, StoreError> {
    let sql = format!("UPDATE reminders SET completed = $3 WHERE id = $1 AND user_id = $2 RETURNING {REMINDER_COLUMNS}");
    let row = sqlx::query(&sql)
        .bind(reminder_id)
        .bind(user_id)
        .bind(completed)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound)?;
    reminder_from_row(&row)
}

/// Delete one of the caller's reminders.
///
/// # Errors
///
/// Returns a database error if the delete fails.
pub async fn delete_reminder(pool: &PgPool, user_id: Uuid, reminder_id: Uuid) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM reminders WHERE id = $1 AND user_id = $2")
        .bind(reminder_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
