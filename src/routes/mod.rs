//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! A single JSON API under `/api`. Every route except registration, login,
//! and `/healthz` requires the session cookie, enforced by the
//! [`auth::AuthUser`] extractor.

pub mod ai;
pub mod auth;
pub mod diagrams;
pub mod reminders;
pub mod workspaces;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/workspaces",
            get(workspaces::list_workspaces).post(workspaces::create_workspace),
        )
        .route(
            "/api/workspaces/{id}",
            get(workspaces::get_workspace)
                .patch(workspaces::update_workspace)
                .delete(workspaces::delete_workspace),
        )
        .route("/api/workspaces/{id}/messages/{panel}", get(workspaces::list_messages))
        .route("/api/workspaces/{id}/diagrams", get(diagrams::list_diagrams))
        .route("/api/diagrams/{id}", delete(diagrams::delete_diagram))
        .route("/api/ai/coder", post(ai::coder))
        .route("/api/ai/tutor", post(ai::tutor))
        .route("/api/ai/artist", post(ai::artist))
        .route(
            "/api/reminders",
            get(reminders::list_reminders).post(reminders::create_reminder),
        )
        .route(
            "/api/reminders/{id}",
            patch(reminders::update_reminder).delete(reminders::delete_reminder),
        )
        .route("/healthz", get(healthz))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_helpers;

    #[tokio::test]
    async fn healthz_is_ok() {
        assert_eq!(healthz().await, StatusCode::OK);
    }

    #[tokio::test]
    async fn router_builds_with_lazy_state() {
        let _router = app(test_helpers::test_app_state());
    }
}
