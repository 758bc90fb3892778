use std::sync::Arc;

use fusion::llm::{LlmChat, LlmClient};
use fusion::{db, routes, state};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let pool = db::init_pool(&database_url)
        .await
        .expect("database init failed");

    // Non-fatal: AI panels answer 503 until a provider is configured.
    let llm: Option<Arc<dyn LlmChat>> = match LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client) as Arc<dyn LlmChat>)
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured; AI panels disabled");
            None
        }
    };

    let state = state::AppState::new(pool, llm);
    tracing::info!(config = ?state.rate_limiter.config(), "rate limiter ready");

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "fusion listening");
    axum::serve(listener, app).await.expect("server failed");
}
