//! Postgres pool and embedded schema.
//!
//! SYSTEM CONTEXT
//! ==============
//! `main` builds one pool at startup; it becomes the repository handle in
//! [`crate::state::AppState`] that every `services::store` call borrows.
//! Migrations under `src/db/migrations` are compiled in and applied before
//! the listener binds.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Pool size from a raw `DB_MAX_CONNECTIONS` value. Zero and garbage fall
/// back to the default.
fn parse_max_connections(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_MAX_CONNECTIONS)
}

/// Connect to Postgres and bring the schema up to date.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let max_connections = parse_max_connections(std::env::var("DB_MAX_CONNECTIONS").ok().as_deref());
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;
    tracing::info!(max_connections, "database ready");

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_connections_defaults_when_unset_or_invalid() {
        assert_eq!(parse_max_connections(None), DEFAULT_MAX_CONNECTIONS);
        assert_eq!(parse_max_connections(Some("0")), DEFAULT_MAX_CONNECTIONS);
        assert_eq!(parse_max_connections(Some("lots")), DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn max_connections_reads_positive_value() {
        assert_eq!(parse_max_connections(Some(" 12 ")), 12);
    }
}
