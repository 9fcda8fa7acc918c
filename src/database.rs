use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use sqlx::Sqlite;
use sqlx::SqlitePool;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::sqlite::SqlitePoolOptions;
use std::str::FromStr;

use crate::auth::user::SqliteCredentials;
use crate::state::AppState;

/// Opens the pool, creating the database file if it does not exist yet.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    SqlitePoolOptions::new().connect_with(options).await
}

/// Creates the users table. Safe to run on every startup.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username VARCHAR(50) NOT NULL UNIQUE CHECK (length(username) <= 50),
            password VARCHAR(128) NOT NULL CHECK (length(password) <= 128)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// A pooled connection owned by one request.
///
/// Acquired when the handler's arguments are extracted and returned to the
/// pool when the handler finishes, whichever way it exits.
pub struct DbConn(pub PoolConnection<Sqlite>);

impl DbConn {
    pub fn credentials(&mut self) -> SqliteCredentials<'_> {
        SqliteCredentials::new(&mut self.0)
    }
}

impl FromRequestParts<AppState> for DbConn {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match state.pool.acquire().await {
            Ok(conn) => Ok(DbConn(conn)),
            Err(e) => {
                tracing::error!("failed to acquire a database connection: {e}");
                Err((StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable"))
            }
        }
    }
}

#[cfg(test)]
pub async fn test_pool() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("should create a temp dir");
    let url = format!("sqlite://{}", dir.path().join("test.sqlite").display());
    let pool = connect(&url).await.expect("should open the test database");
    migrate(&pool).await.expect("should migrate the test database");
    (dir, pool)
}
