use secrecy::{ExposeSecret, SecretString};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::sync::OnceCell;
use tracing::info;

use crate::{
    adapters::persistence::schema::ensure_schema,
    app_error::{AppError, AppResult},
};

/// Process-wide Postgres pool, connected on first use.
///
/// Concurrent first callers wait on the same initialization and share the
/// resulting pool. A failed initialization leaves the cell empty so the next
/// request retries.
pub struct LazyPgPool {
    database_url: Option<SecretString>,
    max_connections: u32,
    pool: OnceCell<PgPool>,
}

impl LazyPgPool {
    pub fn new(database_url: Option<SecretString>, max_connections: u32) -> Self {
        Self {
            database_url,
            max_connections,
            pool: OnceCell::new(),
        }
    }

    /// Whether a connection string is available at all.
    pub fn is_configured(&self) -> bool {
        self.database_url.is_some()
    }

    pub async fn get(&self) -> AppResult<&PgPool> {
        self.pool
            .get_or_try_init(|| async {
                let url = self.database_url.as_ref().ok_or_else(|| {
                    AppError::Configuration("DATABASE_URL is not set".into())
                })?;
                let pool = init_db(url, self.max_connections).await?;
                ensure_schema(&pool).await?;
                Ok(pool)
            })
            .await
    }
}

pub async fn init_db(database_url: &SecretString, max_connections: u32) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url.expose_secret())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Postgres connection failed (check DATABASE_URL/password)");
            AppError::PersistenceUnavailable("Database connection failed".into())
        })?;

    info!("Connected to database!");
    Ok(pool)
}
