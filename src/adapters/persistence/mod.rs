use std::sync::Arc;

use sqlx::{PgPool, error::ErrorKind};

use crate::{
    app_error::{AppError, AppResult},
    infra::db::LazyPgPool,
};

pub mod schema;
pub mod waitlist_entry;

const MAX_JSON_LOG_LEN: usize = 200;

/// Parse JSON value to target type, logging warning on failure.
///
/// Handles NULL gracefully (returns default without logging).
/// Only logs warnings for actual parse failures (type mismatches, corruption).
pub fn parse_json_with_fallback<T: serde::de::DeserializeOwned + Default>(
    json: &serde_json::Value,
    field_name: &str,
    entity_type: &str,
    entity_id: &str,
) -> T {
    // SQL NULL becomes Value::Null - treat as valid empty state, no warning
    if json.is_null() {
        return T::default();
    }

    serde_json::from_value(json.clone()).unwrap_or_else(|err| {
        // Truncate raw JSON to prevent log bloat
        let raw_str = json.to_string();
        let truncated = if raw_str.len() > MAX_JSON_LOG_LEN {
            let mut end = MAX_JSON_LOG_LEN;
            while !raw_str.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &raw_str[..end])
        } else {
            raw_str
        };

        tracing::warn!(
            field = field_name,
            entity_type = entity_type,
            entity_id = entity_id,
            raw_json = %truncated,
            error = %err,
            "Failed to parse JSON field, using default value"
        );
        T::default()
    })
}

/// Postgres-backed persistence. The pool is shared and connected lazily.
#[derive(Clone)]
pub struct PostgresPersistence {
    pool: Arc<LazyPgPool>,
}

impl PostgresPersistence {
    pub fn new(pool: Arc<LazyPgPool>) -> Self {
        PostgresPersistence { pool }
    }

    pub fn is_configured(&self) -> bool {
        self.pool.is_configured()
    }

    pub async fn pool(&self) -> AppResult<&PgPool> {
        self.pool.get().await
    }
}

/// The single place where raw storage errors become domain error kinds.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                    if db_err.constraint() == Some(schema::EMAIL_UNIQUE_INDEX) =>
                {
                    AppError::DuplicateEmail
                }
                _ => {
                    tracing::error!(error = ?err, "Database error");
                    AppError::Database("Database operation failed".into())
                }
            },
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => {
                tracing::error!(error = %err, "Database unreachable");
                AppError::PersistenceUnavailable("Database unreachable".into())
            }
            _ => {
                tracing::error!(error = ?err, "Database error");
                AppError::Database("Database operation failed".into())
            }
        }
    }
}
