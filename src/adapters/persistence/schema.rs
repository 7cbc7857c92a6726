use sqlx::{PgPool, error::ErrorKind};

use crate::app_error::AppResult;

/// Unique index backing the one-entry-per-email rule.
pub const EMAIL_UNIQUE_INDEX: &str = "waitlist_entries_email_key";

/// SQLSTATE for `duplicate_table`.
const DUPLICATE_TABLE: &str = "42P07";

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS waitlist_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    company TEXT NOT NULL,
    position TEXT NOT NULL,
    tags TEXT[] NOT NULL DEFAULT '{}',
    source TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'contacted', 'converted', 'declined')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    metadata JSONB
)
"#;

/// (name, statement) pairs; each index is created independently.
const INDEXES: [(&str, &str); 4] = [
    (
        EMAIL_UNIQUE_INDEX,
        "CREATE UNIQUE INDEX IF NOT EXISTS waitlist_entries_email_key ON waitlist_entries (email)",
    ),
    (
        "waitlist_entries_status_idx",
        "CREATE INDEX IF NOT EXISTS waitlist_entries_status_idx ON waitlist_entries (status)",
    ),
    (
        "waitlist_entries_created_at_idx",
        "CREATE INDEX IF NOT EXISTS waitlist_entries_created_at_idx ON waitlist_entries (created_at DESC)",
    ),
    (
        "waitlist_entries_status_created_at_idx",
        "CREATE INDEX IF NOT EXISTS waitlist_entries_status_created_at_idx ON waitlist_entries (status, created_at DESC)",
    ),
];

/// Create the table if missing, then the indexes.
///
/// A failed table creation is returned; index failures are logged and
/// ignored so that startup and requests proceed. Losing a creation race
/// with another instance is retried once, when the table then exists.
pub async fn ensure_schema(pool: &PgPool) -> AppResult<()> {
    if let Err(err) = sqlx::query(CREATE_TABLE).execute(pool).await {
        if !is_concurrent_create(&err) {
            return Err(err.into());
        }
        tracing::debug!(error = %err, "Waitlist table created concurrently, re-checking");
        sqlx::query(CREATE_TABLE).execute(pool).await?;
    }

    for (name, statement) in INDEXES {
        if let Err(err) = sqlx::query(statement).execute(pool).await {
            tracing::warn!(index = name, error = %err, "Could not create index");
        }
    }

    tracing::info!("Waitlist schema ready");
    Ok(())
}

/// Concurrent `CREATE TABLE IF NOT EXISTS` can collide on the system
/// catalogs or find the relation created between its check and insert.
fn is_concurrent_create(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.kind(), ErrorKind::UniqueViolation)
                || db_err.code().as_deref() == Some(DUPLICATE_TABLE)
        }
        _ => false,
    }
}
