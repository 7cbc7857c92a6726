use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::{PostgresPersistence, parse_json_with_fallback},
    app_error::AppResult,
    application::{
        use_cases::waitlist::{ListEntriesQuery, WaitlistRepo},
        validators::WaitlistForm,
    },
    domain::entities::{
        entry_status::EntryStatus,
        waitlist_entry::{EntryMetadata, WAITLIST_SOURCE, WaitlistEntry, default_tags},
    },
};

const ENTRY_COLUMNS: &str =
    "id, name, email, company, position, tags, source, status, created_at, updated_at, metadata";

fn row_to_entry(row: sqlx::postgres::PgRow) -> WaitlistEntry {
    let id: Uuid = row.get("id");
    let status: String = row.get("status");
    let metadata: Option<serde_json::Value> = row.get("metadata");
    let metadata: Option<EntryMetadata> = parse_json_with_fallback(
        &metadata.unwrap_or(serde_json::Value::Null),
        "metadata",
        "waitlist_entry",
        &id.to_string(),
    );

    WaitlistEntry {
        id,
        name: row.get("name"),
        email: row.get("email"),
        company: row.get("company"),
        position: row.get("position"),
        tags: row.get("tags"),
        source: row.get("source"),
        status: EntryStatus::from_db(&status),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        metadata,
    }
}

#[async_trait]
impl WaitlistRepo for PostgresPersistence {
    fn is_configured(&self) -> bool {
        PostgresPersistence::is_configured(self)
    }

    async fn create_entry(
        &self,
        form: &WaitlistForm,
        metadata: Option<&EntryMetadata>,
    ) -> AppResult<Uuid> {
        let pool = self.pool().await?;
        let metadata = metadata.map(sqlx::types::Json);

        let row = sqlx::query(
            r#"
            INSERT INTO waitlist_entries (name, email, company, position, tags, source, status, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&form.name)
        .bind(form.email.to_lowercase())
        .bind(&form.company)
        .bind(&form.position)
        .bind(default_tags())
        .bind(WAITLIST_SOURCE)
        .bind(EntryStatus::Pending.as_str())
        .bind(metadata)
        .fetch_one(pool)
        .await?;

        Ok(row.get("id"))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<WaitlistEntry>> {
        let pool = self.pool().await?;
        let row = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM waitlist_entries WHERE email = $1"
        ))
        .bind(email.to_lowercase())
        .fetch_optional(pool)
        .await?;

        Ok(row.map(row_to_entry))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<WaitlistEntry>> {
        let pool = self.pool().await?;
        let row = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM waitlist_entries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(row_to_entry))
    }

    async fn update_status(&self, id: Uuid, status: EntryStatus) -> AppResult<bool> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            "UPDATE waitlist_entries SET status = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_entries(&self, query: &ListEntriesQuery) -> AppResult<(Vec<WaitlistEntry>, i64)> {
        let pool = self.pool().await?;
        let status = query.status.map(|s| s.as_str());

        let entries_sql = format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM waitlist_entries
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let entries = sqlx::query(&entries_sql)
            .bind(status)
            .bind(i64::from(query.limit))
            .bind(query.offset())
            .fetch_all(pool);

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM waitlist_entries WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(pool);

        let (rows, total) = tokio::try_join!(entries, total)?;

        Ok((rows.into_iter().map(row_to_entry).collect(), total))
    }

    async fn count_by_status(&self) -> AppResult<Vec<(EntryStatus, i64)>> {
        let pool = self.pool().await?;
        let rows = sqlx::query(
            "SELECT status, COUNT(*) AS count FROM waitlist_entries GROUP BY status",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let status: String = row.get("status");
                (EntryStatus::from_db(&status), row.get::<i64, _>("count"))
            })
            .collect())
    }
}
