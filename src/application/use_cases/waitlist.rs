use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::validators::{WaitlistForm, validate_waitlist_form},
    domain::entities::{
        entry_status::EntryStatus,
        waitlist_entry::{EntryMetadata, WaitlistEntry, WaitlistStats},
    },
};

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait WaitlistRepo: Send + Sync {
    /// Whether the backing store has the configuration it needs to connect.
    fn is_configured(&self) -> bool;

    /// Insert a new `pending` entry. Must fail with `AppError::DuplicateEmail`
    /// when the email is already stored, whatever that entry's status.
    async fn create_entry(
        &self,
        form: &WaitlistForm,
        metadata: Option<&EntryMetadata>,
    ) -> AppResult<Uuid>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<WaitlistEntry>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<WaitlistEntry>>;

    /// Returns true iff a row was modified.
    async fn update_status(&self, id: Uuid, status: EntryStatus) -> AppResult<bool>;

    /// One page ordered by `created_at` descending, plus the filtered total.
    async fn list_entries(&self, query: &ListEntriesQuery) -> AppResult<(Vec<WaitlistEntry>, i64)>;

    /// Grouped `(status, count)` rows.
    async fn count_by_status(&self) -> AppResult<Vec<(EntryStatus, i64)>>;
}

// ============================================================================
// Query / Result Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListEntriesQuery {
    pub page: u32,
    pub limit: u32,
    pub status: Option<EntryStatus>,
}

impl Default for ListEntriesQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            status: None,
        }
    }
}

impl ListEntriesQuery {
    pub fn new(page: Option<u32>, limit: Option<u32>, status: Option<EntryStatus>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            status,
        }
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPage {
    pub entries: Vec<WaitlistEntry>,
    pub total: i64,
    pub page: u32,
    pub total_pages: i64,
}

pub fn total_pages(total: i64, limit: u32) -> i64 {
    let limit = i64::from(limit.max(1));
    (total + limit - 1) / limit
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct WaitlistUseCases {
    repo: Arc<dyn WaitlistRepo>,
}

impl WaitlistUseCases {
    pub fn new(repo: Arc<dyn WaitlistRepo>) -> Self {
        Self { repo }
    }

    /// Full submission path after rate limiting: configuration check, body
    /// parsing, validation, then insert. Short-circuits on the first failure.
    #[instrument(skip(self, body, metadata))]
    pub async fn submit(&self, body: &[u8], metadata: EntryMetadata) -> AppResult<Uuid> {
        if !self.repo.is_configured() {
            tracing::error!("Waitlist storage is not configured (DATABASE_URL missing)");
            return Err(AppError::Configuration("DATABASE_URL is not set".into()));
        }

        let raw: serde_json::Value =
            serde_json::from_slice(body).map_err(|_| AppError::MalformedRequest)?;

        let form = validate_waitlist_form(&raw).map_err(AppError::Validation)?;

        let metadata = (!metadata.is_empty()).then_some(metadata);
        let id = self.create_entry(&form, metadata.as_ref()).await?;

        tracing::info!(entry_id = %id, email = %form.email, "Waitlist entry created");
        Ok(id)
    }

    pub async fn create_entry(
        &self,
        form: &WaitlistForm,
        metadata: Option<&EntryMetadata>,
    ) -> AppResult<Uuid> {
        self.repo.create_entry(form, metadata).await
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<WaitlistEntry>> {
        self.repo
            .find_by_email(&email.trim().to_lowercase())
            .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<WaitlistEntry>> {
        self.repo.find_by_id(id).await
    }

    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, id: Uuid, status: EntryStatus) -> AppResult<bool> {
        let modified = self.repo.update_status(id, status).await?;
        if modified {
            tracing::info!(entry_id = %id, status = %status, "Waitlist entry status changed");
        }
        Ok(modified)
    }

    /// Soft delete: the entry is marked `declined` and kept.
    pub async fn delete_entry(&self, id: Uuid) -> AppResult<bool> {
        self.update_status(id, EntryStatus::Declined).await
    }

    pub async fn list_entries(&self, query: ListEntriesQuery) -> AppResult<EntryPage> {
        let (entries, total) = self.repo.list_entries(&query).await?;
        Ok(EntryPage {
            entries,
            total,
            page: query.page,
            total_pages: total_pages(total, query.limit),
        })
    }

    pub async fn stats(&self) -> AppResult<WaitlistStats> {
        let counts = self.repo.count_by_status().await?;
        Ok(WaitlistStats::from_counts(counts))
    }
}
