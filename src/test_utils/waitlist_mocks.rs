//! In-memory mock implementations for the waitlist storage, rate-limit and
//! CRM ports.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        use_cases::{
            conversion::{ConversionLead, ConversionSink},
            waitlist::{ListEntriesQuery, WaitlistRepo},
        },
        validators::WaitlistForm,
    },
    domain::entities::{
        entry_status::EntryStatus,
        waitlist_entry::{EntryMetadata, WAITLIST_SOURCE, WaitlistEntry, default_tags},
    },
    infra::rate_limit::{RateLimitDecision, RateLimitPolicy, RateLimiterTrait},
};

// ============================================================================
// InMemoryWaitlistRepo
// ============================================================================

/// In-memory implementation of WaitlistRepo for testing.
/// Enforces the same unique-email rule as the storage index.
pub struct InMemoryWaitlistRepo {
    pub entries: Mutex<HashMap<Uuid, WaitlistEntry>>,
    configured: bool,
}

impl Default for InMemoryWaitlistRepo {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            configured: true,
        }
    }
}

impl InMemoryWaitlistRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behaves as if no database connection string was provided.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::default()
        }
    }

    /// Seed the repo with initial entries for testing.
    pub fn with_entries(entries: Vec<WaitlistEntry>) -> Self {
        Self {
            entries: Mutex::new(entries.into_iter().map(|e| (e.id, e)).collect()),
            configured: true,
        }
    }

    /// Get all entries (for test assertions).
    pub fn get_all(&self) -> Vec<WaitlistEntry> {
        self.entries.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl WaitlistRepo for InMemoryWaitlistRepo {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn create_entry(
        &self,
        form: &WaitlistForm,
        metadata: Option<&EntryMetadata>,
    ) -> AppResult<Uuid> {
        let mut entries = self.entries.lock().unwrap();
        let email = form.email.to_lowercase();

        if entries.values().any(|e| e.email == email) {
            return Err(AppError::DuplicateEmail);
        }

        let now = Utc::now();
        let entry = WaitlistEntry {
            id: Uuid::new_v4(),
            name: form.name.clone(),
            email,
            company: form.company.clone(),
            position: form.position.clone(),
            tags: default_tags(),
            source: WAITLIST_SOURCE.to_string(),
            status: EntryStatus::Pending,
            created_at: now,
            updated_at: now,
            metadata: metadata.cloned(),
        };
        let id = entry.id;
        entries.insert(id, entry);
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<WaitlistEntry>> {
        let email = email.to_lowercase();
        Ok(self
            .entries
            .lock()
            .unwrap()
            .values()
            .find(|e| e.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<WaitlistEntry>> {
        Ok(self.entries.lock().unwrap().get(&id).cloned())
    }

    async fn update_status(&self, id: Uuid, status: EntryStatus) -> AppResult<bool> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(&id) {
            Some(entry) => {
                entry.status = status;
                entry.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_entries(&self, query: &ListEntriesQuery) -> AppResult<(Vec<WaitlistEntry>, i64)> {
        let mut matching: Vec<WaitlistEntry> = self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| query.status.is_none_or(|s| e.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn count_by_status(&self) -> AppResult<Vec<(EntryStatus, i64)>> {
        let mut counts: HashMap<EntryStatus, i64> = HashMap::new();
        for entry in self.entries.lock().unwrap().values() {
            *counts.entry(entry.status).or_insert(0) += 1;
        }
        Ok(counts.into_iter().collect())
    }
}

// ============================================================================
// InMemoryRateLimiter
// ============================================================================

/// In-memory sliding-window rate limiter for testing.
/// Keeps the admitted timestamps per key, like the sorted set in Redis.
pub struct InMemoryRateLimiter {
    hits: Mutex<HashMap<String, VecDeque<DateTime<Utc>>>>,
    policy: RateLimitPolicy,
}

impl InMemoryRateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            hits: Mutex::new(HashMap::new()),
            policy,
        }
    }

    /// Create a permissive rate limiter that never blocks (for most tests).
    pub fn permissive() -> Self {
        Self::new(RateLimitPolicy {
            max_requests: u64::MAX,
            ..RateLimitPolicy::default()
        })
    }

    /// Check `key` as if the current time were `now`.
    pub fn check_at(&self, key: &str, now: DateTime<Utc>) -> RateLimitDecision {
        let window = chrono::Duration::from_std(self.policy.window)
            .unwrap_or_else(|_| chrono::Duration::days(1));
        let mut hits = self.hits.lock().unwrap();
        let bucket = hits.entry(key.to_string()).or_default();

        while bucket.front().is_some_and(|t| *t <= now - window) {
            bucket.pop_front();
        }

        let allowed = (bucket.len() as u64) < self.policy.max_requests;
        if allowed {
            bucket.push_back(now);
        }

        RateLimitDecision {
            allowed,
            limit: self.policy.max_requests,
            remaining: self.policy.max_requests.saturating_sub(bucket.len() as u64),
            reset_at: bucket.front().map_or(now + window, |oldest| *oldest + window),
        }
    }
}

#[async_trait]
impl RateLimiterTrait for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Utc::now())
    }
}

// ============================================================================
// InMemoryConversionSink
// ============================================================================

/// Records conversions instead of calling RD Station.
pub struct InMemoryConversionSink {
    sent: Mutex<Vec<ConversionLead>>,
    configured: bool,
    event_uuid: String,
    upstream_failure: Option<(u16, serde_json::Value)>,
}

impl Default for InMemoryConversionSink {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            configured: true,
            event_uuid: "5408c5a3-4711-4f2e-8d0e-5f5b8b3c9a21".to_string(),
            upstream_failure: None,
        }
    }
}

impl InMemoryConversionSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behaves as if no access token was provided.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::default()
        }
    }

    /// Every send fails with the given upstream status and body.
    pub fn rejecting(status: u16, body: serde_json::Value) -> Self {
        Self {
            upstream_failure: Some((status, body)),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<ConversionLead> {
        self.sent.lock().unwrap().clone()
    }

    pub fn event_uuid(&self) -> String {
        self.event_uuid.clone()
    }
}

#[async_trait]
impl ConversionSink for InMemoryConversionSink {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn send_conversion(&self, lead: &ConversionLead) -> AppResult<String> {
        if let Some((status, body)) = &self.upstream_failure {
            return Err(AppError::Upstream {
                status: *status,
                body: body.clone(),
            });
        }
        self.sent.lock().unwrap().push(lead.clone());
        Ok(self.event_uuid.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn three_per_minute() -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitPolicy {
            max_requests: 3,
            window: Duration::from_secs(60),
        })
    }

    #[test]
    fn fourth_request_in_window_is_rejected() {
        let limiter = three_per_minute();
        let now = Utc::now();

        let remaining: Vec<u64> = (0..3)
            .map(|i| {
                let d = limiter.check_at("1.2.3.4", now + chrono::Duration::seconds(i));
                assert!(d.allowed);
                d.remaining
            })
            .collect();
        assert_eq!(remaining, vec![2, 1, 0]);

        let blocked = limiter.check_at("1.2.3.4", now + chrono::Duration::seconds(10));
        assert!(!blocked.allowed);
        assert_eq!(blocked.remaining, 0);
        assert_eq!(blocked.reset_at, now + chrono::Duration::seconds(60));
    }

    #[test]
    fn window_slides_past_oldest_request() {
        let limiter = three_per_minute();
        let now = Utc::now();
        for i in 0..3 {
            assert!(limiter.check_at("k", now + chrono::Duration::seconds(i)).allowed);
        }
        assert!(!limiter.check_at("k", now + chrono::Duration::seconds(59)).allowed);
        assert!(limiter.check_at("k", now + chrono::Duration::seconds(61)).allowed);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = three_per_minute();
        let now = Utc::now();
        for _ in 0..3 {
            limiter.check_at("a", now);
        }
        assert!(!limiter.check_at("a", now).allowed);
        assert!(limiter.check_at("b", now).allowed);
    }

    #[tokio::test]
    async fn repo_rejects_duplicate_email_case_insensitively() {
        let repo = InMemoryWaitlistRepo::new();
        let form = crate::test_utils::create_test_form(|_| {});
        repo.create_entry(&form, None).await.unwrap();

        let upper = crate::test_utils::create_test_form(|f| f.email = f.email.to_uppercase());
        assert!(matches!(
            repo.create_entry(&upper, None).await,
            Err(AppError::DuplicateEmail)
        ));
    }
}
