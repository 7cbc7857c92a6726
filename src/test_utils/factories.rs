//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    application::validators::WaitlistForm,
    domain::entities::{
        entry_status::EntryStatus,
        waitlist_entry::{WAITLIST_SOURCE, WaitlistEntry, default_tags},
    },
};

/// Create a stored waitlist entry with sensible defaults.
pub fn create_test_entry(overrides: impl FnOnce(&mut WaitlistEntry)) -> WaitlistEntry {
    let mut entry = WaitlistEntry {
        id: Uuid::new_v4(),
        name: "Maria Souza".to_string(),
        email: "maria@example.com".to_string(),
        company: "Acme Ltda".to_string(),
        position: "CEO".to_string(),
        tags: default_tags(),
        source: WAITLIST_SOURCE.to_string(),
        status: EntryStatus::Pending,
        created_at: test_datetime(),
        updated_at: test_datetime(),
        metadata: None,
    };
    overrides(&mut entry);
    entry
}

/// Create a form that passes every validation rule.
pub fn create_test_form(overrides: impl FnOnce(&mut WaitlistForm)) -> WaitlistForm {
    let mut form = WaitlistForm {
        name: "Maria Souza".to_string(),
        email: "maria@example.com".to_string(),
        company: "Acme Ltda".to_string(),
        position: "CEO".to_string(),
    };
    overrides(&mut form);
    form
}

/// Helper to create a consistent test datetime.
pub fn test_datetime() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}
