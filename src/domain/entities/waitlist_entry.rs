use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entry_status::EntryStatus;

/// Classification labels attached to every lead at creation.
pub const WAITLIST_TAGS: [&str; 3] = ["Waitlist", "Zenith Votuporanga", "Cliente Fundador"];

/// Origin channel recorded on every lead.
pub const WAITLIST_SOURCE: &str = "website";

/// Request context captured once, when the entry is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl EntryMetadata {
    pub fn is_empty(&self) -> bool {
        self.ip.is_none()
            && self.user_agent.is_none()
            && self.referrer.is_none()
            && self.language.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company: String,
    pub position: String,
    pub tags: Vec<String>,
    pub source: String,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EntryMetadata>,
}

pub fn default_tags() -> Vec<String> {
    WAITLIST_TAGS.iter().map(|t| t.to_string()).collect()
}

/// Per-status counts over the whole table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistStats {
    pub total: i64,
    pub pending: i64,
    pub contacted: i64,
    pub converted: i64,
    pub declined: i64,
}

impl WaitlistStats {
    /// Fold grouped `(status, count)` rows; statuses missing from the rows stay zero.
    pub fn from_counts(counts: impl IntoIterator<Item = (EntryStatus, i64)>) -> Self {
        let mut stats = Self::default();
        for (status, count) in counts {
            stats.total += count;
            match status {
                EntryStatus::Pending => stats.pending += count,
                EntryStatus::Contacted => stats.contacted += count,
                EntryStatus::Converted => stats.converted += count,
                EntryStatus::Declined => stats.declined += count,
            }
        }
        stats
    }
}
