use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Lifecycle of a waitlist lead.
///
/// Entries start as `Pending`; every other transition is an administrative
/// action. `Declined` doubles as the soft-delete marker.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Pending,
    Contacted,
    Converted,
    Declined,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Parse a stored status, falling back to `Pending` for unknown values.
    pub fn from_db(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            tracing::warn!(status = raw, "Unknown waitlist status in storage");
            EntryStatus::Pending
        })
    }
}
