pub mod entry_status;
pub mod waitlist_entry;
