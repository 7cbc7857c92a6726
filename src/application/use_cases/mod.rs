pub mod conversion;
pub mod waitlist;
