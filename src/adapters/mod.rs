pub mod crm;
pub mod http;
pub mod persistence;
