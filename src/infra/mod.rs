use std::sync::Arc;

use crate::{adapters::persistence::PostgresPersistence, infra::db::LazyPgPool};

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod http_client;
pub mod rate_limit;
pub mod setup;

pub use error::InfraError;
pub use rate_limit::RateLimiterTrait;

pub fn postgres_persistence(config: &config::AppConfig) -> PostgresPersistence {
    let pool = LazyPgPool::new(
        config.database_url.clone(),
        config.database_max_connections,
    );
    PostgresPersistence::new(Arc::new(pool))
}
