use std::{net::SocketAddr, time::Duration};

use axum::http::HeaderValue;
use env_helpers::get_env_default;
use secrecy::SecretString;
use url::Url;

use super::{InfraError, rate_limit::RateLimitPolicy};

pub const DEFAULT_CONVERSION_IDENTIFIER: &str = "waitlist-56d72e81421d39240aa9";
pub const DEFAULT_RDSTATION_API_URL: &str = "https://api.rd.services";
pub const DEFAULT_CORS_ORIGINS: &str =
    "https://www.zenithestrategia.com.br,https://zenithestrategia.com.br";

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<HeaderValue>,
    /// Absent is tolerated at startup; submissions then answer with a configuration error.
    pub database_url: Option<SecretString>,
    pub database_max_connections: u32,
    /// Absent disables rate limiting.
    pub redis_url: Option<SecretString>,
    pub rate_limit: RateLimitPolicy,
    pub rdstation_access_token: Option<SecretString>,
    pub rdstation_conversion_identifier: String,
    pub rdstation_api_url: Url,
    /// Bearer token for the administrative routes. Absent keeps them closed.
    pub admin_api_token: Option<SecretString>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let bind_addr: SocketAddr = optional_env("BIND_ADDR")
            .map(|raw| raw.parse())
            .transpose()
            .map_err(|_| InfraError::ConfigInvalid { var: "BIND_ADDR" })?
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3001)));

        let cors_origins = parse_origins(
            &optional_env("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string()),
        )?;

        let database_url = optional_secret("DATABASE_URL");
        let database_max_connections: u32 = get_env_default("DATABASE_MAX_CONNECTIONS", 5);

        let redis_url = optional_secret("REDIS_URL");
        let rate_limit_max_requests: u64 = get_env_default("RATE_LIMIT_MAX_REQUESTS", 3);
        let rate_limit_window_secs: u64 = get_env_default("RATE_LIMIT_WINDOW_SECS", 60);

        let rdstation_access_token = optional_secret("RDSTATION_ACCESS_TOKEN");
        let rdstation_conversion_identifier = optional_env("RDSTATION_CONVERSION_IDENTIFIER")
            .unwrap_or_else(|| DEFAULT_CONVERSION_IDENTIFIER.to_string());
        let rdstation_api_url = parse_base_url(
            optional_env("RDSTATION_API_URL")
                .as_deref()
                .unwrap_or(DEFAULT_RDSTATION_API_URL),
            "RDSTATION_API_URL",
        )?;

        let admin_api_token = optional_secret("ADMIN_API_TOKEN");

        Ok(Self {
            bind_addr,
            cors_origins,
            database_url,
            database_max_connections,
            redis_url,
            rate_limit: RateLimitPolicy {
                max_requests: rate_limit_max_requests,
                window: Duration::from_secs(rate_limit_window_secs),
            },
            rdstation_access_token,
            rdstation_conversion_identifier,
            rdstation_api_url,
            admin_api_token,
        })
    }
}

/// Unset and blank variables are both treated as absent.
fn optional_env(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn optional_secret(var: &str) -> Option<SecretString> {
    optional_env(var).map(|v| SecretString::new(v.into()))
}

/// Parses a base URL whose path always ends with `/`, so relative joins
/// append to it instead of replacing its last segment.
pub fn parse_base_url(raw: &str, var: &'static str) -> Result<Url, InfraError> {
    let mut url: Url = raw.parse().map_err(|_| InfraError::ConfigInvalid { var })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

pub fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, InfraError> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|_| InfraError::ConfigInvalid { var: "CORS_ORIGINS" })
        })
        .collect()
}
