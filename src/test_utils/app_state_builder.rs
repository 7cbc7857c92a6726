//! Test app state builder for HTTP-level integration testing.
//!
//! This module provides `TestAppStateBuilder` which creates a minimal `AppState`
//! with in-memory mocks for testing HTTP endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    application::use_cases::{
        conversion::{ConversionSink, ConversionUseCases},
        waitlist::{WaitlistRepo, WaitlistUseCases},
    },
    domain::entities::waitlist_entry::WaitlistEntry,
    infra::{
        RateLimiterTrait,
        config::{AppConfig, DEFAULT_CONVERSION_IDENTIFIER},
        rate_limit::RateLimitPolicy,
    },
    test_utils::{InMemoryConversionSink, InMemoryRateLimiter, InMemoryWaitlistRepo},
};

/// Admin token configured by default in test state.
pub const TEST_ADMIN_TOKEN: &str = "test-admin-token";

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let repo = Arc::new(InMemoryWaitlistRepo::new());
/// let app_state = TestAppStateBuilder::new()
///     .with_repo(repo.clone())
///     .with_rate_limit(RateLimitPolicy::default())
///     .build();
/// ```
pub struct TestAppStateBuilder {
    entries: Vec<WaitlistEntry>,
    repo: Option<Arc<dyn WaitlistRepo>>,
    conversion_sink: Option<Arc<dyn ConversionSink>>,
    rate_limiter: Option<Arc<dyn RateLimiterTrait>>,
    admin_token: Option<String>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            entries: vec![],
            repo: None,
            conversion_sink: None,
            rate_limiter: None,
            admin_token: Some(TEST_ADMIN_TOKEN.to_string()),
        }
    }

    /// Seed the default in-memory repo.
    pub fn with_entry(mut self, entry: WaitlistEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Use a specific repo (for assertions on stored state).
    pub fn with_repo(mut self, repo: Arc<dyn WaitlistRepo>) -> Self {
        self.repo = Some(repo);
        self
    }

    pub fn with_conversion_sink(mut self, sink: Arc<dyn ConversionSink>) -> Self {
        self.conversion_sink = Some(sink);
        self
    }

    /// Enforce a sliding-window limit instead of the permissive default.
    pub fn with_rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limiter = Some(Arc::new(InMemoryRateLimiter::new(policy)));
        self
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiterTrait>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Leave the admin token unset (administrative routes stay closed).
    pub fn without_admin_token(mut self) -> Self {
        self.admin_token = None;
        self
    }

    /// Build the AppState with all configured mocks.
    pub fn build(self) -> AppState {
        let repo: Arc<dyn WaitlistRepo> = self
            .repo
            .unwrap_or_else(|| Arc::new(InMemoryWaitlistRepo::with_entries(self.entries)));
        let conversion_sink: Arc<dyn ConversionSink> = self
            .conversion_sink
            .unwrap_or_else(|| Arc::new(InMemoryConversionSink::new()));
        let rate_limiter: Arc<dyn RateLimiterTrait> = self
            .rate_limiter
            .unwrap_or_else(|| Arc::new(InMemoryRateLimiter::permissive()));

        // Create minimal config for testing
        let config = Arc::new(AppConfig {
            bind_addr: "127.0.0.1:3001".parse::<SocketAddr>().unwrap(),
            cors_origins: vec![HeaderValue::from_static("http://localhost:3000")],
            database_url: Some(SecretString::from("postgres://test")),
            database_max_connections: 1,
            redis_url: None,
            rate_limit: RateLimitPolicy::default(),
            rdstation_access_token: Some(SecretString::from("test-rd-token")),
            rdstation_conversion_identifier: DEFAULT_CONVERSION_IDENTIFIER.to_string(),
            rdstation_api_url: Url::parse("http://localhost:9999").unwrap(),
            admin_api_token: self.admin_token.map(SecretString::from),
        });

        AppState {
            config,
            waitlist_use_cases: Arc::new(WaitlistUseCases::new(repo)),
            conversion_use_cases: Arc::new(ConversionUseCases::new(conversion_sink)),
            rate_limiter,
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
