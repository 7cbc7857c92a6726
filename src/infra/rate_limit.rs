use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use redis::{Script, aio::ConnectionManager};
use uuid::Uuid;

use super::InfraError;

/// Key prefix for waitlist submission buckets.
pub const WAITLIST_PREFIX: &str = "ratelimit:waitlist";

/// Admitted requests per window and the window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u64,
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_requests: 3,
            window: Duration::from_secs(60),
        }
    }
}

/// Outcome of one rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Admission without counting, used when limiting is off or its store failed.
    pub fn unlimited(policy: RateLimitPolicy, now: DateTime<Utc>) -> Self {
        Self {
            allowed: true,
            limit: policy.max_requests,
            remaining: policy.max_requests,
            reset_at: now,
        }
    }
}

/// Trait for rate limiting implementations.
#[async_trait]
pub trait RateLimiterTrait: Send + Sync {
    /// Count a request for `key` and report whether it is admitted.
    ///
    /// Never fails: implementations decide how to treat their own store errors.
    async fn check(&self, key: &str) -> RateLimitDecision;

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Always admits. Selected when no Redis URL is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRateLimiter {
    policy: RateLimitPolicy,
}

impl DisabledRateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl RateLimiterTrait for DisabledRateLimiter {
    async fn check(&self, _key: &str) -> RateLimitDecision {
        RateLimitDecision::unlimited(self.policy, Utc::now())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Lua script for an atomic sliding-window check over a sorted set.
/// Scores are millisecond timestamps. Returns {allowed, count, reset_ms}.
/// Rejected requests are not recorded, so a blocked client regains access
/// once its oldest admitted request leaves the window.
const SLIDING_WINDOW_SCRIPT: &str = r#"
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local limit = tonumber(ARGV[3])
redis.call('ZREMRANGEBYSCORE', KEYS[1], '-inf', now - window)
local count = redis.call('ZCARD', KEYS[1])
local allowed = 0
if count < limit then
    redis.call('ZADD', KEYS[1], now, ARGV[4])
    count = count + 1
    allowed = 1
end
redis.call('PEXPIRE', KEYS[1], window)
local reset = now + window
local oldest = redis.call('ZRANGE', KEYS[1], 0, 0, 'WITHSCORES')
if oldest[2] then
    reset = tonumber(oldest[2]) + window
end
return {allowed, count, reset}
"#;

/// Redis-backed sliding-window limiter for production use.
#[derive(Clone)]
pub struct RedisRateLimiter {
    manager: ConnectionManager,
    policy: RateLimitPolicy,
    prefix: &'static str,
    script: Script,
}

impl RedisRateLimiter {
    pub async fn new(
        redis_url: &str,
        policy: RateLimitPolicy,
        prefix: &'static str,
    ) -> Result<Self, InfraError> {
        let client = redis::Client::open(redis_url).map_err(InfraError::RedisConnection)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(InfraError::RedisConnection)?;
        Ok(Self {
            manager,
            policy,
            prefix,
            script: Script::new(SLIDING_WINDOW_SCRIPT),
        })
    }

    async fn run_script(&self, key: &str, now_ms: i64) -> redis::RedisResult<(i64, i64, i64)> {
        let mut conn = self.manager.clone();
        self.script
            .key(format!("{}:{key}", self.prefix))
            .arg(now_ms)
            .arg(window_millis(self.policy.window))
            .arg(self.policy.max_requests)
            .arg(format!("{now_ms}-{}", Uuid::new_v4()))
            .invoke_async(&mut conn)
            .await
    }
}

#[async_trait]
impl RateLimiterTrait for RedisRateLimiter {
    async fn check(&self, key: &str) -> RateLimitDecision {
        let now = Utc::now();
        let result = self.run_script(key, now.timestamp_millis()).await;
        script_decision(self.policy, now, key, result)
    }
}

/// Turns the script reply `{allowed, count, reset_ms}` into a decision.
/// A store error admits the request.
fn script_decision(
    policy: RateLimitPolicy,
    now: DateTime<Utc>,
    key: &str,
    result: redis::RedisResult<(i64, i64, i64)>,
) -> RateLimitDecision {
    match result {
        Ok((allowed, count, reset_ms)) => {
            let count = u64::try_from(count).unwrap_or(0);
            RateLimitDecision {
                allowed: allowed == 1,
                limit: policy.max_requests,
                remaining: policy.max_requests.saturating_sub(count),
                reset_at: Utc.timestamp_millis_opt(reset_ms).single().unwrap_or(now),
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, key = key, "Rate limit store unavailable, admitting request");
            RateLimitDecision::unlimited(policy, now)
        }
    }
}

pub fn window_millis(window: Duration) -> i64 {
    i64::try_from(window.as_millis()).unwrap_or(i64::MAX)
}
