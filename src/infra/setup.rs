use std::fs::File;
use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{crm::rd_station::RdStationClient, http::app_state::AppState},
    infra::{
        RateLimiterTrait,
        config::AppConfig,
        postgres_persistence,
        rate_limit::{DisabledRateLimiter, RedisRateLimiter, WAITLIST_PREFIX},
    },
    use_cases::{
        conversion::{ConversionSink, ConversionUseCases},
        waitlist::{WaitlistRepo, WaitlistUseCases},
    },
};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env()?;

    if config.database_url.is_none() {
        tracing::warn!("DATABASE_URL is not set; submissions will fail with a configuration error");
    }

    let waitlist_repo: Arc<dyn WaitlistRepo> = Arc::new(postgres_persistence(&config));

    let rate_limiter: Arc<dyn RateLimiterTrait> = match &config.redis_url {
        Some(redis_url) => Arc::new(
            RedisRateLimiter::new(redis_url.expose_secret(), config.rate_limit, WAITLIST_PREFIX)
                .await?,
        ),
        None => {
            tracing::warn!("REDIS_URL is not set; rate limiting is disabled");
            Arc::new(DisabledRateLimiter::new(config.rate_limit))
        }
    };

    let conversion_sink: Arc<dyn ConversionSink> = Arc::new(RdStationClient::new(
        config.rdstation_api_url.clone(),
        config.rdstation_access_token.clone(),
        config.rdstation_conversion_identifier.clone(),
    )?);

    Ok(AppState {
        config: Arc::new(config),
        waitlist_use_cases: Arc::new(WaitlistUseCases::new(waitlist_repo)),
        conversion_use_cases: Arc::new(ConversionUseCases::new(conversion_sink)),
        rate_limiter,
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "zenith_waitlist=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs); skipped when the file cannot be created
    let json_layer = match File::create("app.log") {
        Ok(file) => Some(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(true),
        ),
        Err(err) => {
            eprintln!("cannot create app.log, JSON logs disabled: {err}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
