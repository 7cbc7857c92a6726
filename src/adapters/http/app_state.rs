use std::sync::Arc;

use crate::{
    infra::{RateLimiterTrait, config::AppConfig},
    use_cases::{conversion::ConversionUseCases, waitlist::WaitlistUseCases},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub waitlist_use_cases: Arc<WaitlistUseCases>,
    pub conversion_use_cases: Arc<ConversionUseCases>,
    pub rate_limiter: Arc<dyn RateLimiterTrait>,
}
