use std::{convert::Infallible, net::SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{Extensions, HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};

use crate::{
    adapters::http::app_state::AppState, app_error::AppError,
    domain::entities::waitlist_entry::EntryMetadata,
};

const UNKNOWN_IP: &str = "unknown";

/// Sliding-window check keyed by client IP. Runs before the handler so a
/// rejected request never reaches validation or storage.
pub async fn rate_limit_middleware(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(request.headers(), connect_ip(request.extensions()));

    let decision = app_state.rate_limiter.check(&ip).await;

    tracing::debug!(
        using_ip = %ip,
        enabled = app_state.rate_limiter.is_enabled(),
        allowed = decision.allowed,
        remaining = decision.remaining,
        "Rate limiting request"
    );

    if !decision.allowed {
        return Err(AppError::RateLimited(decision));
    }

    Ok(next.run(request).await)
}

/// Socket peer address, present when served with connect info.
fn connect_ip(extensions: &Extensions) -> Option<String> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

/// First `X-Forwarded-For` entry, then `X-Real-IP`, then the socket peer.
pub fn client_ip(headers: &HeaderMap, connect_ip: Option<String>) -> String {
    forwarded_ip(headers)
        .or(connect_ip)
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let trimmed = first.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    if let Some(real) = headers.get("x-real-ip")
        && let Ok(val) = real.to_str()
        && !val.trim().is_empty()
    {
        return Some(val.trim().to_string());
    }
    None
}

/// Best-effort request context stored with a new entry.
pub fn request_metadata(headers: &HeaderMap, connect_ip: Option<String>) -> EntryMetadata {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    EntryMetadata {
        ip: Some(client_ip(headers, connect_ip)),
        user_agent: header_str(header::USER_AGENT),
        referrer: header_str(header::REFERER),
        language: header_str(header::ACCEPT_LANGUAGE),
    }
}

/// Request metadata extractor for handlers that store it.
pub struct RequestContext(pub EntryMetadata);

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestContext(request_metadata(
            &parts.headers,
            connect_ip(&parts.extensions),
        )))
    }
}

/// Proof that the request carried the configured admin bearer token.
pub struct AdminAccess;

impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.admin_api_token.as_ref() else {
            tracing::warn!("Admin route called but ADMIN_API_TOKEN is not set");
            return Err(AppError::Unauthorized);
        };

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized)?;

        if token_digest(bearer.token()) != token_digest(expected.expose_secret()) {
            return Err(AppError::Unauthorized);
        }

        Ok(AdminAccess)
    }
}

fn token_digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}
