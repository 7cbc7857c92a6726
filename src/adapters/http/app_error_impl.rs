use crate::app_error::{AppError, ErrorCode};
use crate::infra::rate_limit::RateLimitDecision;
use axum::Json;
use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        match &self {
            AppError::Validation(_)
            | AppError::MalformedRequest
            | AppError::DuplicateEmail
            | AppError::RateLimited(_)
            | AppError::Unauthorized
            | AppError::NotFound => tracing::info!(error = ?self, "Request rejected"),
            _ => tracing::error!(error = ?self, "Request failed"),
        }

        let code = self.code();
        match self {
            AppError::Configuration(detail) => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                code,
                "Server configuration error",
                json!({ "error": detail }),
            ),
            AppError::MalformedRequest => error_resp(
                StatusCode::BAD_REQUEST,
                code,
                "Invalid request body",
                json!({ "error": "Malformed JSON" }),
            ),
            AppError::Validation(errors) => error_resp(
                StatusCode::BAD_REQUEST,
                code,
                "Invalid data",
                json!({ "errors": errors }),
            ),
            AppError::DuplicateEmail => error_resp(
                StatusCode::CONFLICT,
                code,
                "This email is already on the waitlist",
                json!({ "errors": { "email": ["This email is already registered"] } }),
            ),
            AppError::RateLimited(decision) => rate_limited_resp(code, decision),
            AppError::Unauthorized => error_resp(
                StatusCode::UNAUTHORIZED,
                code,
                "Unauthorized",
                Value::Null,
            ),
            AppError::NotFound => {
                error_resp(StatusCode::NOT_FOUND, code, "Not found", Value::Null)
            }
            AppError::Upstream { status, body } => error_resp(
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                code,
                "Failed to send data to RD Station",
                json!({ "error": body }),
            ),
            AppError::PersistenceUnavailable(_) | AppError::Database(_) | AppError::Internal(_) => {
                error_resp(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code,
                    "Failed to process your request. Please try again.",
                    json!({ "error": code.as_str() }),
                )
            }
        }
    }
}

/// `{success:false, code, message}` merged with the fields in `extra`.
fn error_resp(status: StatusCode, code: ErrorCode, message: &str, extra: Value) -> Response {
    let mut body = json!({
        "success": false,
        "code": code.as_str(),
        "message": message,
    });
    if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
        body.extend(extra);
    }
    (status, Json(body)).into_response()
}

fn rate_limited_resp(code: ErrorCode, decision: RateLimitDecision) -> Response {
    let mut response = error_resp(
        StatusCode::TOO_MANY_REQUESTS,
        code,
        "Too many requests. Please try again later.",
        json!({
            "rateLimitInfo": {
                "limit": decision.limit,
                "remaining": decision.remaining,
                "resetAt": decision.reset_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            }
        }),
    );
    insert_rate_limit_headers(response.headers_mut(), &decision);
    response
}

/// `X-RateLimit-*` headers; the reset is epoch milliseconds.
fn insert_rate_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert(
        "x-ratelimit-reset",
        HeaderValue::from(decision.reset_at.timestamp_millis()),
    );
}
