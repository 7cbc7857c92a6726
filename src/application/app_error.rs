use thiserror::Error;

use crate::{application::validators::FieldErrors, infra::rate_limit::RateLimitDecision};

#[derive(Error, Debug)]
pub enum AppError {
    /// Required server configuration is missing; operator-facing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Malformed request body")]
    MalformedRequest,

    #[error("Invalid input")]
    Validation(FieldErrors),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Too many requests. Please slow down.")]
    RateLimited(RateLimitDecision),

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    /// A third-party API answered with a non-success status.
    #[error("Upstream error: {status}")]
    Upstream {
        status: u16,
        body: serde_json::Value,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    ConfigurationError,
    MalformedRequest,
    InvalidInput,
    DuplicateEmail,
    RateLimited,
    PersistenceUnavailable,
    DatabaseError,
    Unauthorized,
    NotFound,
    UpstreamError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorCode::MalformedRequest => "MALFORMED_REQUEST",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::DuplicateEmail => "DUPLICATE_EMAIL",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::PersistenceUnavailable => "PERSISTENCE_UNAVAILABLE",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::UpstreamError => "UPSTREAM_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Configuration(_) => ErrorCode::ConfigurationError,
            AppError::MalformedRequest => ErrorCode::MalformedRequest,
            AppError::Validation(_) => ErrorCode::InvalidInput,
            AppError::DuplicateEmail => ErrorCode::DuplicateEmail,
            AppError::RateLimited(_) => ErrorCode::RateLimited,
            AppError::PersistenceUnavailable(_) => ErrorCode::PersistenceUnavailable,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::Unauthorized => ErrorCode::Unauthorized,
            AppError::NotFound => ErrorCode::NotFound,
            AppError::Upstream { .. } => ErrorCode::UpstreamError,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
