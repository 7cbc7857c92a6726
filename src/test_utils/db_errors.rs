//! Hand-built driver errors for exercising storage error classification.

use std::{borrow::Cow, error::Error as StdError, fmt};

use sqlx::error::{DatabaseError, ErrorKind};

/// A database error carrying only the fields the classifier reads.
#[derive(Debug)]
pub struct FakeDbError {
    pub unique: bool,
    pub code: Option<&'static str>,
    pub constraint: Option<&'static str>,
}

impl fmt::Display for FakeDbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fake database error ({:?})", self.code)
    }
}

impl StdError for FakeDbError {}

impl DatabaseError for FakeDbError {
    fn message(&self) -> &str {
        "fake database error"
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        self.code.map(Cow::Borrowed)
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }

    fn constraint(&self) -> Option<&str> {
        self.constraint
    }

    fn kind(&self) -> ErrorKind {
        if self.unique {
            ErrorKind::UniqueViolation
        } else {
            ErrorKind::Other
        }
    }
}

/// Unique violation as reported by Postgres (SQLSTATE 23505).
pub fn unique_violation(constraint: Option<&'static str>) -> sqlx::Error {
    sqlx::Error::Database(Box::new(FakeDbError {
        unique: true,
        code: Some("23505"),
        constraint,
    }))
}

/// Any other database error with the given SQLSTATE.
pub fn database_error(code: &'static str) -> sqlx::Error {
    sqlx::Error::Database(Box::new(FakeDbError {
        unique: false,
        code: Some(code),
        constraint: None,
    }))
}
