//! Service errors and their HTTP mapping
//!
//! Handlers return [`Result<T>`]. The status code and the `{"error": "..."}`
//! body are decided in one place, the [`IntoResponse`] impl for [`Error`].
//! Store failures carry a [`DatabaseError`] describing what was running; that
//! detail goes to the log, never to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Message returned when a login attempt does not match any user.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid username/password";

/// What the store was doing when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseOperation {
    Connect,
    Query,
    Insert,
    Update,
    Delete,
    /// Begin, commit or rollback
    Transaction,
    Migration,
}

impl DatabaseOperation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Query => "query",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Transaction => "transaction",
            Self::Migration => "migration",
        }
    }
}

impl fmt::Display for DatabaseOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the store failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseErrorKind {
    /// The pool is closed or the file could not be opened
    ConnectionFailed,
    /// UNIQUE, FOREIGN KEY or CHECK rejected the statement
    ConstraintViolation,
    QueryFailed,
    TransactionFailed,
    /// A column did not decode into the Rust type
    TypeConversion,
    /// Bad connection options
    Configuration,
    /// No pooled connection became free within the acquire timeout
    PoolExhausted,
    Other,
}

impl DatabaseErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConnectionFailed => "connection_failed",
            Self::ConstraintViolation => "constraint_violation",
            Self::QueryFailed => "query_failed",
            Self::TransactionFailed => "transaction_failed",
            Self::TypeConversion => "type_conversion",
            Self::Configuration => "configuration",
            Self::PoolExhausted => "pool_exhausted",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DatabaseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A store failure with enough context to find it in the logs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Database {kind} error during {operation}: {message}{}", context_suffix(.context))]
pub struct DatabaseError {
    pub operation: DatabaseOperation,
    pub kind: DatabaseErrorKind,
    /// Driver message
    pub message: String,
    /// Table, statement or file involved
    pub context: Option<String>,
}

fn context_suffix(context: &Option<String>) -> String {
    context
        .as_deref()
        .map(|ctx| format!(" [context: {ctx}]"))
        .unwrap_or_default()
}

impl DatabaseError {
    pub fn new(
        operation: DatabaseOperation,
        kind: DatabaseErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            context: None,
        }
    }

    pub fn transaction_failed(message: impl Into<String>) -> Self {
        Self::new(
            DatabaseOperation::Transaction,
            DatabaseErrorKind::TransactionFailed,
            message,
        )
    }

    /// Record the statement type that was running
    ///
    /// A converted `sqlx::Error` only knows how it failed; repositories tag it
    /// with the operation.
    #[must_use]
    pub fn during(mut self, operation: DatabaseOperation) -> Self {
        self.operation = operation;
        self
    }

    #[must_use]
    pub fn add_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        use DatabaseErrorKind as Kind;
        use DatabaseOperation as Op;

        let (operation, kind) = match &err {
            sqlx::Error::PoolTimedOut => (Op::Connect, Kind::PoolExhausted),
            sqlx::Error::PoolClosed | sqlx::Error::Io(_) => (Op::Connect, Kind::ConnectionFailed),
            sqlx::Error::Configuration(_) => (Op::Connect, Kind::Configuration),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                (Op::Query, Kind::TypeConversion)
            }
            sqlx::Error::Migrate(_) => (Op::Migration, Kind::QueryFailed),
            sqlx::Error::Database(db) => {
                let constraint = db.is_unique_violation()
                    || db.is_foreign_key_violation()
                    || db.is_check_violation();
                let kind = if constraint {
                    Kind::ConstraintViolation
                } else {
                    Kind::QueryFailed
                };
                (Op::Query, kind)
            }
            _ => (Op::Query, Kind::Other),
        };

        Self::new(operation, kind, err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::new(
            DatabaseOperation::Migration,
            DatabaseErrorKind::QueryFailed,
            err.to_string(),
        )
    }
}

/// Result type alias using the service error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the service
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed body or path parameter
    #[error("Validation error: {0}")]
    Validation(String),

    /// No row matched a keyed read
    #[error("Not found: {0}")]
    NotFound(String),

    /// Login with a username/password pair that matches no user
    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,
}

impl Error {
    /// `400 {"error":"invalid id"}` for a non-integer path parameter
    pub fn invalid_id() -> Self {
        Error::Validation("invalid id".to_string())
    }

    /// `404 {"error":"not found"}`
    pub fn not_found() -> Self {
        Error::NotFound("not found".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::InvalidCredentials => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Config(_) | Error::Database(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message sent to the client; server-side failures are not described
    fn public_message(&self) -> String {
        match self {
            Error::Validation(msg) | Error::NotFound(msg) => msg.clone(),
            Error::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            Error::Database(_) => "database operation failed".to_string(),
            Error::Config(_) | Error::Io(_) => "internal server error".to_string(),
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(err.into())
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Database(db) => tracing::error!(
                operation = %db.operation,
                kind = %db.kind,
                context = ?db.context,
                "Database error: {}", db.message
            ),
            Error::Config(_) | Error::Io(_) => tracing::error!("Request failed: {}", self),
            _ => {}
        }

        let body = ErrorResponse::new(self.public_message());
        (self.status(), Json(body)).into_response()
    }
}
