//! Unified error types.
//!
//! Three layers, three enums:
//!
//! - [`Error`] — infrastructure failures of the server itself: a bad bind
//!   address, a port that cannot be bound.
//! - [`StoreError`] — the persistence layer could not do its job. Absence of
//!   a post is *not* a store error; stores report it as `None`.
//! - [`ApiError`] — what a handler surfaces to the client. Converts into a
//!   [`Response`](crate::Response) with a `{"detail": …}` body.

use std::net::AddrParseError;

use thiserror::Error;

use crate::response::{IntoResponse, Response};
use crate::status::Status;

/// The error type returned by the server's fallible operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid bind address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// A failure inside a [`PostStore`](crate::store::PostStore) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("could not connect after {attempts} attempt(s): {source}")]
    Connect {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },

    /// The database is reachable but its tables do not have the expected
    /// shape. Reported once at startup.
    #[error("unexpected schema: {0}")]
    Schema(String),
}

/// Errors a post handler reports back to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or empty required field, malformed body, or unparsable id.
    #[error("{0}")]
    Validation(String),

    /// Holds the id as the client sent it, so ids too large for `i64` can
    /// still be reported.
    #[error("post with id: {0} was not found")]
    NotFound(String),

    /// Anything the handler cannot recover from. The message stays in the
    /// logs; the client gets a generic 500.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(id.to_string())
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::UnprocessableContent,
            Self::NotFound(_) => Status::NotFound,
            Self::Store(_) => Status::InternalServerError,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = match &self {
            Self::Store(e) => {
                tracing::error!(error = %e, "store failure");
                "internal server error".to_owned()
            }
            other => other.to_string(),
        };

        Response::builder()
            .status(self.status())
            .json_value(&serde_json::json!({ "detail": detail }))
    }
}
