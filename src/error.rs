//! Error codes and the HTTP error envelope.
//!
//! DESIGN
//! ======
//! Every domain error implements `ErrorCode` so the HTTP layer can return a
//! grepable `E_*` code alongside the human-readable message. Core components
//! (region resolver, theme scheduler) never surface these to callers; they
//! only show up on the pass-through catalog routes and on input validation.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Grepable error code + retry hint for any domain error.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// API ERROR
// =============================================================================

/// Error returned from route handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
    retryable: bool,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        let retryable = status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS;
        Self { status, code, message: message.into(), retryable }
    }

    #[must_use]
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    /// Wrap a domain error, keeping its code and retry hint.
    pub fn from_domain<E: ErrorCode>(status: StatusCode, err: &E) -> Self {
        Self { retryable: err.retryable(), ..Self::new(status, err.error_code(), err.to_string()) }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { code: self.code, message: &self.message, retryable: self.retryable };
        (self.status, Json(body)).into_response()
    }
}
