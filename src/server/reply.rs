//! Failure replies: the one place a [`SolveError`] becomes an HTTP status.
//!
//! Rules are checked in order and the first match wins:
//!
//! | Condition                                   | Status | `retryAfter` |
//! |---------------------------------------------|--------|--------------|
//! | readiness pre-check failed                  | 503    | 60           |
//! | AI failure mentioning quota or rate limit   | 429    | 120          |
//! | input or extraction failure                 | 400    |              |
//! | anything else                               | 500    |              |

use crate::error::{ErrorCategory, SolveError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Seconds a caller should wait after a failed readiness check.
pub const UNAVAILABLE_RETRY_SECS: u64 = 60;

/// Seconds a caller should wait after a quota or rate-limit failure.
pub const THROTTLED_RETRY_SECS: u64 = 120;

/// A failed request, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub status: StatusCode,
    pub message: String,
    pub retry_after: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FailureBody<'a> {
    success: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl Failure {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            retry_after: None,
        }
    }
}

impl From<SolveError> for Failure {
    fn from(err: SolveError) -> Self {
        let message = err.to_string();

        let (status, retry_after) = if matches!(err, SolveError::AiUnavailable { .. }) {
            (StatusCode::SERVICE_UNAVAILABLE, Some(UNAVAILABLE_RETRY_SECS))
        } else if err.category() == ErrorCategory::Ai && is_throttled(&message) {
            (StatusCode::TOO_MANY_REQUESTS, Some(THROTTLED_RETRY_SECS))
        } else {
            match err.category() {
                ErrorCategory::Input | ErrorCategory::Extraction => (StatusCode::BAD_REQUEST, None),
                ErrorCategory::Ai | ErrorCategory::Internal => {
                    (StatusCode::INTERNAL_SERVER_ERROR, None)
                }
            }
        };

        if status.is_server_error() {
            tracing::error!("{} {}", status.as_u16(), message);
        } else {
            tracing::warn!("{} {}", status.as_u16(), message);
        }

        Self {
            status,
            message,
            retry_after,
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = FailureBody {
            success: false,
            message: &self.message,
            retry_after: self.retry_after,
        };
        (self.status, Json(body)).into_response()
    }
}

fn is_throttled(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("quota") || lower.contains("rate limit")
}
