use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use runbeam_core::CoreError;
use runbeam_upstream::UpstreamError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for relay errors and [`UpstreamError`] for job
/// service errors, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A relay-level error from `runbeam_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An error from the upstream job system.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::InvalidHandle(msg) => {
                    (StatusCode::BAD_REQUEST, "INVALID_HANDLE", msg.clone())
                }
                CoreError::TriggerFailed(msg) => {
                    (StatusCode::BAD_GATEWAY, "TRIGGER_FAILED", msg.clone())
                }
                CoreError::UpstreamSubscription(msg) => {
                    tracing::error!(error = %msg, "Upstream subscription error");
                    (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
                }
                other => {
                    tracing::error!(error = %other, "Relay error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Upstream errors ---
            AppError::Upstream(upstream) => match upstream {
                UpstreamError::Trigger(msg) => {
                    (StatusCode::BAD_GATEWAY, "TRIGGER_FAILED", msg.clone())
                }
                UpstreamError::Subscription(msg) => {
                    (StatusCode::BAD_REQUEST, "INVALID_HANDLE", msg.clone())
                }
                UpstreamError::Connection(msg) | UpstreamError::Protocol(msg) => {
                    tracing::error!(error = %msg, "Upstream error");
                    (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_ERROR",
                        "The job service is unavailable".to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
