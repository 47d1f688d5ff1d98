//! Webhook entry point: any JSON payload triggers the configured task.
//!
//! Response bodies follow the webhook contract exactly (`success` /
//! `taskId` / `receivedPayload` on 200, `error` / `details` on 500), so
//! these handlers build their responses directly instead of going through
//! [`AppError`](crate::error::AppError).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::state::AppState;

/// Response body for an accepted webhook delivery.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAccepted {
    pub success: bool,
    pub task_id: String,
    pub message: String,
    pub received_payload: serde_json::Value,
}

/// POST /api/v1/webhook
///
/// Triggers the configured task with the request body as payload.
pub async fn receive_webhook(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Response {
    if payload.is_null() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No payload provided" })),
        )
            .into_response();
    }

    match state
        .backend
        .trigger(&state.config.task_name, payload.clone())
        .await
    {
        Ok(handle) => {
            tracing::info!(
                task = %state.config.task_name,
                run_id = %handle,
                "Webhook received and run triggered",
            );

            Json(WebhookAccepted {
                success: true,
                task_id: handle.to_string(),
                message: "Webhook received and task triggered successfully".to_string(),
                received_payload: payload,
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Webhook trigger failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to process webhook",
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// GET /api/v1/webhook
///
/// Static usage documentation for the webhook endpoint.
pub async fn webhook_info() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Webhook endpoint ready",
        "method": "POST",
        "description": "Send a POST request with a JSON payload to trigger the configured task",
        "example": {
            "payload": "Your webhook data here"
        }
    }))
}
